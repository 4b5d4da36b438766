//! Read-only traversal over the syntax tree, in the style of `syn::visit`.
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk_*` function to continue into children.

use super::ast::*;

pub trait Visitor<'ast> {
    fn visit_type_decl(&mut self, decl: &'ast TypeDecl) {
        walk_type_decl(self, decl);
    }

    fn visit_member(&mut self, member: &'ast Member) {
        walk_member(self, member);
    }

    fn visit_attribute(&mut self, attr: &'ast Attribute) {
        walk_attribute(self, attr);
    }

    fn visit_parameter(&mut self, param: &'ast Parameter) {
        walk_parameter(self, param);
    }

    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_lambda(&mut self, lambda: &'ast Lambda) {
        walk_lambda(self, lambda);
    }

    fn visit_type_ref(&mut self, ty: &'ast TypeRef) {
        walk_type_ref(self, ty);
    }
}

pub fn walk_type_decl<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, decl: &'ast TypeDecl) {
    for attr in decl.attributes() {
        v.visit_attribute(attr);
    }
    if let Some(ctor) = &decl.primary_ctor {
        for param in &ctor.params {
            v.visit_parameter(param);
        }
    }
    for base in &decl.base_list {
        v.visit_type_ref(base);
    }
    for clause in &decl.constraints {
        for ty in &clause.constraints {
            v.visit_type_ref(ty);
        }
    }
    for member in &decl.members {
        v.visit_member(member);
    }
}

fn walk_attribute_lists<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, lists: &'ast [AttributeList]) {
    for attr in lists.iter().flat_map(|l| l.attributes.iter()) {
        v.visit_attribute(attr);
    }
}

fn walk_body<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, body: &'ast Body) {
    match body {
        Body::Block(block) => v.visit_block(block),
        Body::Expression(expr) => v.visit_expr(expr),
    }
}

pub fn walk_method<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, method: &'ast MethodDecl) {
    walk_attribute_lists(v, &method.attributes);
    v.visit_type_ref(&method.return_type);
    if let Some(iface) = &method.explicit_interface {
        v.visit_type_ref(iface);
    }
    for param in &method.params.params {
        v.visit_parameter(param);
    }
    for clause in &method.constraints {
        for ty in &clause.constraints {
            v.visit_type_ref(ty);
        }
    }
    if let Some(body) = &method.body {
        walk_body(v, body);
    }
}

pub fn walk_member<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, member: &'ast Member) {
    match member {
        Member::Field(field) => {
            walk_attribute_lists(v, &field.attributes);
            v.visit_type_ref(&field.ty);
            for decl in &field.declarators {
                if let Some(init) = &decl.initializer {
                    v.visit_expr(init);
                }
            }
        }
        Member::Property(prop) => {
            walk_attribute_lists(v, &prop.attributes);
            v.visit_type_ref(&prop.ty);
            if let Some(iface) = &prop.explicit_interface {
                v.visit_type_ref(iface);
            }
            if let Some(list) = &prop.accessor_list {
                for accessor in &list.accessors {
                    walk_attribute_lists(v, &accessor.attributes);
                    match &accessor.body {
                        AccessorBody::None => {}
                        AccessorBody::Expression(expr) => v.visit_expr(expr),
                        AccessorBody::Block(block) => v.visit_block(block),
                    }
                }
            }
            if let Some(expr) = &prop.expression_body {
                v.visit_expr(expr);
            }
            if let Some(init) = &prop.initializer {
                v.visit_expr(init);
            }
        }
        Member::Method(method) => walk_method(v, method),
        Member::Constructor(ctor) => {
            walk_attribute_lists(v, &ctor.attributes);
            for param in &ctor.params.params {
                v.visit_parameter(param);
            }
            if let Some(init) = &ctor.initializer {
                for arg in &init.args {
                    v.visit_expr(&arg.expr);
                }
            }
            if let Some(body) = &ctor.body {
                walk_body(v, body);
            }
        }
        Member::Type(decl) => v.visit_type_decl(decl),
        Member::Other(other) => {
            walk_attribute_lists(v, &other.attributes);
            for body in &other.bodies {
                walk_body(v, body);
            }
        }
    }
}

pub fn walk_attribute<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, attr: &'ast Attribute) {
    for ty in &attr.type_args {
        v.visit_type_ref(ty);
    }
    for arg in &attr.args {
        v.visit_expr(&arg.value);
    }
}

pub fn walk_parameter<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, param: &'ast Parameter) {
    walk_attribute_lists(v, &param.attributes);
    v.visit_type_ref(&param.ty);
    if let Some(default) = &param.default {
        v.visit_expr(default);
    }
}

pub fn walk_block<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, block: &'ast Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Block(block) => v.visit_block(block),
        StmtKind::LocalDecl {
            ty, declarators, ..
        } => {
            v.visit_type_ref(ty);
            for decl in declarators {
                if let Some(init) = &decl.initializer {
                    v.visit_expr(init);
                }
            }
        }
        StmtKind::LocalFunction(method) => walk_method(v, method),
        StmtKind::Expr(expr) => v.visit_expr(expr),
        StmtKind::Return(expr) | StmtKind::Throw(expr) | StmtKind::Yield(expr) => {
            if let Some(expr) = expr {
                v.visit_expr(expr);
            }
        }
        StmtKind::If {
            cond,
            then,
            otherwise,
        } => {
            v.visit_expr(cond);
            v.visit_stmt(then);
            if let Some(otherwise) = otherwise {
                v.visit_stmt(otherwise);
            }
        }
        StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
            v.visit_expr(cond);
            v.visit_stmt(body);
        }
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => {
            for s in init {
                v.visit_stmt(s);
            }
            if let Some(cond) = cond {
                v.visit_expr(cond);
            }
            for e in step {
                v.visit_expr(e);
            }
            v.visit_stmt(body);
        }
        StmtKind::ForEach { ty, expr, body, .. } => {
            v.visit_type_ref(ty);
            v.visit_expr(expr);
            v.visit_stmt(body);
        }
        StmtKind::Using { resource, body } => {
            if let Some(resource) = resource {
                v.visit_stmt(resource);
            }
            if let Some(body) = body {
                v.visit_stmt(body);
            }
        }
        StmtKind::Lock { expr, body } => {
            v.visit_expr(expr);
            v.visit_stmt(body);
        }
        StmtKind::Try {
            block,
            catches,
            finally,
        } => {
            v.visit_block(block);
            for catch in catches {
                if let Some(ty) = &catch.ty {
                    v.visit_type_ref(ty);
                }
                if let Some(filter) = &catch.filter {
                    v.visit_expr(filter);
                }
                v.visit_block(&catch.block);
            }
            if let Some(finally) = finally {
                v.visit_block(finally);
            }
        }
        StmtKind::Switch { expr, sections } => {
            v.visit_expr(expr);
            for section in sections {
                for label in &section.labels {
                    v.visit_expr(label);
                }
                for s in &section.stmts {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::Break | StmtKind::Continue | StmtKind::Empty | StmtKind::Unknown => {}
    }
}

fn walk_pattern<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, pattern: &'ast Pattern) {
    match pattern {
        Pattern::Type { ty, .. } => v.visit_type_ref(ty),
        Pattern::Constant(expr) => v.visit_expr(expr),
        Pattern::Not(inner) => walk_pattern(v, inner),
        Pattern::Opaque(_) => {}
    }
}

fn walk_args<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, args: &'ast [Argument]) {
    for arg in args {
        v.visit_expr(&arg.expr);
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Literal(_)
        | ExprKind::PredefinedType(_)
        | ExprKind::This
        | ExprKind::Base
        | ExprKind::Opaque => {}
        ExprKind::Name { type_args, .. } => {
            for ty in type_args {
                v.visit_type_ref(ty);
            }
        }
        ExprKind::Default(ty) => {
            if let Some(ty) = ty {
                v.visit_type_ref(ty);
            }
        }
        ExprKind::ObjectCreation {
            ty,
            args,
            initializer,
        } => {
            if let Some(ty) = ty {
                v.visit_type_ref(ty);
            }
            if let Some(args) = args {
                walk_args(v, args);
            }
            for e in initializer.iter().flatten() {
                v.visit_expr(e);
            }
        }
        ExprKind::ArrayCreation {
            ty,
            sizes,
            initializer,
        } => {
            if let Some(ty) = ty {
                v.visit_type_ref(ty);
            }
            for e in sizes.iter().chain(initializer.iter().flatten()) {
                v.visit_expr(e);
            }
        }
        ExprKind::AnonymousObject(elements) | ExprKind::Collection(elements) => {
            for e in elements {
                v.visit_expr(e);
            }
        }
        ExprKind::TypeOf(ty) | ExprKind::SizeOf(ty) => v.visit_type_ref(ty),
        ExprKind::NameOf(inner)
        | ExprKind::Parenthesized(inner)
        | ExprKind::Throw(inner)
        | ExprKind::Unary { operand: inner, .. }
        | ExprKind::Postfix { operand: inner, .. } => v.visit_expr(inner),
        ExprKind::Cast { ty, expr } | ExprKind::As { expr, ty } => {
            v.visit_type_ref(ty);
            v.visit_expr(expr);
        }
        ExprKind::Tuple(args) => walk_args(v, args),
        ExprKind::Lambda(lambda) => v.visit_lambda(lambda),
        ExprKind::MemberAccess {
            target, type_args, ..
        } => {
            v.visit_expr(target);
            for ty in type_args {
                v.visit_type_ref(ty);
            }
        }
        ExprKind::Invocation { callee, args, .. } => {
            v.visit_expr(callee);
            walk_args(v, args);
        }
        ExprKind::ElementAccess { target, args } => {
            v.visit_expr(target);
            walk_args(v, args);
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Assignment { target, value, .. } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        ExprKind::Conditional {
            cond,
            when_true,
            when_false,
        } => {
            v.visit_expr(cond);
            v.visit_expr(when_true);
            v.visit_expr(when_false);
        }
        ExprKind::Is { expr, pattern } => {
            v.visit_expr(expr);
            walk_pattern(v, pattern);
        }
        ExprKind::Declaration { ty, .. } => v.visit_type_ref(ty),
    }
}

pub fn walk_lambda<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, lambda: &'ast Lambda) {
    for param in &lambda.params {
        if let Some(ty) = &param.ty {
            v.visit_type_ref(ty);
        }
    }
    match &lambda.body {
        LambdaBody::Expr(expr) => v.visit_expr(expr),
        LambdaBody::Block(block) => v.visit_block(block),
    }
}

pub fn walk_type_ref<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, ty: &'ast TypeRef) {
    match &ty.kind {
        TypeRefKind::Predefined(_) => {}
        TypeRefKind::Named { segments, .. } => {
            for seg in segments {
                for arg in &seg.type_args {
                    v.visit_type_ref(arg);
                }
            }
        }
        TypeRefKind::Nullable(inner) => v.visit_type_ref(inner),
        TypeRefKind::Array { element, .. } => v.visit_type_ref(element),
        TypeRefKind::Tuple(elements) => {
            for el in elements {
                v.visit_type_ref(&el.ty);
            }
        }
    }
}
