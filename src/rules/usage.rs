//! Usage rules: what the code inside a declaration does with pattern types.
//!
//! Unlike the declaration rules these run for every declaration of the
//! current assembly, classified or not. Member bodies are walked with a
//! best-effort local scope so that value positions can be typed.

use super::descriptors as d;
use super::{display_type, RuleContext};
use crate::common::Span;
use crate::diagnostics::Diagnostic;
use crate::patterns::{classify, PatternKind};
use crate::semantic::{Compilation, LocalScope, ResolvedType, Scope, TypeId};
use crate::shape;
use crate::syntax::ast::*;
use crate::syntax::visit::{self, Visitor};
use std::collections::BTreeSet;

/// Generated dispatch methods whose callbacks must not capture.
pub const DISPATCH_METHODS: &[&str] = &["Switch", "SwitchPartially"];

pub fn is_usage_rule(id: &str) -> bool {
    matches!(
        id,
        d::DEFAULT_INSTANCE_NOT_ALLOWED | d::DISPATCH_LAMBDA_MUST_BE_STATIC | d::INTERNAL_API_USAGE
    )
}

pub fn default_instance_not_allowed(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    BodyWalker::run(ctx, Check::DefaultInstance)
}

pub fn dispatch_lambda_must_be_static(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    BodyWalker::run(ctx, Check::DispatchLambda)
}

pub fn internal_api_usage(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let compilation = ctx.compilation;
    if compilation.assembly_name() == compilation.library().assembly_name {
        return Vec::new();
    }
    BodyWalker::run(ctx, Check::InternalApi)
}

/// Whether `ty` is a smart enum or union, or derives from a union, so
/// that its `Switch` members are generated.
pub fn is_dispatch_receiver(compilation: &Compilation, ty: &ResolvedType) -> bool {
    let Some(id) = ty.strip_nullable().declared_id() else {
        return false;
    };
    std::iter::once(id)
        .chain(compilation.base_chain(id))
        .flat_map(|t| compilation.parts(t))
        .any(|part| {
            matches!(
                classify(compilation, part).primary,
                Some(PatternKind::SmartEnum(_) | PatternKind::Union(_))
            )
        })
}

fn in_namespace(namespace: &str, root: &str) -> bool {
    namespace == root
        || namespace
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// `default`/`default(T)`/`new T()` operands of `==` and `!=`.
fn is_zero_value_operand(expr: &Expr) -> bool {
    match &expr.unparenthesized().kind {
        ExprKind::Default(_) => true,
        ExprKind::ObjectCreation {
            args, initializer, ..
        } => args.as_ref().map_or(true, Vec::is_empty) && initializer.is_none(),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    DefaultInstance,
    DispatchLambda,
    InternalApi,
}

struct BodyWalker<'a, 'c> {
    ctx: &'a RuleContext<'c>,
    check: Check,
    scope: Scope,
    locals: LocalScope,
    /// Return type of the innermost member body; unknown inside lambdas.
    returns: ResolvedType,
    reported: BTreeSet<(Span, String)>,
    out: Vec<Diagnostic>,
}

impl<'a, 'c> BodyWalker<'a, 'c> {
    fn run(ctx: &'a RuleContext<'c>, check: Check) -> Vec<Diagnostic> {
        let mut walker = Self {
            ctx,
            check,
            scope: ctx.scope(),
            locals: LocalScope::new(),
            returns: ResolvedType::Unknown,
            reported: BTreeSet::new(),
            out: Vec::new(),
        };
        walker.walk_declaration();
        walker.out
    }

    fn compilation(&self) -> &'c Compilation {
        self.ctx.compilation
    }

    fn resolve(&self, ty: &TypeRef) -> ResolvedType {
        self.compilation().resolve(ty, &self.scope)
    }

    fn type_of(&self, expr: &Expr) -> ResolvedType {
        self.compilation().type_of(expr, &self.scope, &self.locals)
    }

    /// Nested types are declarations of their own and are skipped here.
    fn walk_declaration(&mut self) {
        let decl = self.ctx.decl;
        let body_scope = self.scope.clone();
        self.scope.containing = self.compilation().symbols().get(self.ctx.id).containing;
        for attr in decl.attributes() {
            self.visit_attribute(attr);
        }
        for base in &decl.base_list {
            self.visit_type_ref(base);
        }
        self.scope = body_scope;
        for clause in &decl.constraints {
            for ty in &clause.constraints {
                self.visit_type_ref(ty);
            }
        }
        if let Some(ctor) = &decl.primary_ctor {
            for param in &ctor.params {
                self.visit_parameter(param);
            }
        }
        for member in &decl.members {
            if !matches!(member, Member::Type(_)) {
                self.visit_member(member);
            }
        }
    }

    fn walk_function(&mut self, method: &'c MethodDecl) {
        let saved_scope = self.scope.clone();
        self.scope = self
            .scope
            .clone()
            .with_type_params(method.type_params.iter().map(|p| p.text.clone()));
        let returns = self.resolve(&method.return_type);
        let saved_returns = std::mem::replace(&mut self.returns, returns);
        self.locals.push();
        self.declare_params(&method.params.params);
        if let Some(Body::Expression(expr)) = &method.body {
            let target = self.returns.clone();
            self.check_value(expr, &target);
        }
        visit::walk_method(self, method);
        self.locals.pop();
        self.returns = saved_returns;
        self.scope = saved_scope;
    }

    fn declare_params(&mut self, params: &[Parameter]) {
        for param in params {
            let ty = self.resolve(&param.ty);
            self.locals.declare(param.name.text.clone(), ty);
        }
    }

    fn push_diagnostic(&mut self, key: String, diagnostic: Diagnostic) {
        if self.reported.insert((diagnostic.location.span, key)) {
            self.out.push(diagnostic);
        }
    }

    // default instances

    /// Checks a value flowing into a position of type `target`.
    fn check_value(&mut self, expr: &Expr, target: &ResolvedType) {
        if self.check != Check::DefaultInstance {
            return;
        }
        let expr = expr.unparenthesized();
        match &expr.kind {
            ExprKind::Conditional {
                when_true,
                when_false,
                ..
            } => {
                self.check_value(when_true, target);
                self.check_value(when_false, target);
            }
            ExprKind::Tuple(args) => {
                if let ResolvedType::Tuple(elements) = target.strip_nullable() {
                    for (arg, ty) in args.iter().zip(elements) {
                        self.check_value(&arg.expr, ty);
                    }
                }
            }
            _ => {
                if shape::is_default_construction(expr, target, self.compilation(), &self.scope) {
                    let created = match &expr.kind {
                        ExprKind::Default(Some(ty)) | ExprKind::ObjectCreation { ty: Some(ty), .. } => {
                            self.resolve(ty)
                        }
                        _ => target.clone(),
                    };
                    self.report_default(expr.span, &created);
                }
            }
        }
    }

    fn report_default(&mut self, span: Span, created: &ResolvedType) {
        if !shape::disallows_default(self.compilation(), created) {
            return;
        }
        let diagnostic = self
            .ctx
            .report(
                d::DEFAULT_INSTANCE_NOT_ALLOWED,
                span,
                vec![display_type(self.ctx, created)],
            );
        self.push_diagnostic(String::new(), diagnostic);
    }

    fn check_arguments(&mut self, callee: &Expr, args: &[Argument]) {
        if self.check != Check::DefaultInstance {
            return;
        }
        for (position, arg) in args.iter().enumerate() {
            if arg.ref_kind != RefKind::None {
                continue;
            }
            let target = self
                .compilation()
                .argument_target_type(callee, arg, position, &self.scope, &self.locals);
            self.check_value(&arg.expr, &target);
        }
    }

    // dispatch callbacks

    fn check_dispatch(&mut self, callee: &Expr, args: &[Argument]) {
        if self.check != Check::DispatchLambda {
            return;
        }
        let (receiver, method) = match &callee.kind {
            ExprKind::MemberAccess { target, name, .. } => (self.type_of(target), name),
            ExprKind::Name { name, .. } if !self.locals.is_declared(&name.text) => (
                self.scope
                    .containing
                    .map(ResolvedType::declared)
                    .unwrap_or(ResolvedType::Unknown),
                name,
            ),
            _ => return,
        };
        if !DISPATCH_METHODS.contains(&method.text.as_str())
            || !is_dispatch_receiver(self.compilation(), &receiver)
        {
            return;
        }
        for arg in args {
            let ExprKind::Lambda(lambda) = &arg.expr.unparenthesized().kind else {
                continue;
            };
            if lambda.is_static() {
                continue;
            }
            let diagnostic = self
                .ctx
                .report(
                    d::DISPATCH_LAMBDA_MUST_BE_STATIC,
                    lambda.span,
                    vec![method.text.clone()],
                )
                .with_node_span(lambda.span);
            self.push_diagnostic(String::new(), diagnostic);
        }
    }

    // internal surface

    fn is_internal(&self, id: TypeId) -> bool {
        let compilation = self.compilation();
        !compilation.is_current(id)
            && in_namespace(
                &compilation.symbols().get(id).namespace,
                &compilation.library().internal_namespace,
            )
    }

    fn collect_internal(&self, ty: &ResolvedType, out: &mut Vec<String>) {
        let internal_ns = self.compilation().library().internal_namespace.as_str();
        let push = |out: &mut Vec<String>, name: String| {
            if !out.contains(&name) {
                out.push(name);
            }
        };
        match ty {
            ResolvedType::Declared { id, args } => {
                if self.is_internal(*id) {
                    push(out, self.compilation().symbols().qualified_name(*id));
                }
                for arg in args {
                    self.collect_internal(arg, out);
                }
            }
            ResolvedType::External { name, args } => {
                if name
                    .rsplit_once('.')
                    .is_some_and(|(ns, _)| in_namespace(ns, internal_ns))
                {
                    push(out, name.clone());
                }
                for arg in args {
                    self.collect_internal(arg, out);
                }
            }
            ResolvedType::Nullable(inner) | ResolvedType::Array(inner, _) => {
                self.collect_internal(inner, out)
            }
            ResolvedType::Tuple(elements) => {
                for element in elements {
                    self.collect_internal(element, out);
                }
            }
            ResolvedType::Builtin(_) | ResolvedType::TypeParam(_) | ResolvedType::Unknown => {}
        }
    }

    /// One diagnostic per internal symbol referenced at `span`.
    fn report_internal(&mut self, span: Span, ty: &ResolvedType) {
        if self.check != Check::InternalApi {
            return;
        }
        let mut names = Vec::new();
        self.collect_internal(ty, &mut names);
        let assembly = self.compilation().library().assembly_name.clone();
        for name in names {
            let diagnostic = self.ctx.report(
                d::INTERNAL_API_USAGE,
                span,
                vec![name.clone(), assembly.clone()],
            );
            self.push_diagnostic(name, diagnostic);
        }
    }

    fn attribute_type(&self, attr: &Attribute) -> ResolvedType {
        let segments = |last_suffix: &str| -> Vec<NameSegment> {
            let count = attr.name.len();
            attr.name
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    let text = if i + 1 == count {
                        format!("{text}{last_suffix}")
                    } else {
                        text.clone()
                    };
                    NameSegment {
                        name: Ident {
                            text,
                            span: attr.name_span,
                        },
                        type_args: if i + 1 == count {
                            attr.type_args.clone()
                        } else {
                            Vec::new()
                        },
                        span: attr.name_span,
                    }
                })
                .collect()
        };
        ["", "Attribute"]
            .into_iter()
            .map(|suffix| TypeRef {
                kind: TypeRefKind::Named {
                    global: false,
                    segments: segments(suffix),
                },
                span: attr.name_span,
            })
            .map(|ty| self.resolve(&ty))
            .find(|resolved| resolved.declared_id().is_some())
            .unwrap_or(ResolvedType::Unknown)
    }
}

impl<'c> Visitor<'c> for BodyWalker<'_, 'c> {
    fn visit_type_decl(&mut self, _decl: &'c TypeDecl) {}

    fn visit_member(&mut self, member: &'c Member) {
        match member {
            Member::Field(field) => {
                let ty = self.resolve(&field.ty);
                for declarator in &field.declarators {
                    if let Some(init) = &declarator.initializer {
                        self.check_value(init, &ty);
                    }
                }
                visit::walk_member(self, member);
            }
            Member::Property(prop) => {
                let ty = self.resolve(&prop.ty);
                if let Some(init) = &prop.initializer {
                    self.check_value(init, &ty);
                }
                if let Some(body) = &prop.expression_body {
                    self.check_value(body, &ty);
                }
                let saved = std::mem::replace(&mut self.returns, ty);
                visit::walk_member(self, member);
                self.returns = saved;
            }
            Member::Method(method) => self.walk_function(method),
            Member::Constructor(ctor) => {
                let saved = std::mem::replace(&mut self.returns, ResolvedType::Unknown);
                self.locals.push();
                self.declare_params(&ctor.params.params);
                visit::walk_member(self, member);
                self.locals.pop();
                self.returns = saved;
            }
            Member::Type(_) => {}
            Member::Other(_) => visit::walk_member(self, member),
        }
    }

    fn visit_attribute(&mut self, attr: &'c Attribute) {
        if self.check == Check::InternalApi {
            let ty = self.attribute_type(attr);
            self.report_internal(attr.name_span, &ty);
        }
        visit::walk_attribute(self, attr);
    }

    fn visit_parameter(&mut self, param: &'c Parameter) {
        if let Some(default) = &param.default {
            let ty = self.resolve(&param.ty);
            self.check_value(default, &ty);
        }
        visit::walk_parameter(self, param);
    }

    fn visit_block(&mut self, block: &'c Block) {
        self.locals.push();
        visit::walk_block(self, block);
        self.locals.pop();
    }

    fn visit_stmt(&mut self, stmt: &'c Stmt) {
        match &stmt.kind {
            StmtKind::LocalDecl {
                ty, declarators, ..
            } => {
                self.visit_type_ref(ty);
                let declared = (!ty.is_var()).then(|| self.resolve(ty));
                for declarator in declarators {
                    let local_ty = match (&declared, &declarator.initializer) {
                        (Some(t), Some(init)) => {
                            self.check_value(init, t);
                            t.clone()
                        }
                        (Some(t), None) => t.clone(),
                        (None, Some(init)) => self.type_of(init),
                        (None, None) => ResolvedType::Unknown,
                    };
                    if let Some(init) = &declarator.initializer {
                        self.visit_expr(init);
                    }
                    self.locals.declare(declarator.name.text.clone(), local_ty);
                }
            }
            StmtKind::Return(Some(expr)) => {
                let target = self.returns.clone();
                self.check_value(expr, &target);
                self.visit_expr(expr);
            }
            StmtKind::LocalFunction(method) => {
                self.locals.declare(method.name.text.clone(), ResolvedType::Unknown);
                self.walk_function(method);
            }
            StmtKind::ForEach { ty, name, expr, body } => {
                self.visit_type_ref(ty);
                self.visit_expr(expr);
                let element = if ty.is_var() {
                    ResolvedType::Unknown
                } else {
                    self.resolve(ty)
                };
                self.locals.push();
                self.locals.declare(name.text.clone(), element);
                self.visit_stmt(body);
                self.locals.pop();
            }
            StmtKind::Try {
                block,
                catches,
                finally,
            } => {
                self.visit_block(block);
                for catch in catches {
                    self.locals.push();
                    if let Some(ty) = &catch.ty {
                        self.visit_type_ref(ty);
                        if let Some(name) = &catch.name {
                            let resolved = self.resolve(ty);
                            self.locals.declare(name.text.clone(), resolved);
                        }
                    }
                    if let Some(filter) = &catch.filter {
                        self.visit_expr(filter);
                    }
                    self.visit_block(&catch.block);
                    self.locals.pop();
                }
                if let Some(finally) = finally {
                    self.visit_block(finally);
                }
            }
            StmtKind::For { .. } | StmtKind::Using { .. } => {
                self.locals.push();
                visit::walk_stmt(self, stmt);
                self.locals.pop();
            }
            _ => visit::walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &'c Expr) {
        match &expr.kind {
            ExprKind::Binary { op, lhs, rhs } if op == "==" || op == "!=" => {
                // comparisons against the zero value are fine
                for operand in [lhs, rhs] {
                    if is_zero_value_operand(operand) {
                        visit::walk_expr(self, operand.unparenthesized());
                    } else {
                        self.visit_expr(operand);
                    }
                }
                return;
            }
            ExprKind::Binary { op, lhs, rhs } if op == "??" => {
                let target = self.type_of(lhs).strip_nullable().clone();
                self.check_value(rhs, &target);
            }
            ExprKind::Assignment { op, target, value } if op == "=" => {
                let target = self.type_of(target);
                self.check_value(value, &target);
            }
            ExprKind::Default(Some(_)) | ExprKind::ObjectCreation { ty: Some(_), .. } => {
                self.check_value(expr, &ResolvedType::Unknown);
            }
            ExprKind::Invocation { callee, args, .. } => {
                self.check_arguments(callee, args);
                self.check_dispatch(callee, args);
                visit::walk_expr(self, expr);
                for (position, arg) in args.iter().enumerate() {
                    if let ExprKind::Declaration { ty, name } = &arg.expr.kind {
                        let declared = if ty.is_var() {
                            self.compilation()
                                .out_argument_type(callee, position, &self.scope, &self.locals)
                        } else {
                            self.resolve(ty)
                        };
                        self.locals.declare(name.text.clone(), declared);
                    }
                }
                return;
            }
            ExprKind::MemberAccess {
                target,
                name,
                type_args,
                ..
            } if self.check == Check::InternalApi => {
                if let Some(owner) = self
                    .compilation()
                    .expr_as_type(target, &self.scope, &self.locals)
                {
                    self.report_internal(target.span, &owner);
                    for ty in type_args {
                        self.visit_type_ref(ty);
                    }
                    return;
                }
                let receiver = self.type_of(target);
                if let Some(id) = receiver.strip_nullable().declared_id() {
                    let compilation = self.compilation();
                    let owner = compilation
                        .find_member(id, &name.text)
                        .map(|m| m.owner)
                        .or_else(|| {
                            compilation
                                .find_methods(id, &name.text)
                                .first()
                                .map(|(owner, _)| *owner)
                        });
                    if let Some(owner) = owner.filter(|o| self.is_internal(*o)) {
                        self.report_internal(name.span, &ResolvedType::declared(owner));
                    }
                }
            }
            ExprKind::Is { expr: inner, pattern } => {
                visit::walk_expr(self, expr);
                if let Pattern::Type {
                    ty,
                    designation: Some(name),
                } = pattern.as_ref()
                {
                    let declared = if ty.is_var() {
                        self.type_of(inner)
                    } else {
                        self.resolve(ty)
                    };
                    self.locals.declare(name.text.clone(), declared);
                }
                return;
            }
            _ => {}
        }
        visit::walk_expr(self, expr);
    }

    fn visit_lambda(&mut self, lambda: &'c Lambda) {
        let saved = std::mem::replace(&mut self.returns, ResolvedType::Unknown);
        self.locals.push();
        for param in &lambda.params {
            let ty = param
                .ty
                .as_ref()
                .map_or(ResolvedType::Unknown, |ty| self.resolve(ty));
            self.locals.declare(param.name.text.clone(), ty);
        }
        visit::walk_lambda(self, lambda);
        self.locals.pop();
        self.returns = saved;
    }

    /// Type arguments are covered by resolving the whole reference.
    fn visit_type_ref(&mut self, ty: &'c TypeRef) {
        if self.check == Check::InternalApi {
            let resolved = self.resolve(ty);
            self.report_internal(ty.span, &resolved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{args, run, run_on};
    use super::*;
    use crate::diagnostics::Severity;
    use crate::semantic::{Assembly, CompilationOptions};
    use crate::syntax::SourceFile;
    use indoc::indoc;
    use std::sync::Arc;

    #[test]
    fn usage_rules_are_known() {
        assert!(is_usage_rule(d::DEFAULT_INSTANCE_NOT_ALLOWED));
        assert!(is_usage_rule(d::INTERNAL_API_USAGE));
        assert!(!is_usage_rule(d::TYPE_MUST_BE_PARTIAL));
    }

    #[test]
    fn default_struct_union_and_comparison_exemption() {
        let src = indoc! {"
            [Union<string, int>]
            public readonly partial struct TestUnion_struct_string_int { }

            public class Consumer
            {
                public void Do<T>()
                {
                    TestUnion_struct_string_int testStruct = default;
                    if (default(T) == default) { }
                }
            }
        "};
        let found = run(src, d::DEFAULT_INSTANCE_NOT_ALLOWED);
        assert_eq!(
            args(&found),
            vec![vec!["TestUnion_struct_string_int".to_string()]]
        );
    }

    #[test]
    fn default_instances_in_value_positions() {
        let src = indoc! {"
            [ValueObject<int>]
            public readonly partial struct Amount { }

            [ValueObject<int>(AllowDefaultStructs = true)]
            public readonly partial struct Count { }

            public class Consumer
            {
                private Amount _field = default;
                private Count _count = default;
                private Amount? _maybe = default;

                public Amount Make(Amount fallback = default) => new Amount();

                public Amount Get()
                {
                    return default;
                }

                public void Use(Amount amount)
                {
                    Use(default);
                    (Amount, int) pair = (default, 1);
                    Amount? nullable = null;
                    var value = nullable ?? default;
                    var explicitZero = default(Amount);
                    var created = new Amount();
                    if (amount == default) { }
                    if (amount != new Amount()) { }
                    Count count = default;
                }
            }
        "};
        let found = run(src, d::DEFAULT_INSTANCE_NOT_ALLOWED);
        assert_eq!(found.len(), 9);
        assert!(found.iter().all(|d| d.args == vec!["Amount".to_string()]));
    }

    #[test]
    fn non_static_dispatch_callbacks() {
        let src = indoc! {"
            [SmartEnum<string>]
            public sealed partial class TestEnum
            {
                public static readonly TestEnum Item1 = default;
                public static readonly TestEnum Item2 = default;
            }

            public class Consumer
            {
                public void Do(TestEnum testEnum)
                {
                    var x = 42;
                    testEnum.Switch(item1: () => { _ = x; }, item2: () => {});
                    testEnum.Switch(item1: static () => {}, item2: Handle);
                    testEnum.Map(item1: () => 1, item2: () => 2);
                }

                private static void Handle() { }
            }
        "};
        let found = run(src, d::DISPATCH_LAMBDA_MUST_BE_STATIC);
        assert_eq!(
            args(&found),
            vec![vec!["Switch".to_string()], vec!["Switch".to_string()]]
        );
        assert!(found.iter().all(|d| d.severity == Severity::Warning));
        assert!(found.iter().all(|d| d.node_span == d.location.span));
    }

    #[test]
    fn union_receivers_and_case_types() {
        let src = indoc! {"
            [Union<string, int>]
            public sealed partial class TextOrNumber { }

            [Union]
            public abstract partial record Result
            {
                private Result() { }

                public sealed record Success(int Value) : Result;
            }

            public class Consumer
            {
                public void Do(TextOrNumber value, Result.Success success, string other)
                {
                    value.SwitchPartially(s => { }, static i => { });
                    success.Switch(s => { });
                    other.Switch(s => { });
                }
            }
        "};
        let found = run(src, d::DISPATCH_LAMBDA_MUST_BE_STATIC);
        assert_eq!(
            args(&found),
            vec![vec!["SwitchPartially".to_string()], vec!["Switch".to_string()]]
        );
    }

    const LIBRARY: &str = indoc! {"
        namespace Thinktecture.Internal
        {
            public interface IMetadataOwner { }

            public static class MetadataLookup
            {
                public static object Find(object key) => null;
            }

            public sealed class Metadata<T> { }
        }
    "};

    fn with_library(app: &str) -> Compilation {
        let app = Assembly::new("App", vec![Arc::new(SourceFile::parse("App.cs", app))]);
        let lib = Assembly::new(
            "Thinktecture.Runtime.Extensions",
            vec![Arc::new(SourceFile::parse("Lib.cs", LIBRARY))],
        );
        Compilation::new(app, vec![lib], CompilationOptions::default())
    }

    #[test]
    fn internal_symbols_outside_the_library() {
        let c = with_library(indoc! {"
            public class Consumer : IMetadataOwner
            {
                private Metadata<Metadata<int>> _nested;
                private Metadata<string>[] _array;

                public void Do()
                {
                    var found = MetadataLookup.Find(typeof(Consumer));
                    var qualified = Thinktecture.Internal.MetadataLookup.Find(null);
                }
            }
        "});
        let found = run_on(&c, d::INTERNAL_API_USAGE);
        let names: Vec<&str> = found.iter().map(|d| d.args[0].as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Thinktecture.Internal.IMetadataOwner",
                "Thinktecture.Internal.Metadata",
                "Thinktecture.Internal.Metadata",
                "Thinktecture.Internal.MetadataLookup",
                "Thinktecture.Internal.MetadataLookup",
            ]
        );
        assert!(found
            .iter()
            .all(|d| d.args[1] == "Thinktecture.Runtime.Extensions"));
    }

    #[test]
    fn the_library_itself_may_use_internals() {
        let src = indoc! {"
            namespace Thinktecture.Internal
            {
                public interface IMetadataOwner { }
            }

            public class Owner : Thinktecture.Internal.IMetadataOwner { }
        "};
        let c = Compilation::from_sources("Thinktecture.Runtime.Extensions", &[("Lib.cs", src)]);
        assert!(run_on(&c, d::INTERNAL_API_USAGE).is_empty());
    }
}
