//! Lowering from the tree-sitter concrete tree into [`crate::syntax::ast`].
//!
//! Node kinds the declaration model has no place for become `Opaque`
//! expressions, `Unknown` statements or are skipped; `ERROR` nodes are
//! skipped everywhere.

mod expr;
mod stmt;
mod types;

use super::ast::*;
use crate::common::Span;
use tree_sitter::Node;

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "delegate_declaration",
];

const PREPROC_BRANCHES: &[&str] = &["preproc_if", "preproc_elif", "preproc_else"];

pub(crate) struct Lowerer<'a> {
    src: &'a str,
    /// Bytes of synthetic prefix to subtract from every span.
    shift: usize,
    namespace: Vec<String>,
}

fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).filter(|c| !c.is_extra()).collect()
}

fn named<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !c.is_extra())
        .collect()
}

fn named_of_kind<'t>(node: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    named(node).into_iter().filter(|c| c.kind() == kind).collect()
}

fn first_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    named(node).into_iter().find(|c| c.kind() == kind)
}

/// Anonymous token child such as `{` or `record`.
fn token<'t>(node: Node<'t>, text: &str) -> Option<Node<'t>> {
    children(node)
        .into_iter()
        .find(|c| !c.is_named() && !c.is_missing() && c.kind() == text)
}

/// First named child after the anonymous token `text`.
fn named_after<'t>(node: Node<'t>, text: &str) -> Option<Node<'t>> {
    children(node)
        .into_iter()
        .skip_while(|c| c.is_named() || c.kind() != text)
        .skip(1)
        .find(|c| c.is_named())
}

impl<'a> Lowerer<'a> {
    pub(crate) fn new(src: &'a str, shift: usize) -> Self {
        Self {
            src,
            shift,
            namespace: Vec::new(),
        }
    }

    fn span(&self, node: Node) -> Span {
        Span::new(
            node.start_byte().saturating_sub(self.shift),
            node.end_byte().saturating_sub(self.shift),
        )
    }

    fn text(&self, node: Node) -> &'a str {
        let src = self.src;
        &src[node.start_byte()..node.end_byte()]
    }

    fn ident(&self, node: Node) -> Ident {
        let text = self.text(node);
        Ident {
            text: text.strip_prefix('@').unwrap_or(text).to_string(),
            span: self.span(node),
        }
    }

    fn field_ident(&self, node: Node, field: &str) -> Ident {
        match node.child_by_field_name(field) {
            Some(name) => self.ident(name),
            None => Ident {
                text: String::new(),
                span: Span::empty(self.span(node).end),
            },
        }
    }

    // -- compilation units and namespaces ------------------------------------

    pub(crate) fn compilation_unit(&mut self, root: Node) -> CompilationUnit {
        let mut unit = CompilationUnit::default();
        self.namespace_members(root, &mut unit.types);
        unit
    }

    fn namespace_members(&mut self, node: Node, types: &mut Vec<TypeDecl>) {
        for child in named(node) {
            match child.kind() {
                "namespace_declaration" => {
                    let depth = self.namespace.len();
                    self.enter_namespace(child);
                    if let Some(body) = child.child_by_field_name("body") {
                        self.namespace_members(body, types);
                    }
                    self.namespace.truncate(depth);
                }
                // file-scoped: applies to the rest of the file
                "file_scoped_namespace_declaration" => self.enter_namespace(child),
                kind if TYPE_DECLARATIONS.contains(&kind) => types.push(self.type_decl(child)),
                kind if PREPROC_BRANCHES.contains(&kind) => self.namespace_members(child, types),
                _ => {}
            }
        }
    }

    fn enter_namespace(&mut self, node: Node) {
        if let Some(name) = node.child_by_field_name("name") {
            let text: String = self
                .text(name)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            self.namespace
                .extend(text.split('.').filter(|s| !s.is_empty()).map(str::to_string));
        }
    }

    // -- type declarations --------------------------------------------------

    fn type_decl(&mut self, node: Node) -> TypeDecl {
        let (kind, keyword_span) = self.type_keyword(node);
        let mut modifiers = self.modifiers(node);
        if let Some(ref_token) = token(node, "ref") {
            modifiers.push(Modifier {
                kind: ModifierKind::Ref,
                span: self.span(ref_token),
            });
        }

        let type_params = first_of_kind(node, "type_parameter_list")
            .map(|list| {
                named_of_kind(list, "type_parameter")
                    .into_iter()
                    .map(|p| self.field_ident(p, "name"))
                    .collect()
            })
            .unwrap_or_default();
        let primary_ctor = match kind {
            TypeDeclKind::Delegate => None,
            _ => first_of_kind(node, "parameter_list").map(|list| self.parameter_list(list)),
        };
        let base_list = first_of_kind(node, "base_list")
            .map(|list| self.base_types(list))
            .unwrap_or_default();

        let mut members = Vec::new();
        let mut open_brace = None;
        let mut close_brace = None;
        if let Some(body) = node.child_by_field_name("body") {
            open_brace = token(body, "{").map(|b| self.span(b));
            close_brace = token(body, "}").map(|b| self.span(b));
            if body.kind() == "enum_member_declaration_list" {
                self.enum_members(body, &mut members);
            } else {
                self.members(body, &mut members);
            }
        }

        TypeDecl {
            namespace: self.namespace.join("."),
            attributes: self.attribute_lists(node),
            modifiers,
            kind,
            keyword_span,
            name: self.field_ident(node, "name"),
            type_params,
            primary_ctor,
            base_list,
            constraints: self.constraint_clauses(node),
            members,
            open_brace,
            close_brace,
            span: self.span(node),
        }
    }

    fn type_keyword(&self, node: Node) -> (TypeDeclKind, Span) {
        let (kind, keyword) = match node.kind() {
            "struct_declaration" => (TypeDeclKind::Struct, "struct"),
            "interface_declaration" => (TypeDeclKind::Interface, "interface"),
            "enum_declaration" => (TypeDeclKind::Enum, "enum"),
            "delegate_declaration" => (TypeDeclKind::Delegate, "delegate"),
            "record_declaration" => (TypeDeclKind::Record, "record"),
            _ => (TypeDeclKind::Class, "class"),
        };
        let Some(keyword) = token(node, keyword) else {
            return (kind, Span::empty(self.span(node).start));
        };
        let span = self.span(keyword);
        if kind != TypeDeclKind::Record {
            return (kind, span);
        }
        match token(node, "struct") {
            Some(s) => (TypeDeclKind::RecordStruct, span.cover(self.span(s))),
            None => match token(node, "class") {
                Some(c) => (TypeDeclKind::Record, span.cover(self.span(c))),
                None => (TypeDeclKind::Record, span),
            },
        }
    }

    fn base_types(&self, list: Node) -> Vec<TypeRef> {
        named(list)
            .into_iter()
            .filter(|c| c.kind() != "argument_list")
            .map(|c| match c.kind() {
                // record base with arguments: `: Base(x)`
                "primary_constructor_base_type" => match c.child_by_field_name("type") {
                    Some(ty) => self.type_ref(ty),
                    None => self.missing_type(c),
                },
                _ => self.type_ref(c),
            })
            .collect()
    }

    fn constraint_clauses(&self, node: Node) -> Vec<ConstraintClause> {
        named_of_kind(node, "type_parameter_constraints_clause")
            .into_iter()
            .map(|clause| {
                let param = match first_of_kind(clause, "identifier") {
                    Some(id) => self.ident(id),
                    None => self.field_ident(clause, "name"),
                };
                let constraints = named_of_kind(clause, "type_parameter_constraint")
                    .into_iter()
                    .filter_map(|c| c.child_by_field_name("type"))
                    .map(|ty| self.type_ref(ty))
                    .collect();
                ConstraintClause {
                    param,
                    constraints,
                    span: self.span(clause),
                }
            })
            .collect()
    }

    fn enum_members(&mut self, body: Node, members: &mut Vec<Member>) {
        for child in named(body) {
            match child.kind() {
                "enum_member_declaration" => {
                    let bodies = child
                        .child_by_field_name("value")
                        .map(|v| Body::Expression(self.expr(v)))
                        .into_iter()
                        .collect();
                    members.push(Member::Other(OtherMember {
                        kind: OtherMemberKind::EnumMember,
                        attributes: self.attribute_lists(child),
                        modifiers: Vec::new(),
                        bodies,
                        span: self.span(child),
                    }));
                }
                kind if PREPROC_BRANCHES.contains(&kind) => self.enum_members(child, members),
                _ => {}
            }
        }
    }

    fn members(&mut self, body: Node, members: &mut Vec<Member>) {
        for child in named(body) {
            if PREPROC_BRANCHES.contains(&child.kind()) {
                self.members(child, members);
            } else if let Some(member) = self.member(child) {
                members.push(member);
            }
        }
    }

    fn member(&mut self, node: Node) -> Option<Member> {
        let member = match node.kind() {
            kind if TYPE_DECLARATIONS.contains(&kind) => Member::Type(self.type_decl(node)),
            "field_declaration" => Member::Field(self.field(node)),
            "property_declaration" => Member::Property(self.property(node)),
            "method_declaration" => Member::Method(self.method(node)),
            "constructor_declaration" => Member::Constructor(self.constructor(node)),
            "event_field_declaration" => self.other(node, OtherMemberKind::Event, Vec::new()),
            "event_declaration" => {
                let bodies = self.accessor_bodies(node);
                self.other(node, OtherMemberKind::Event, bodies)
            }
            "indexer_declaration" => {
                let mut bodies = self.accessor_bodies(node);
                bodies.extend(self.function_body(node));
                self.other(node, OtherMemberKind::Indexer, bodies)
            }
            "operator_declaration" => {
                let bodies = self.function_body(node).into_iter().collect();
                self.other(node, OtherMemberKind::Operator, bodies)
            }
            "conversion_operator_declaration" => {
                let bodies = self.function_body(node).into_iter().collect();
                self.other(node, OtherMemberKind::Conversion, bodies)
            }
            "destructor_declaration" => {
                let bodies = self.function_body(node).into_iter().collect();
                self.other(node, OtherMemberKind::Finalizer, bodies)
            }
            _ => return None,
        };
        Some(member)
    }

    fn other(&self, node: Node, kind: OtherMemberKind, bodies: Vec<Body>) -> Member {
        Member::Other(OtherMember {
            kind,
            attributes: self.attribute_lists(node),
            modifiers: self.modifiers(node),
            bodies,
            span: self.span(node),
        })
    }

    fn accessor_bodies(&self, node: Node) -> Vec<Body> {
        let Some(list) = node.child_by_field_name("accessors") else {
            return Vec::new();
        };
        self.accessor_list(list)
            .accessors
            .into_iter()
            .filter_map(|a| match a.body {
                AccessorBody::None => None,
                AccessorBody::Expression(e) => Some(Body::Expression(e)),
                AccessorBody::Block(b) => Some(Body::Block(b)),
            })
            .collect()
    }

    /// `{ body }` or `=> expr;`; the `value` field holds the arrow clause
    /// on indexers.
    fn function_body(&self, node: Node) -> Option<Body> {
        let body = node
            .child_by_field_name("body")
            .or_else(|| node.child_by_field_name("value"))?;
        match body.kind() {
            "block" => Some(Body::Block(self.block(body))),
            "arrow_expression_clause" => Some(Body::Expression(self.arrow(body))),
            _ => None,
        }
    }

    fn arrow(&self, clause: Node) -> Expr {
        match named(clause).into_iter().next() {
            Some(expr) => self.expr(expr),
            None => Expr::opaque(self.span(clause)),
        }
    }

    fn field(&self, node: Node) -> FieldDecl {
        let (ty, declarators) = match first_of_kind(node, "variable_declaration") {
            Some(decl) => self.variable_declaration(decl),
            None => (self.missing_type(node), Vec::new()),
        };
        FieldDecl {
            attributes: self.attribute_lists(node),
            modifiers: self.modifiers(node),
            ty,
            declarators,
            span: self.span(node),
        }
    }

    /// `Type a = 1, b`
    fn variable_declaration(&self, node: Node) -> (TypeRef, Vec<VariableDeclarator>) {
        let ty = match node.child_by_field_name("type") {
            Some(ty) => self.type_ref(ty),
            None => self.missing_type(node),
        };
        let declarators = named_of_kind(node, "variable_declarator")
            .into_iter()
            .map(|d| VariableDeclarator {
                name: self.field_ident(d, "name"),
                initializer: self.initializer(d),
                span: self.span(d),
            })
            .collect();
        (ty, declarators)
    }

    /// Initializer of a declarator; a bare `{ 1, 2 }` is an array creation.
    pub(crate) fn initializer(&self, declarator: Node) -> Option<Expr> {
        let value = named_after(declarator, "=")?;
        if value.kind() == "initializer_expression" {
            return Some(Expr {
                kind: ExprKind::ArrayCreation {
                    ty: None,
                    sizes: Vec::new(),
                    initializer: Some(self.elements(value)),
                },
                span: self.span(value),
            });
        }
        Some(self.expr(value))
    }

    fn explicit_interface(&self, node: Node) -> Option<TypeRef> {
        let specifier = first_of_kind(node, "explicit_interface_specifier")?;
        let name = named(specifier).into_iter().next()?;
        Some(self.type_ref(name))
    }

    fn property(&self, node: Node) -> PropertyDecl {
        let mut expression_body = None;
        let mut initializer = None;
        if let Some(value) = node.child_by_field_name("value") {
            if value.kind() == "arrow_expression_clause" {
                expression_body = Some(self.arrow(value));
            } else {
                initializer = Some(self.expr(value));
            }
        }
        PropertyDecl {
            attributes: self.attribute_lists(node),
            modifiers: self.modifiers(node),
            ty: self.field_type(node, "type"),
            explicit_interface: self.explicit_interface(node),
            name: self.field_ident(node, "name"),
            accessor_list: node
                .child_by_field_name("accessors")
                .map(|list| self.accessor_list(list)),
            expression_body,
            initializer,
            span: self.span(node),
        }
    }

    fn accessor_list(&self, list: Node) -> AccessorList {
        let accessors = named_of_kind(list, "accessor_declaration")
            .into_iter()
            .filter_map(|acc| {
                let keyword = acc.child_by_field_name("name")?;
                let kind = match self.text(keyword) {
                    "get" => AccessorKind::Get,
                    "set" => AccessorKind::Set,
                    "init" => AccessorKind::Init,
                    "add" => AccessorKind::Add,
                    "remove" => AccessorKind::Remove,
                    _ => return None,
                };
                let body = match acc.child_by_field_name("body") {
                    Some(b) if b.kind() == "block" => AccessorBody::Block(self.block(b)),
                    Some(b) if b.kind() == "arrow_expression_clause" => {
                        AccessorBody::Expression(self.arrow(b))
                    }
                    _ => AccessorBody::None,
                };
                Some(Accessor {
                    attributes: self.attribute_lists(acc),
                    modifiers: self.modifiers(acc),
                    kind,
                    keyword_span: self.span(keyword),
                    body,
                    span: self.span(acc),
                })
            })
            .collect();
        AccessorList {
            accessors,
            span: self.span(list),
        }
    }

    fn method(&self, node: Node) -> MethodDecl {
        MethodDecl {
            attributes: self.attribute_lists(node),
            modifiers: self.modifiers(node),
            return_type: self.field_type(node, "returns"),
            explicit_interface: self.explicit_interface(node),
            name: self.field_ident(node, "name"),
            type_params: self.type_params(node),
            params: self.parameters_field(node),
            constraints: self.constraint_clauses(node),
            body: self.function_body(node),
            span: self.span(node),
        }
    }

    /// Local functions share the method shape; their return type is the
    /// `type` field.
    fn local_function(&self, node: Node) -> MethodDecl {
        MethodDecl {
            return_type: self.field_type(node, "type"),
            ..self.method(node)
        }
    }

    fn type_params(&self, node: Node) -> Vec<Ident> {
        first_of_kind(node, "type_parameter_list")
            .map(|list| {
                named_of_kind(list, "type_parameter")
                    .into_iter()
                    .map(|p| self.field_ident(p, "name"))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parameters_field(&self, node: Node) -> ParameterList {
        match node.child_by_field_name("parameters") {
            Some(list) => self.parameter_list(list),
            None => ParameterList {
                params: Vec::new(),
                span: Span::empty(self.span(node).end),
            },
        }
    }

    fn constructor(&self, node: Node) -> ConstructorDecl {
        let initializer = first_of_kind(node, "constructor_initializer").map(|init| {
            ConstructorInitializer {
                is_base: token(init, "base").is_some(),
                args: first_of_kind(init, "argument_list")
                    .map(|list| self.arguments(list))
                    .unwrap_or_default(),
                span: self.span(init),
            }
        });
        ConstructorDecl {
            attributes: self.attribute_lists(node),
            modifiers: self.modifiers(node),
            name: self.field_ident(node, "name"),
            params: self.parameters_field(node),
            initializer,
            body: self.function_body(node),
            span: self.span(node),
        }
    }

    // -- shared pieces ------------------------------------------------------

    fn modifiers(&self, node: Node) -> Vec<Modifier> {
        named_of_kind(node, "modifier")
            .into_iter()
            .filter_map(|m| {
                ModifierKind::from_keyword(self.text(m).trim()).map(|kind| Modifier {
                    kind,
                    span: self.span(m),
                })
            })
            .collect()
    }

    fn attribute_lists(&self, node: Node) -> Vec<AttributeList> {
        named_of_kind(node, "attribute_list")
            .into_iter()
            .map(|list| {
                let target = first_of_kind(list, "attribute_target_specifier").and_then(|spec| {
                    children(spec).into_iter().next().map(|kw| self.ident(kw))
                });
                AttributeList {
                    target,
                    attributes: named_of_kind(list, "attribute")
                        .into_iter()
                        .map(|a| self.attribute(a))
                        .collect(),
                    span: self.span(list),
                }
            })
            .collect()
    }

    fn attribute(&self, node: Node) -> Attribute {
        let mut name = Vec::new();
        let mut type_args = Vec::new();
        let mut name_span = Span::empty(self.span(node).start);
        if let Some(name_node) = node.child_by_field_name("name") {
            let segments = self.name_segments(name_node);
            if let Some(last) = segments.last() {
                type_args = last.type_args.clone();
                name_span = Span::new(self.span(name_node).start, last.name.span.end);
            }
            name = segments.into_iter().map(|s| s.name.text).collect();
        }
        let arg_list = first_of_kind(node, "attribute_argument_list");
        let args = arg_list
            .map(|list| {
                named_of_kind(list, "attribute_argument")
                    .into_iter()
                    .map(|arg| self.attribute_arg(arg))
                    .collect()
            })
            .unwrap_or_default();
        Attribute {
            name,
            name_span,
            type_args,
            args,
            args_span: arg_list.map(|list| self.span(list)),
            span: self.span(node),
        }
    }

    fn attribute_arg(&self, node: Node) -> AttributeArg {
        let parts = named(node);
        let named_form = token(node, "=").is_some() || token(node, ":").is_some();
        let (name, value) = match parts.as_slice() {
            [name, value] if named_form => (Some(self.ident(*name)), self.expr(*value)),
            // `Name = value` may also come back as an assignment
            [value] => split_named_assignment(self.expr(*value)),
            _ => (None, Expr::opaque(self.span(node))),
        };
        AttributeArg {
            name,
            value,
            span: self.span(node),
        }
    }
}

fn split_named_assignment(expr: Expr) -> (Option<Ident>, Expr) {
    if let ExprKind::Assignment { op, target, value } = &expr.kind {
        if let ExprKind::Name { name, .. } = &target.kind {
            if op == "=" {
                return (Some(name.clone()), (**value).clone());
            }
        }
    }
    (None, expr)
}
