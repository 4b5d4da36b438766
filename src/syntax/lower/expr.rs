//! Expressions, arguments, lambdas and patterns.

use super::{children, first_of_kind, named, named_of_kind, token, Lowerer};
use crate::common::Span;
use crate::syntax::ast::*;
use tree_sitter::Node;

impl<'a> Lowerer<'a> {
    fn boxed(&self, node: Option<Node>, at: Node) -> Box<Expr> {
        Box::new(match node {
            Some(n) => self.expr(n),
            None => Expr::opaque(Span::empty(self.span(at).end)),
        })
    }

    fn first_expr(&self, node: Node) -> Box<Expr> {
        self.boxed(named(node).into_iter().next(), node)
    }

    fn operator(&self, node: Node) -> String {
        node.child_by_field_name("operator")
            .map(|op| self.text(op).to_string())
            .unwrap_or_default()
    }

    pub(crate) fn expr(&self, node: Node) -> Expr {
        let span = self.span(node);
        let kind = match node.kind() {
            "integer_literal" => ExprKind::Literal(LiteralKind::Int),
            "real_literal" => ExprKind::Literal(LiteralKind::Real),
            "string_literal" | "verbatim_string_literal" | "raw_string_literal"
            | "interpolated_string_expression" => ExprKind::Literal(LiteralKind::String),
            "character_literal" => ExprKind::Literal(LiteralKind::Char),
            "boolean_literal" if self.text(node) == "true" => ExprKind::Literal(LiteralKind::True),
            "boolean_literal" => ExprKind::Literal(LiteralKind::False),
            "null_literal" => ExprKind::Literal(LiteralKind::Null),
            "this" => ExprKind::This,
            "base" => ExprKind::Base,
            "identifier" | "generic_name" | "discard" => {
                let (name, type_args) = self.simple_name(node);
                ExprKind::Name { name, type_args }
            }
            "qualified_name" => self.qualified_name(node),
            "alias_qualified_name" => match node.child_by_field_name("name") {
                Some(name) => return Expr { span, ..self.expr(name) },
                None => ExprKind::Opaque,
            },
            "predefined_type" => ExprKind::PredefinedType(self.text(node).to_string()),
            "default_expression" => {
                ExprKind::Default(node.child_by_field_name("type").map(|t| self.type_ref(t)))
            }
            "typeof_expression" => ExprKind::TypeOf(self.field_type(node, "type")),
            "sizeof_expression" => ExprKind::SizeOf(self.field_type(node, "type")),
            "object_creation_expression" => ExprKind::ObjectCreation {
                ty: node.child_by_field_name("type").map(|t| self.type_ref(t)),
                args: node
                    .child_by_field_name("arguments")
                    .map(|a| self.arguments(a)),
                initializer: node
                    .child_by_field_name("initializer")
                    .map(|i| self.elements(i)),
            },
            // target-typed `new(...)`
            "implicit_object_creation_expression" => ExprKind::ObjectCreation {
                ty: None,
                args: first_of_kind(node, "argument_list").map(|a| self.arguments(a)),
                initializer: first_of_kind(node, "initializer_expression").map(|i| self.elements(i)),
            },
            "array_creation_expression" => self.array_creation(node),
            // `new[] { ... }`
            "implicit_array_creation_expression" => ExprKind::ArrayCreation {
                ty: None,
                sizes: Vec::new(),
                initializer: first_of_kind(node, "initializer_expression").map(|i| self.elements(i)),
            },
            "anonymous_object_creation_expression" => ExprKind::AnonymousObject(self.anonymous_members(node)),
            "initializer_expression" => ExprKind::Collection(self.elements(node)),
            "invocation_expression" => return self.invocation(node),
            "cast_expression" => ExprKind::Cast {
                ty: self.field_type(node, "type"),
                expr: self.boxed(node.child_by_field_name("value"), node),
            },
            "parenthesized_expression" | "checked_expression" => {
                ExprKind::Parenthesized(self.first_expr(node))
            }
            "tuple_expression" => ExprKind::Tuple(self.arguments(node)),
            "lambda_expression" => ExprKind::Lambda(Box::new(self.lambda(node))),
            "member_access_expression" => {
                let (name, type_args) = match node.child_by_field_name("name") {
                    Some(n) => self.simple_name(n),
                    None => (
                        Ident {
                            text: String::new(),
                            span: Span::empty(span.end),
                        },
                        Vec::new(),
                    ),
                };
                ExprKind::MemberAccess {
                    target: self.boxed(node.child_by_field_name("expression"), node),
                    name,
                    type_args,
                    conditional: false,
                }
            }
            "conditional_access_expression" => self.conditional_access(node),
            "member_binding_expression" => match node.child_by_field_name("name") {
                Some(n) => {
                    let (name, type_args) = self.simple_name(n);
                    ExprKind::Name { name, type_args }
                }
                None => ExprKind::Opaque,
            },
            "element_access_expression" => ExprKind::ElementAccess {
                target: self.boxed(node.child_by_field_name("expression"), node),
                args: node
                    .child_by_field_name("subscript")
                    .map(|s| self.arguments(s))
                    .unwrap_or_default(),
            },
            "prefix_unary_expression" => ExprKind::Unary {
                op: children(node)
                    .first()
                    .map(|op| self.text(*op).to_string())
                    .unwrap_or_default(),
                operand: self.first_expr(node),
            },
            "postfix_unary_expression" => ExprKind::Postfix {
                op: children(node)
                    .last()
                    .map(|op| self.text(*op).to_string())
                    .unwrap_or_default(),
                operand: self.first_expr(node),
            },
            "await_expression" => ExprKind::Unary {
                op: "await".to_string(),
                operand: self.first_expr(node),
            },
            "ref_expression" => ExprKind::Unary {
                op: "ref".to_string(),
                operand: self.first_expr(node),
            },
            "range_expression" => self.range(node),
            "binary_expression" => ExprKind::Binary {
                op: self.operator(node),
                lhs: self.boxed(node.child_by_field_name("left"), node),
                rhs: self.boxed(node.child_by_field_name("right"), node),
            },
            "assignment_expression" => ExprKind::Assignment {
                op: self.operator(node),
                target: self.boxed(node.child_by_field_name("left"), node),
                value: self.boxed(node.child_by_field_name("right"), node),
            },
            "conditional_expression" => ExprKind::Conditional {
                cond: self.boxed(node.child_by_field_name("condition"), node),
                when_true: self.boxed(node.child_by_field_name("consequence"), node),
                when_false: self.boxed(node.child_by_field_name("alternative"), node),
            },
            "is_pattern_expression" => ExprKind::Is {
                expr: self.boxed(node.child_by_field_name("expression"), node),
                pattern: Box::new(match node.child_by_field_name("pattern") {
                    Some(p) => self.pattern(p),
                    None => Pattern::Opaque(span),
                }),
            },
            "is_expression" => ExprKind::Is {
                expr: self.boxed(node.child_by_field_name("left"), node),
                pattern: Box::new(Pattern::Type {
                    ty: self.field_type(node, "right"),
                    designation: None,
                }),
            },
            "as_expression" => ExprKind::As {
                expr: self.boxed(node.child_by_field_name("left"), node),
                ty: self.field_type(node, "right"),
            },
            "throw_expression" => ExprKind::Throw(self.first_expr(node)),
            "declaration_expression" => ExprKind::Declaration {
                ty: self.field_type(node, "type"),
                name: self.field_ident(node, "name"),
            },
            // switch, with and query expressions, anonymous methods
            _ => ExprKind::Opaque,
        };
        Expr { kind, span }
    }

    /// `A.B` parsed as a qualified name in expression position.
    fn qualified_name(&self, node: Node) -> ExprKind {
        let target = self.boxed(node.child_by_field_name("qualifier"), node);
        match node.child_by_field_name("name") {
            Some(n) => {
                let (name, type_args) = self.simple_name(n);
                ExprKind::MemberAccess {
                    target,
                    name,
                    type_args,
                    conditional: false,
                }
            }
            None => ExprKind::Opaque,
        }
    }

    /// `a?.B` and `a?[i]`.
    fn conditional_access(&self, node: Node) -> ExprKind {
        let target = self.boxed(node.child_by_field_name("condition"), node);
        if let Some(binding) = first_of_kind(node, "member_binding_expression") {
            if let Some(n) = binding.child_by_field_name("name") {
                let (name, type_args) = self.simple_name(n);
                return ExprKind::MemberAccess {
                    target,
                    name,
                    type_args,
                    conditional: true,
                };
            }
        }
        match first_of_kind(node, "element_binding_expression") {
            Some(binding) => ExprKind::ElementAccess {
                target,
                args: self.arguments(binding),
            },
            None => ExprKind::Opaque,
        }
    }

    fn invocation(&self, node: Node) -> Expr {
        let span = self.span(node);
        let callee = node.child_by_field_name("function");
        let args_node = node.child_by_field_name("arguments");
        let args = args_node.map(|a| self.arguments(a)).unwrap_or_default();
        if let (Some(callee), [arg]) = (callee, args.as_slice()) {
            if callee.kind() == "identifier" && self.text(callee) == "nameof" {
                return Expr {
                    kind: ExprKind::NameOf(Box::new(arg.expr.clone())),
                    span,
                };
            }
        }
        Expr {
            kind: ExprKind::Invocation {
                callee: self.boxed(callee, node),
                args,
                args_span: args_node.map_or(Span::empty(span.end), |a| self.span(a)),
            },
            span,
        }
    }

    /// `new T[n] { ... }` keeps `T` when sizes are given, otherwise the
    /// whole array type.
    fn array_creation(&self, node: Node) -> ExprKind {
        let initializer = first_of_kind(node, "initializer_expression").map(|i| self.elements(i));
        let Some(array) = node.child_by_field_name("type") else {
            return ExprKind::ArrayCreation {
                ty: None,
                sizes: Vec::new(),
                initializer,
            };
        };
        let sizes: Vec<Expr> = array
            .child_by_field_name("rank")
            .map(|rank| named(rank).into_iter().map(|e| self.expr(e)).collect())
            .unwrap_or_default();
        let ty = if sizes.is_empty() {
            self.type_ref(array)
        } else {
            self.field_type(array, "type")
        };
        ExprKind::ArrayCreation {
            ty: Some(ty),
            sizes,
            initializer,
        }
    }

    fn range(&self, node: Node) -> ExprKind {
        let parts = children(node);
        let dots = parts.iter().position(|c| !c.is_named() && c.kind() == "..");
        let before = dots.and_then(|i| parts[..i].iter().rev().find(|c| c.is_named()).copied());
        let after = dots.and_then(|i| parts[i + 1..].iter().find(|c| c.is_named()).copied());
        let op = "..".to_string();
        match (before, after) {
            (Some(lhs), Some(rhs)) => ExprKind::Binary {
                op,
                lhs: Box::new(self.expr(lhs)),
                rhs: Box::new(self.expr(rhs)),
            },
            (Some(lhs), None) => ExprKind::Postfix {
                op,
                operand: Box::new(self.expr(lhs)),
            },
            (None, Some(rhs)) => ExprKind::Unary {
                op,
                operand: Box::new(self.expr(rhs)),
            },
            (None, None) => ExprKind::Unary {
                op,
                operand: Box::new(Expr::opaque(Span::empty(self.span(node).end))),
            },
        }
    }

    /// Elements of `{ a, b = 1, { c, d } }`.
    pub(super) fn elements(&self, node: Node) -> Vec<Expr> {
        named(node)
            .into_iter()
            .filter(|e| !e.is_error())
            .map(|e| self.expr(e))
            .collect()
    }

    /// `new { A = 1, b }` with named members as assignments.
    fn anonymous_members(&self, node: Node) -> Vec<Expr> {
        let parts = children(node);
        let mut out = Vec::new();
        let mut i = 0;
        while i < parts.len() {
            let part = parts[i];
            let assigns = parts.get(i + 1).is_some_and(|n| !n.is_named() && n.kind() == "=");
            if part.kind() == "identifier" && assigns {
                if let Some(value) = parts.get(i + 2) {
                    let name = self.ident(part);
                    out.push(Expr {
                        kind: ExprKind::Assignment {
                            op: "=".to_string(),
                            target: Box::new(Expr {
                                span: name.span,
                                kind: ExprKind::Name {
                                    name,
                                    type_args: Vec::new(),
                                },
                            }),
                            value: Box::new(self.expr(*value)),
                        },
                        span: self.span(part).cover(self.span(*value)),
                    });
                }
                i += 3;
                continue;
            }
            if part.is_named() && !part.is_error() {
                out.push(self.expr(part));
            }
            i += 1;
        }
        out
    }

    /// Arguments of an argument list, bracketed list or tuple.
    pub(super) fn arguments(&self, list: Node) -> Vec<Argument> {
        named_of_kind(list, "argument")
            .into_iter()
            .map(|arg| self.argument(arg))
            .collect()
    }

    fn argument(&self, node: Node) -> Argument {
        let ref_kind = if token(node, "ref").is_some() {
            RefKind::Ref
        } else if token(node, "out").is_some() {
            RefKind::Out
        } else if token(node, "in").is_some() {
            RefKind::In
        } else {
            RefKind::None
        };
        let name_node = node.child_by_field_name("name");
        let value = named(node).into_iter().filter(|c| Some(*c) != name_node).last();
        Argument {
            name: name_node.map(|n| self.ident(n)),
            ref_kind,
            expr: match value {
                Some(v) => self.expr(v),
                None => Expr::opaque(Span::empty(self.span(node).end)),
            },
            span: self.span(node),
        }
    }

    fn lambda(&self, node: Node) -> Lambda {
        let span = self.span(node);
        let params_node = node.child_by_field_name("parameters");
        let parenthesized = params_node.is_some_and(|p| p.kind() == "parameter_list");
        let params = match params_node {
            Some(list) if parenthesized => named_of_kind(list, "parameter")
                .into_iter()
                .map(|p| LambdaParam {
                    ty: p.child_by_field_name("type").map(|t| self.type_ref(t)),
                    name: self.field_ident(p, "name"),
                    span: self.span(p),
                })
                .collect(),
            Some(single) => {
                let name = self.ident(single);
                vec![LambdaParam {
                    ty: None,
                    span: name.span,
                    name,
                }]
            }
            None => Vec::new(),
        };
        let body = match node.child_by_field_name("body") {
            Some(b) if b.kind() == "block" => LambdaBody::Block(self.block(b)),
            b => LambdaBody::Expr(self.boxed(b, node)),
        };
        Lambda {
            modifiers: self.modifiers(node),
            params,
            parenthesized,
            params_span: params_node.map_or(Span::empty(span.start), |p| self.span(p)),
            arrow_span: token(node, "=>").map_or(Span::empty(span.end), |a| self.span(a)),
            body,
            span,
        }
    }

    // -- patterns -----------------------------------------------------------

    fn pattern(&self, node: Node) -> Pattern {
        match node.kind() {
            "declaration_pattern" => Pattern::Type {
                ty: self.field_type(node, "type"),
                designation: node.child_by_field_name("name").map(|n| self.ident(n)),
            },
            "type_pattern" => Pattern::Type {
                ty: self.field_type(node, "type"),
                designation: None,
            },
            "negated_pattern" => match named(node).into_iter().next() {
                Some(inner) => Pattern::Not(Box::new(self.pattern(inner))),
                None => Pattern::Opaque(self.span(node)),
            },
            "constant_pattern" => match named(node).into_iter().next() {
                Some(inner) => self.constant_pattern(inner),
                None => Pattern::Opaque(self.span(node)),
            },
            // the grammar inlines constant patterns in some positions
            "identifier" | "generic_name" | "qualified_name" | "member_access_expression"
            | "null_literal" | "boolean_literal" | "integer_literal" | "real_literal"
            | "string_literal" | "character_literal" | "default_expression" => {
                self.constant_pattern(node)
            }
            _ => Pattern::Opaque(self.span(node)),
        }
    }

    /// A bare dotted name may be a constant; it is still reported as a type
    /// pattern.
    fn constant_pattern(&self, node: Node) -> Pattern {
        match self.expr_as_type(node) {
            Some(ty) => Pattern::Type {
                ty,
                designation: None,
            },
            None => Pattern::Constant(self.expr(node)),
        }
    }

    /// A name-shaped expression read as a type.
    fn expr_as_type(&self, node: Node) -> Option<TypeRef> {
        match node.kind() {
            "identifier" | "generic_name" | "qualified_name" | "alias_qualified_name" => {
                Some(self.type_ref(node))
            }
            "member_access_expression" => {
                let target = node.child_by_field_name("expression")?;
                let name = node.child_by_field_name("name")?;
                let mut segments = match self.expr_as_type(target)?.kind {
                    TypeRefKind::Named { segments, global: false } => segments,
                    _ => return None,
                };
                segments.extend(self.name_segments(name));
                Some(TypeRef {
                    kind: TypeRefKind::Named {
                        global: false,
                        segments,
                    },
                    span: self.span(node),
                })
            }
            _ => None,
        }
    }
}
