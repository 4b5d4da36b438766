//! Types, names and parameter lists.

use super::{children, named, named_after, named_of_kind, Lowerer};
use crate::syntax::ast::*;
use tree_sitter::Node;

impl<'a> Lowerer<'a> {
    /// Placeholder for a type the tree does not have.
    pub(super) fn missing_type(&self, at: Node) -> TypeRef {
        TypeRef {
            kind: TypeRefKind::Named {
                global: false,
                segments: Vec::new(),
            },
            span: crate::common::Span::empty(self.span(at).start),
        }
    }

    pub(super) fn field_type(&self, node: Node, field: &str) -> TypeRef {
        match node.child_by_field_name(field) {
            Some(ty) => self.type_ref(ty),
            None => self.missing_type(node),
        }
    }

    pub(super) fn type_ref(&self, node: Node) -> TypeRef {
        let span = self.span(node);
        let kind = match node.kind() {
            "predefined_type" => TypeRefKind::Predefined(self.text(node).to_string()),
            "nullable_type" => TypeRefKind::Nullable(Box::new(self.field_type(node, "type"))),
            "array_type" => {
                let rank = node
                    .child_by_field_name("rank")
                    .map_or(1, |r| 1 + children(r).iter().filter(|c| c.kind() == ",").count());
                TypeRefKind::Array {
                    element: Box::new(self.field_type(node, "type")),
                    rank,
                }
            }
            "tuple_type" => TypeRefKind::Tuple(
                named_of_kind(node, "tuple_element")
                    .into_iter()
                    .map(|e| TupleElement {
                        ty: self.field_type(e, "type"),
                        name: e.child_by_field_name("name").map(|n| self.ident(n)),
                    })
                    .collect(),
            ),
            // pointer, ref and scoped types are treated as their element type
            "pointer_type" | "ref_type" | "scoped_type" => {
                return self.field_type(node, "type");
            }
            "alias_qualified_name" => {
                let global = node
                    .child_by_field_name("alias")
                    .is_some_and(|a| self.text(a) == "global");
                TypeRefKind::Named {
                    global,
                    segments: self.name_segments(node),
                }
            }
            "identifier" | "generic_name" | "qualified_name" | "implicit_type" => {
                TypeRefKind::Named {
                    global: self.is_global(node),
                    segments: self.name_segments(node),
                }
            }
            _ => return self.missing_type(node),
        };
        TypeRef { kind, span }
    }

    fn is_global(&self, node: Node) -> bool {
        let mut current = node;
        while current.kind() == "qualified_name" {
            match current.child_by_field_name("qualifier") {
                Some(q) => current = q,
                None => return false,
            }
        }
        current.kind() == "alias_qualified_name"
            && current
                .child_by_field_name("alias")
                .is_some_and(|a| self.text(a) == "global")
    }

    /// Dotted name segments, left to right. `global::` is dropped and any
    /// other `alias::` counts as a segment.
    pub(super) fn name_segments(&self, node: Node) -> Vec<NameSegment> {
        match node.kind() {
            "qualified_name" => {
                let mut segments = node
                    .child_by_field_name("qualifier")
                    .map(|q| self.name_segments(q))
                    .unwrap_or_default();
                if let Some(name) = node.child_by_field_name("name") {
                    segments.extend(self.name_segments(name));
                }
                segments
            }
            "alias_qualified_name" => {
                let mut segments = Vec::new();
                if let Some(alias) = node.child_by_field_name("alias") {
                    if self.text(alias) != "global" {
                        segments.extend(self.name_segments(alias));
                    }
                }
                if let Some(name) = node.child_by_field_name("name") {
                    segments.extend(self.name_segments(name));
                }
                segments
            }
            "generic_name" => {
                let Some(id) = named(node).into_iter().find(|c| c.kind() == "identifier") else {
                    return Vec::new();
                };
                vec![NameSegment {
                    name: self.ident(id),
                    type_args: self.type_args(node),
                    span: self.span(node),
                }]
            }
            "identifier" | "implicit_type" => vec![NameSegment {
                name: self.ident(node),
                type_args: Vec::new(),
                span: self.span(node),
            }],
            _ => Vec::new(),
        }
    }

    /// `<T1, T2>` of a generic name; `<,>` yields an empty list.
    pub(super) fn type_args(&self, generic: Node) -> Vec<TypeRef> {
        named(generic)
            .into_iter()
            .find(|c| c.kind() == "type_argument_list")
            .map(|list| named(list).into_iter().map(|t| self.type_ref(t)).collect())
            .unwrap_or_default()
    }

    /// Name and type arguments of an `identifier` or `generic_name`.
    pub(super) fn simple_name(&self, node: Node) -> (Ident, Vec<TypeRef>) {
        match self.name_segments(node).pop() {
            Some(segment) if node.kind() == "generic_name" => (segment.name, segment.type_args),
            _ => (self.ident(node), Vec::new()),
        }
    }

    /// `( params )` or `[ params ]`. A `params T[] name` array is spread
    /// over the list's own children rather than wrapped in a node.
    pub(super) fn parameter_list(&self, list: Node) -> ParameterList {
        let mut params = Vec::new();
        let mut params_array: Option<(usize, Option<TypeRef>)> = None;
        for child in children(list) {
            match child.kind() {
                "parameter" => params.push(self.parameter(child)),
                "params" if !child.is_named() => {
                    params_array = Some((self.span(child).start, None));
                }
                "identifier" => {
                    if let Some((start, ty)) = params_array.take() {
                        let ty = ty.unwrap_or_else(|| self.missing_type(child));
                        params.push(Parameter {
                            attributes: Vec::new(),
                            ref_kind: RefKind::None,
                            is_params: true,
                            is_this: false,
                            ty,
                            name: self.ident(child),
                            default: None,
                            span: crate::common::Span::new(start, self.span(child).end),
                        });
                    }
                }
                "array_type" | "nullable_type" => {
                    if let Some((_, ty)) = params_array.as_mut() {
                        *ty = Some(self.type_ref(child));
                    }
                }
                _ => {}
            }
        }
        ParameterList {
            params,
            span: self.span(list),
        }
    }

    fn parameter(&self, node: Node) -> Parameter {
        let mut ref_kind = RefKind::None;
        let mut is_this = false;
        for modifier in named_of_kind(node, "modifier") {
            match self.text(modifier) {
                "ref" => ref_kind = RefKind::Ref,
                "readonly" if ref_kind == RefKind::Ref => ref_kind = RefKind::RefReadonly,
                "out" => ref_kind = RefKind::Out,
                "in" => ref_kind = RefKind::In,
                "this" => is_this = true,
                _ => {}
            }
        }
        Parameter {
            attributes: self.attribute_lists(node),
            ref_kind,
            is_params: false,
            is_this,
            ty: self.field_type(node, "type"),
            name: self.field_ident(node, "name"),
            default: named_after(node, "=").map(|d| self.expr(d)),
            span: self.span(node),
        }
    }
}
