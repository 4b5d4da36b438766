//! Marker (attribute) vocabulary and named-argument decoding.
//!
//! Marker names match with or without the `Attribute` suffix and with or
//! without the library namespace qualifier.

use crate::syntax::ast::{Attribute, AttributeArg, AttributeList, Expr, ExprKind, LiteralKind};
use crate::common::Span;

pub const SMART_ENUM: &str = "SmartEnum";
pub const ENUM_GENERATION: &str = "EnumGeneration";
pub const VALUE_OBJECT: &str = "ValueObject";
pub const COMPLEX_VALUE_OBJECT: &str = "ComplexValueObject";
pub const UNION: &str = "Union";
pub const OBJECT_FACTORY: &str = "ObjectFactory";
pub const VALIDATION_ERROR: &str = "ValidationError";
pub const KEY_MEMBER_COMPARER: &str = "KeyMemberComparer";
pub const KEY_MEMBER_EQUALITY_COMPARER: &str = "KeyMemberEqualityComparer";
pub const IGNORE_MEMBER: &str = "IgnoreMember";
pub const USE_DELEGATE_FROM_CONSTRUCTOR: &str = "UseDelegateFromConstructor";

pub const ENUM_INTERFACE: &str = "IEnum";
pub const VALIDATABLE_ENUM_INTERFACE: &str = "IValidatableEnum";
pub const VALIDATION_ERROR_CONTRACT: &str = "IValidationError";

/// Whether `attr` is the library marker `name` (any qualifier under
/// `library_namespace` or none).
pub fn is_marker(attr: &Attribute, name: &str, library_namespace: &str) -> bool {
    if attr.simple_name() != name {
        return false;
    }
    if attr.name.len() == 1 {
        return true;
    }
    let qualifier = attr.name[..attr.name.len() - 1].join(".");
    qualifier == library_namespace
}

pub fn find_markers<'a>(
    lists: &'a [AttributeList],
    name: &'a str,
    library_namespace: &'a str,
) -> impl Iterator<Item = &'a Attribute> + 'a {
    lists
        .iter()
        .flat_map(|l| l.attributes.iter())
        .filter(move |a| is_marker(a, name, library_namespace))
}

pub fn has_marker(lists: &[AttributeList], name: &str, library_namespace: &str) -> bool {
    find_markers(lists, name, library_namespace).next().is_some()
}

/// `true`/`false` literal value of a named argument.
pub fn bool_arg(attr: &Attribute, name: &str) -> Option<bool> {
    let arg = attr.named_arg(name)?;
    match arg.value.unparenthesized().kind {
        ExprKind::Literal(LiteralKind::True) => Some(true),
        ExprKind::Literal(LiteralKind::False) => Some(false),
        _ => None,
    }
}

/// String literal value of a named argument, without quotes. Only plain
/// regular and verbatim literals are decoded.
pub fn string_arg(attr: &Attribute, name: &str, source: &str) -> Option<String> {
    let arg = attr.named_arg(name)?;
    let value = arg.value.unparenthesized();
    if !matches!(value.kind, ExprKind::Literal(LiteralKind::String)) {
        return None;
    }
    let text = value.span.text(source);
    let text = text.strip_prefix('@').unwrap_or(text);
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .map(str::to_string)
}

/// Last names of an enum-valued argument, e.g. `A.X | A.Y` → `["X", "Y"]`.
pub fn enum_member_names(expr: &Expr) -> Vec<String> {
    match &expr.unparenthesized().kind {
        ExprKind::MemberAccess { name, .. } | ExprKind::Name { name, .. } => vec![name.text.clone()],
        ExprKind::Binary { op, lhs, rhs } if op == "|" => {
            let mut names = enum_member_names(lhs);
            names.extend(enum_member_names(rhs));
            names
        }
        _ => Vec::new(),
    }
}

/// A decoded named argument with the span of its value, for rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgValue<T> {
    pub value: T,
    pub arg_span: Span,
    pub value_span: Span,
}

pub fn enum_arg<T>(
    attr: &Attribute,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<ArgValue<T>> {
    let arg: &AttributeArg = attr.named_arg(name)?;
    let names = enum_member_names(&arg.value);
    let value = parse(names.first()?)?;
    Some(ArgValue {
        value,
        arg_span: arg.span,
        value_span: arg.value.span,
    })
}
