//! Attribute insertion and named-argument rewrites.

use super::TextEdit;
use crate::common::text::{detect_newline, indentation_at, is_line_start};
use crate::patterns::markers::{KEY_MEMBER_COMPARER, KEY_MEMBER_EQUALITY_COMPARER};
use crate::patterns::OperatorsGeneration;
use crate::syntax::ast::{Attribute, AttributeList, TypeDecl, TypeRef, TypeRefKind};
use crate::syntax::SourceFile;

const BUILT_IN_ACCESSORS: &str = "ComparerAccessors";
const EQUALITY_OPERATORS: &str = "EqualityComparisonOperators";
const COMPARISON_OPERATORS: &str = "ComparisonOperators";

/// The list and attribute at `attribute_span` in `decl`.
fn find_attribute(decl: &TypeDecl, attribute_span: crate::common::Span) -> Option<(&AttributeList, &Attribute)> {
    decl.attributes
        .iter()
        .flat_map(|list| list.attributes.iter().map(move |a| (list, a)))
        .find(|(_, a)| a.span == attribute_span)
}

/// Accessors shipped with the library (`ComparerAccessors.X`) provide
/// both the comparer and the equality comparer.
fn is_built_in_accessor(accessor: &TypeRef) -> bool {
    match &accessor.kind {
        TypeRefKind::Named { segments, .. } => {
            segments.len() >= 2 && segments[segments.len() - 2].name.text == BUILT_IN_ACCESSORS
        }
        _ => false,
    }
}

/// Adds the missing comparer counterpart next to the one present, with the
/// same accessor and key type.
pub fn insert_comparer_counterpart(file: &SourceFile, decl: &TypeDecl, attribute_span: crate::common::Span) -> Option<TextEdit> {
    let (list, attr) = find_attribute(decl, attribute_span)?;
    let [accessor, key] = attr.type_args.as_slice() else {
        return None;
    };
    if !is_built_in_accessor(accessor) {
        return None;
    }

    let written = file.span_text(attr.name_span);
    let counterpart = match attr.simple_name() {
        KEY_MEMBER_COMPARER => written.replacen(KEY_MEMBER_COMPARER, KEY_MEMBER_EQUALITY_COMPARER, 1),
        KEY_MEMBER_EQUALITY_COMPARER => written.replacen(KEY_MEMBER_EQUALITY_COMPARER, KEY_MEMBER_COMPARER, 1),
        _ => return None,
    };
    let inserted = format!(
        "[{counterpart}<{}, {}>]",
        file.span_text(accessor.span),
        file.span_text(key.span)
    );

    let text = &file.text;
    let separator = if is_line_start(text, list.span.start) {
        format!("{}{}", detect_newline(text), indentation_at(text, list.span.start))
    } else {
        " ".to_string()
    };
    Some(TextEdit::insert(list.span.end, format!("{separator}{inserted}")))
}

/// Raises `EqualityComparisonOperators` to `level`, rewriting the argument
/// when present and adding it otherwise.
pub fn raise_equality_operators(
    file: &SourceFile,
    decl: &TypeDecl,
    attribute_span: crate::common::Span,
    level: OperatorsGeneration,
) -> Option<TextEdit> {
    let (_, attr) = find_attribute(decl, attribute_span)?;

    if let Some(arg) = attr.named_arg(EQUALITY_OPERATORS) {
        let value = file.span_text(arg.value.span);
        let replaced = match value.rfind('.') {
            Some(dot) => format!("{}{}", &value[..=dot], level.as_str()),
            None => level.as_str().to_string(),
        };
        return Some(TextEdit::replace(arg.value.span, replaced));
    }

    // qualify the new value the way the comparison setting is written
    let prefix = attr
        .named_arg(COMPARISON_OPERATORS)
        .map(|arg| file.span_text(arg.value.span))
        .and_then(|value| value.rfind('.').map(|dot| value[..=dot].to_string()))
        .unwrap_or_else(|| "OperatorsGeneration.".to_string());
    let argument = format!("{EQUALITY_OPERATORS} = {prefix}{}", level.as_str());

    match attr.args_span {
        Some(args) if attr.args.is_empty() => Some(TextEdit::insert(args.end - 1, argument)),
        Some(args) => Some(TextEdit::insert(args.end - 1, format!(", {argument}"))),
        None => Some(TextEdit::insert(attr.span.end, format!("({argument})"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::apply_edits;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn apply(file: &SourceFile, edit: TextEdit) -> String {
        apply_edits(&file.text, &[edit], "test").unwrap()
    }

    #[test]
    fn equality_comparer_is_added_on_its_own_line() {
        let file = SourceFile::parse(
            "A.cs",
            indoc! {"
                namespace App
                {
                    [SmartEnum<string>]
                    [KeyMemberComparer<ComparerAccessors.StringOrdinal, string>]
                    public partial class TestEnum { }
                }
            "},
        );
        let decl = &file.unit.types[0];
        let span = decl.attributes[1].attributes[0].span;
        let edit = insert_comparer_counterpart(&file, decl, span).unwrap();
        assert_eq!(
            apply(&file, edit),
            indoc! {"
                namespace App
                {
                    [SmartEnum<string>]
                    [KeyMemberComparer<ComparerAccessors.StringOrdinal, string>]
                    [KeyMemberEqualityComparer<ComparerAccessors.StringOrdinal, string>]
                    public partial class TestEnum { }
                }
            "}
        );
    }

    #[test]
    fn custom_accessors_get_no_counterpart() {
        let file = SourceFile::parse(
            "A.cs",
            "[KeyMemberEqualityComparer<MyAccessor, string>] partial class A { }",
        );
        let decl = &file.unit.types[0];
        let span = decl.attributes[0].attributes[0].span;
        assert!(insert_comparer_counterpart(&file, decl, span).is_none());
    }

    #[test]
    fn equality_level_is_rewritten_in_place() {
        let file = SourceFile::parse(
            "A.cs",
            "[SmartEnum<int>(ComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads, EqualityComparisonOperators = OperatorsGeneration.Default)] partial class TestEnum { }",
        );
        let decl = &file.unit.types[0];
        let span = decl.attributes[0].attributes[0].span;
        let edit = raise_equality_operators(&file, decl, span, OperatorsGeneration::DefaultWithKeyTypeOverloads).unwrap();
        assert_eq!(
            apply(&file, edit),
            "[SmartEnum<int>(ComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads, EqualityComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads)] partial class TestEnum { }"
        );
    }

    #[test]
    fn missing_equality_argument_is_appended() {
        let file = SourceFile::parse(
            "A.cs",
            "[ValueObject<int>(ComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads)] partial class Amount { }",
        );
        let decl = &file.unit.types[0];
        let span = decl.attributes[0].attributes[0].span;
        let edit = raise_equality_operators(&file, decl, span, OperatorsGeneration::DefaultWithKeyTypeOverloads).unwrap();
        assert_eq!(
            apply(&file, edit),
            "[ValueObject<int>(ComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads, EqualityComparisonOperators = OperatorsGeneration.DefaultWithKeyTypeOverloads)] partial class Amount { }"
        );
    }
}
