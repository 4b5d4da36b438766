//! Modifier edits in canonical C# modifier order.

use super::TextEdit;
use crate::common::Span;
use crate::syntax::ast::{Modifier, ModifierKind};

/// Position of a modifier in the conventional order. `partial` always
/// comes last, right before the declaration keyword or return type.
fn rank(kind: ModifierKind) -> u8 {
    use ModifierKind::*;
    match kind {
        Public | Private | Protected | Internal | File => 0,
        Static => 1,
        Extern => 2,
        New => 3,
        Virtual => 4,
        Abstract => 5,
        Sealed => 6,
        Override => 7,
        Readonly => 8,
        Ref => 9,
        Unsafe => 10,
        Required => 11,
        Volatile => 12,
        Const => 13,
        Async => 14,
        Partial => 15,
    }
}

/// Inserts `kind` among `modifiers`. `anchor` is the first token after the
/// modifier list. `None` when the modifier is already there.
pub fn insert_modifier(modifiers: &[Modifier], anchor: usize, kind: ModifierKind) -> Option<TextEdit> {
    if modifiers.iter().any(|m| m.kind == kind) {
        return None;
    }
    let at = modifiers
        .iter()
        .find(|m| rank(m.kind) > rank(kind))
        .map_or(anchor, |m| m.span.start);
    Some(TextEdit::insert(at, format!("{} ", kind.as_str())))
}

/// Removes a token together with the whitespace that follows it.
pub fn remove_token(text: &str, span: Span) -> TextEdit {
    let rest = &text[span.end.min(text.len())..];
    let trailing = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    TextEdit::delete(Span::new(span.start, span.end + trailing))
}

/// Replaces the accessibility modifiers (e.g. `protected internal`) with
/// `kind`, or inserts it when none is written.
pub fn set_accessibility(text: &str, modifiers: &[Modifier], anchor: usize, kind: ModifierKind) -> Vec<TextEdit> {
    let existing: Vec<&Modifier> = modifiers.iter().filter(|m| m.kind.is_accessibility()).collect();
    match existing.split_first() {
        None => insert_modifier(modifiers, anchor, kind).into_iter().collect(),
        Some((first, _)) if existing.len() == 1 && first.kind == kind => Vec::new(),
        Some((first, rest)) => std::iter::once(TextEdit::replace(first.span, kind.as_str()))
            .chain(rest.iter().map(|m| remove_token(text, m.span)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::apply_edits;
    use crate::syntax::ast::Member;
    use crate::syntax::SourceFile;
    use pretty_assertions::assert_eq;

    fn first_field(src: &str) -> (SourceFile, Vec<Modifier>, usize) {
        let file = SourceFile::parse("A.cs", src);
        let (modifiers, anchor) = match &file.unit.types[0].members[0] {
            Member::Field(f) => (f.modifiers.clone(), f.ty.span.start),
            other => panic!("expected a field, got {other:?}"),
        };
        (file, modifiers, anchor)
    }

    #[test]
    fn readonly_goes_after_static() {
        let (file, modifiers, anchor) = first_field("class A { public static A Item1 = default; }");
        let edit = insert_modifier(&modifiers, anchor, ModifierKind::Readonly).unwrap();
        assert_eq!(
            apply_edits(&file.text, &[edit], "TTRESG001").unwrap(),
            "class A { public static readonly A Item1 = default; }"
        );
    }

    #[test]
    fn partial_goes_last_on_types() {
        let file = SourceFile::parse("A.cs", "public sealed class A { }");
        let decl = &file.unit.types[0];
        let edit = insert_modifier(&decl.modifiers, decl.keyword_span.start, ModifierKind::Partial).unwrap();
        assert_eq!(
            apply_edits(&file.text, &[edit], "TTRESG004").unwrap(),
            "public sealed partial class A { }"
        );
        let sealed = insert_modifier(&decl.modifiers, decl.keyword_span.start, ModifierKind::Sealed);
        assert!(sealed.is_none());
    }

    #[test]
    fn readonly_precedes_partial_on_structs() {
        let file = SourceFile::parse("A.cs", "public partial struct A { }");
        let decl = &file.unit.types[0];
        let edit = insert_modifier(&decl.modifiers, decl.keyword_span.start, ModifierKind::Readonly).unwrap();
        assert_eq!(
            apply_edits(&file.text, &[edit], "TTRESG008").unwrap(),
            "public readonly partial struct A { }"
        );
    }

    #[test]
    fn accessibility_is_replaced_as_a_whole() {
        let (file, modifiers, anchor) = first_field("class A { protected internal static A X = default; }");
        let edits = set_accessibility(&file.text, &modifiers, anchor, ModifierKind::Public);
        assert_eq!(
            apply_edits(&file.text, &edits, "TTRESG006").unwrap(),
            "class A { public static A X = default; }"
        );

        let (file, modifiers, anchor) = first_field("class A { static A X = default; }");
        let edits = set_accessibility(&file.text, &modifiers, anchor, ModifierKind::Public);
        assert_eq!(
            apply_edits(&file.text, &edits, "TTRESG006").unwrap(),
            "class A { public static A X = default; }"
        );
    }
}
