//! Accessor edits that make a property read-only.

use super::modifiers::set_accessibility;
use super::TextEdit;
use crate::common::Span;
use crate::shape::{member_accessibility, mutable_accessor, Accessibility};
use crate::syntax::ast::{AccessorBody, AccessorKind, ModifierKind, PropertyDecl};

/// `{ get; set; }` loses its auto `set`; any other writable accessor
/// becomes `private`. `None` when neither keeps the property well-formed.
pub fn make_read_only(text: &str, property: &PropertyDecl) -> Option<Vec<TextEdit>> {
    if property.explicit_interface.is_some() {
        return None;
    }
    let accessor = mutable_accessor(property)?;
    let list = property.accessor_list.as_ref()?;
    let has_getter = property.accessor(AccessorKind::Get).is_some();
    if !has_getter || list.accessors.len() < 2 {
        return None;
    }

    let auto_set = accessor.kind == AccessorKind::Set
        && matches!(accessor.body, AccessorBody::None)
        && accessor.attributes.is_empty();
    if auto_set {
        // take the separating whitespace with it: `{ get; set; }` -> `{ get; }`
        let before = &text[..accessor.span.start];
        let leading = before.len() - before.trim_end_matches([' ', '\t']).len();
        return Some(vec![TextEdit::delete(Span::new(
            accessor.span.start - leading,
            accessor.span.end,
        ))]);
    }

    // an accessor modifier must be narrower than the property itself
    if member_accessibility(&property.modifiers) == Accessibility::Private {
        return None;
    }
    Some(set_accessibility(
        text,
        &accessor.modifiers,
        accessor.keyword_span.start,
        ModifierKind::Private,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::apply_edits;
    use crate::syntax::ast::Member;
    use crate::syntax::SourceFile;
    use pretty_assertions::assert_eq;

    fn fixed(src: &str) -> Option<String> {
        let file = SourceFile::parse("A.cs", src);
        let Member::Property(p) = &file.unit.types[0].members[0] else {
            panic!("expected a property");
        };
        make_read_only(&file.text, p).map(|edits| apply_edits(&file.text, &edits, "TTRESG002").unwrap())
    }

    #[test]
    fn auto_setter_is_removed() {
        assert_eq!(
            fixed("class A { public int X { get; set; } }").as_deref(),
            Some("class A { public int X { get; } }")
        );
    }

    #[test]
    fn init_and_bodied_setters_become_private() {
        assert_eq!(
            fixed("class A { public int X { get; init; } }").as_deref(),
            Some("class A { public int X { get; private init; } }")
        );
        assert_eq!(
            fixed("class A { public int X { get => _x; protected set => _x = value; } }").as_deref(),
            Some("class A { public int X { get => _x; private set => _x = value; } }")
        );
    }

    #[test]
    fn setter_only_and_private_properties_are_left_alone() {
        assert_eq!(fixed("class A { public int X { set { } } }"), None);
        assert_eq!(fixed("class A { private int X { get; init; } }"), None);
    }
}
