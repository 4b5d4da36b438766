//! Member stubs with a throwing body.

use super::TextEdit;
use crate::common::text::{detect_newline, indent_unit, indentation_at};
use crate::common::Span;
use crate::syntax::ast::TypeDecl;
use crate::syntax::SourceFile;

pub const PLACEHOLDER_BODY: &str = "throw new System.NotImplementedException();";

/// `private static T CreateInvalidItem(K key)` for an enumeration `T` with
/// key type `K`.
pub fn create_invalid_item_signature(type_name: &str, key_type: &str) -> String {
    format!("private static {type_name} CreateInvalidItem({key_type} key)")
}

/// Appends a method with `signature` as the last member of `decl`.
/// Existing members are never touched.
pub fn append_method(file: &SourceFile, decl: &TypeDecl, signature: &str) -> Option<TextEdit> {
    let close = decl.close_brace?;
    let text = &file.text;
    let before = &text[..close.start];
    let insert_at = before.trim_end().len();
    if insert_at < decl.span.start {
        return None;
    }

    let nl = detect_newline(text);
    let outer = indentation_at(text, decl.header_start());
    let indent = format!("{outer}{}", indent_unit(text));
    let unit = indent_unit(text);
    let separator = if decl.members.is_empty() {
        nl.to_string()
    } else {
        format!("{nl}{nl}")
    };
    let member = format!(
        "{separator}{indent}{signature}{nl}{indent}{{{nl}{indent}{unit}{PLACEHOLDER_BODY}{nl}{indent}}}{nl}{outer}"
    );
    Some(TextEdit::replace(Span::new(insert_at, close.start), member))
}
