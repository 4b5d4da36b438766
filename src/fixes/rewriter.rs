//! Applies text edits and re-validates the result.

use super::{FixEdit, TextEdit};
use crate::common::Span;
use crate::error::{ErrorCode, PatternLintError, Result};
use crate::syntax::SourceFile;

/// Applies non-overlapping edits to `text`. Edits may come in any order;
/// several insertions at the same offset keep their relative order.
pub fn apply_edits(text: &str, edits: &[TextEdit], diagnostic_id: &str) -> Result<String> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.span.start, e.span.end));

    for pair in ordered.windows(2) {
        if pair[0].span.end > pair[1].span.start {
            return Err(PatternLintError::fix(
                ErrorCode::FIX_MALFORMED,
                diagnostic_id,
                format!("overlapping edits at {}..{}", pair[1].span.start, pair[1].span.end),
            ));
        }
    }

    let mut out = String::with_capacity(text.len() + 64);
    let mut cursor = 0;
    for edit in ordered {
        if edit.span.end > text.len()
            || !text.is_char_boundary(edit.span.start)
            || !text.is_char_boundary(edit.span.end)
        {
            return Err(PatternLintError::fix(
                ErrorCode::FIX_MALFORMED,
                diagnostic_id,
                format!("edit {}..{} is outside the file", edit.span.start, edit.span.end),
            ));
        }
        out.push_str(&text[cursor..edit.span.start]);
        out.push_str(&edit.new_text);
        cursor = edit.span.end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

/// Applies `fix` to `file` and re-parses. Edits outside the fix's
/// declaration, or any parse error that was not already present, reject
/// the fix.
pub fn apply_fix(file: &SourceFile, fix: &FixEdit) -> Result<SourceFile> {
    if fix.edits.is_empty() {
        return Err(PatternLintError::fix(
            ErrorCode::FIX_NOT_AVAILABLE,
            fix.diagnostic_id,
            "fix has no edits",
        ));
    }
    if let Some(stray) = fix
        .edits
        .iter()
        .find(|e| !fix.scope.contains(e.span))
    {
        return Err(PatternLintError::fix(
            ErrorCode::FIX_MALFORMED,
            fix.diagnostic_id,
            format!(
                "edit {}..{} leaves the declaration {}..{}",
                stray.span.start, stray.span.end, fix.scope.start, fix.scope.end
            ),
        ));
    }

    let text = apply_edits(&file.text, &fix.edits, fix.diagnostic_id)?;
    let fixed = SourceFile::parse(file.path.clone(), text);
    if fixed.errors.len() > file.errors.len() {
        let first = fixed.errors.first().map_or_else(String::new, |e| e.message.clone());
        tracing::debug!(
            diagnostic = fix.diagnostic_id,
            strategy = %fix.strategy,
            error = %first,
            "rejected fix producing malformed syntax"
        );
        return Err(PatternLintError::fix(
            ErrorCode::FIX_MALFORMED,
            fix.diagnostic_id,
            format!("rewritten source does not parse: {first}"),
        ));
    }
    Ok(fixed)
}

/// Where `span` of the original text ends up after `edits`. Text inserted
/// at either end of the span counts as part of it.
pub fn map_span(span: Span, edits: &[TextEdit]) -> Span {
    let mut edits: Vec<&TextEdit> = edits.iter().collect();
    edits.sort_by_key(|e| (e.span.start, e.span.end));
    let shift = |offset: usize, inclusive: bool| -> usize {
        let mut delta: isize = 0;
        for edit in &edits {
            let before = if inclusive {
                edit.span.end <= offset && !(edit.span.is_empty() && edit.span.start == offset)
            } else {
                edit.span.end <= offset
            };
            if before {
                delta += edit.new_text.len() as isize - edit.span.len() as isize;
            } else if edit.span.start < offset {
                // the offset sits inside a replaced range; clamp to its start
                return edit.span.start.saturating_add_signed(delta);
            }
        }
        offset.saturating_add_signed(delta)
    };
    Span::new(shift(span.start, true), shift(span.end, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::FixStrategy;
    use pretty_assertions::assert_eq;

    #[test]
    fn applies_edits_in_offset_order() {
        let text = "public class A { }";
        let edits = vec![
            TextEdit::insert(14, "B"),
            TextEdit::insert(7, "sealed "),
            TextEdit::replace(Span::new(0, 6), "internal"),
        ];
        assert_eq!(
            apply_edits(text, &edits, "TTRESG009").unwrap(),
            "internal sealed class AB { }"
        );
    }

    #[test]
    fn rejects_overlapping_edits() {
        let edits = vec![
            TextEdit::replace(Span::new(0, 5), "x"),
            TextEdit::replace(Span::new(3, 8), "y"),
        ];
        let err = apply_edits("0123456789", &edits, "TTRESG001").unwrap_err();
        assert_eq!(err.code(), ErrorCode::FIX_MALFORMED);
    }

    #[test]
    fn malformed_result_is_rejected() {
        let file = SourceFile::parse("A.cs", "public partial class A { }");
        let fix = FixEdit::new(
            file.path.clone(),
            "TTRESG004",
            FixStrategy::ModifierEdit,
            "break it",
            Span::new(0, file.text.len()),
        )
        .with_edits([TextEdit::delete(Span::new(25, 26))]);
        let err = apply_fix(&file, &fix).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FIX_MALFORMED);
    }

    #[test]
    fn edits_outside_the_declaration_are_rejected() {
        let file = SourceFile::parse("A.cs", "class A { }\nclass B { }");
        let fix = FixEdit::new(
            file.path.clone(),
            "TTRESG004",
            FixStrategy::ModifierEdit,
            "Make type partial",
            Span::new(0, 11),
        )
        .with_edits([TextEdit::insert(12, "partial ")]);
        assert!(apply_fix(&file, &fix).is_err());
    }

    #[test]
    fn span_mapping_includes_insertions_at_the_edges() {
        let edits = vec![
            TextEdit::insert(0, "xx"),
            TextEdit::insert(10, "static "),
            TextEdit::replace(Span::new(12, 14), "a"),
        ];
        assert_eq!(map_span(Span::new(10, 20), &edits), Span::new(12, 28));
        assert_eq!(map_span(Span::new(2, 4), &edits), Span::new(4, 6));
    }
}
