//! C# front end: tree-sitter parsing lowered into a declaration model.

pub mod ast;
mod lower;
pub mod parser;
pub mod visit;

use crate::common::{LineIndex, SourceLocation, Span};
use std::path::{Path, PathBuf};

pub use parser::ParseError;

/// A parsed source file. Immutable: fixes produce a new `SourceFile`.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    pub unit: ast::CompilationUnit,
    /// Line directives (`#nullable`, `#pragma`, ...) in source order.
    pub directives: Vec<Span>,
    pub errors: Vec<ParseError>,
    pub line_index: LineIndex,
}

impl SourceFile {
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();
        let parser::Parsed {
            unit,
            errors,
            directives,
        } = parser::parse_compilation_unit(&text);
        tracing::trace!(
            path = %path.display(),
            types = unit.types.len(),
            errors = errors.len(),
            "parsed source file"
        );
        let line_index = LineIndex::new(&text);
        Self {
            path,
            text,
            unit,
            directives,
            errors,
            line_index,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn location(&self, span: Span) -> SourceLocation {
        self.line_index.location(span)
    }

    pub fn span_text(&self, span: Span) -> &str {
        span.text(&self.text)
    }

    /// Preprocessor directives in source order.
    pub fn directives(&self) -> impl Iterator<Item = (Span, &str)> {
        self.directives
            .iter()
            .map(|span| (*span, span.text(&self.text).trim_end()))
    }

    /// Nullable context at `offset` as set by `#nullable` directives:
    /// `Some(true)` enabled, `Some(false)` disabled, `None` for the project
    /// default.
    pub fn nullable_context_at(&self, offset: usize) -> Option<bool> {
        let mut state = None;
        for (span, text) in self.directives() {
            if span.start >= offset {
                break;
            }
            let mut words = text.trim_start_matches('#').split_whitespace();
            if words.next() != Some("nullable") {
                continue;
            }
            state = match words.next() {
                Some("enable") => Some(true),
                Some("disable") => Some(false),
                _ => None,
            };
        }
        state
    }

    /// All type declarations, outer before nested, in source order.
    pub fn all_types(&self) -> Vec<&ast::TypeDecl> {
        fn collect<'a>(decl: &'a ast::TypeDecl, out: &mut Vec<&'a ast::TypeDecl>) {
            out.push(decl);
            for nested in decl.nested_types() {
                collect(nested, out);
            }
        }
        let mut out = Vec::new();
        for decl in &self.unit.types {
            collect(decl, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn nullable_directives_are_positional() {
        let src = indoc! {"
            class A { string a; }
            #nullable enable
            class B { string b; }
            #nullable restore
            class C { string c; }
        "};
        let file = SourceFile::parse("a.cs", src);
        assert!(!file.has_errors(), "{:?}", file.errors);
        let offsets: Vec<usize> = file.all_types().iter().map(|t| t.span.start).collect();
        assert_eq!(file.nullable_context_at(offsets[0]), None);
        assert_eq!(file.nullable_context_at(offsets[1]), Some(true));
        assert_eq!(file.nullable_context_at(offsets[2]), None);
    }

    #[test]
    fn nested_types_are_listed_outer_first() {
        let file = SourceFile::parse("a.cs", "class A { class B { struct C { } } } enum E { X, Y }");
        let names: Vec<&str> = file.all_types().iter().map(|t| t.name.text.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "E"]);
    }

    #[test]
    fn unterminated_strings_make_the_file_malformed() {
        let file = SourceFile::parse("a.cs", "class A { string s = \"abc\n; }");
        assert!(file.has_errors());
    }
}
