//! Common utilities shared across the patternlint codebase.
//!
//! Key components:
//! - **Source locations**: byte spans and their 1-based line/column mapping
//! - **Text utilities**: indentation and newline helpers for edit synthesis

pub mod source_location;
pub mod text;

pub use source_location::{LineIndex, SourceLocation, Span};
pub use text::{detect_newline, indent_unit, indentation_at, is_line_start};
