//! Automated corrections.
//!
//! A fix is a set of text edits confined to one file and to the
//! declaration that owns the offending node. Fixes are computed on demand
//! from a diagnostic and applied to a copy of the source, which is
//! re-parsed before the result is accepted.

pub mod accessors;
pub mod attributes;
pub mod closures;
pub mod modifiers;
pub mod rewriter;
pub mod selector;
pub mod stubs;

pub use rewriter::{apply_edits, apply_fix, map_span};
pub use selector::select_fix;

use crate::common::Span;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Rewrite strategy that produced a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixStrategy {
    /// Add, remove or replace a modifier keyword.
    ModifierEdit,
    /// Remove or narrow a property accessor.
    AccessorEdit,
    /// Insert a sibling attribute or rewrite a named attribute argument.
    AttributeEdit,
    /// Append a method with a throwing body.
    MemberStub,
    /// Route captured variables through the `state` overload.
    ClosureToState,
    /// Only mark a callback `static`; captures that are not plain locals
    /// are left for the user.
    StaticOnly,
}

impl FixStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModifierEdit => "modifier-edit",
            Self::AccessorEdit => "accessor-edit",
            Self::AttributeEdit => "attribute-edit",
            Self::MemberStub => "member-stub",
            Self::ClosureToState => "closure-to-state",
            Self::StaticOnly => "static-only",
        }
    }
}

impl fmt::Display for FixStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replace `span` of the original text with `new_text`. An empty span is an
/// insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub span: Span,
    pub new_text: String,
}

impl TextEdit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            span: Span::empty(at),
            new_text: text.into(),
        }
    }

    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: text.into(),
        }
    }

    pub fn delete(span: Span) -> Self {
        Self {
            span,
            new_text: String::new(),
        }
    }
}

/// A fix ready to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixEdit {
    pub path: PathBuf,
    pub diagnostic_id: &'static str,
    pub strategy: FixStrategy,
    pub title: String,
    /// The declaration every edit must stay inside.
    pub scope: Span,
    pub edits: Vec<TextEdit>,
}

impl FixEdit {
    pub fn new(
        path: PathBuf,
        diagnostic_id: &'static str,
        strategy: FixStrategy,
        title: impl Into<String>,
        scope: Span,
    ) -> Self {
        Self {
            path,
            diagnostic_id,
            strategy,
            title: title.into(),
            scope,
            edits: Vec::new(),
        }
    }

    pub fn with_edits(mut self, edits: impl IntoIterator<Item = TextEdit>) -> Self {
        self.edits.extend(edits);
        self
    }
}
