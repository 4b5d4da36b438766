//! Diagnostic model and aggregation.

pub mod reporter;
pub mod suppression;

pub use reporter::{AnalysisReport, Reporter};
pub use suppression::{parse_suppressions, SuppressionContext, SuppressionStats};

use crate::common::{SourceLocation, Span};
use crate::syntax::SourceFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Some(Severity::Info),
            "warning" | "warn" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A position in a named file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub path: PathBuf,
    pub span: Span,
    #[serde(flatten)]
    pub position: SourceLocation,
}

impl Location {
    pub fn new(file: &SourceFile, span: Span) -> Self {
        Self {
            path: file.path.clone(),
            span,
            position: file.location(span),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.path.display(),
            self.position.line,
            self.position.column
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub id: &'static str,
    pub severity: Severity,
    pub args: Vec<String>,
    pub message: String,
    pub location: Location,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_locations: Vec<Location>,
    /// The offending node; what a fix rewrites.
    #[serde(skip)]
    pub node_span: Span,
}

impl Diagnostic {
    pub fn path(&self) -> &std::path::Path {
        &self.location.path
    }

    /// Points the fix at a node other than the reported span, e.g. the
    /// whole field declaration when the name is reported.
    pub fn with_node_span(mut self, span: Span) -> Self {
        self.node_span = span;
        self
    }

    pub fn with_additional_location(mut self, location: Location) -> Self {
        self.additional_locations.push(location);
        self
    }

    /// Identity used for deduplication.
    pub fn key(&self) -> (&'static str, &std::path::Path, Span, &[String]) {
        (self.id, &self.location.path, self.location.span, &self.args)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {}",
            self.location, self.severity, self.id, self.message
        )
    }
}

/// Substitutes `{0}`, `{1}`, ... in `template`.
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut out = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        out = out.replace(&format!("{{{i}}}"), arg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_positional_arguments() {
        let msg = format_message(
            "Field '{0}' of the type '{1}' must be read-only",
            &["Item1".to_string(), "TestEnum".to_string()],
        );
        assert_eq!(msg, "Field 'Item1' of the type 'TestEnum' must be read-only");
    }

    #[test]
    fn severities_order_by_importance() {
        assert!(Severity::Warning < Severity::Error);
        assert_eq!(Severity::parse("WARN"), Some(Severity::Warning));
        assert_eq!(Severity::parse("fatal"), None);
    }
}
