//! Aggregation of raw rule output into the final, stable report.

use super::{parse_suppressions, Diagnostic, Severity, SuppressionContext, SuppressionStats};
use crate::config::RuleSettings;
use crate::syntax::SourceFile;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of analysing one compilation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub diagnostics: Vec<Diagnostic>,
    pub suppressions: SuppressionStats,
    pub files_analyzed: usize,
    pub declarations_classified: usize,
}

impl AnalysisReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn count_by_id(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for d in &self.diagnostics {
            *counts.entry(d.id).or_insert(0) += 1;
        }
        counts
    }

    pub fn for_file<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.path() == path)
    }
}

/// Applies rule settings and in-source suppressions, deduplicates and
/// orders diagnostics by file, position, then id.
pub struct Reporter<'a> {
    rules: &'a RuleSettings,
    suppressions: HashMap<PathBuf, SuppressionContext>,
}

impl<'a> Reporter<'a> {
    pub fn new(rules: &'a RuleSettings, files: &[Arc<SourceFile>]) -> Self {
        let suppressions = files
            .iter()
            .map(|f| (f.path.clone(), parse_suppressions(&f.text)))
            .filter(|(_, ctx)| !ctx.is_empty())
            .collect();
        Self {
            rules,
            suppressions,
        }
    }

    pub fn finish(&self, raw: Vec<Diagnostic>) -> (Vec<Diagnostic>, SuppressionStats) {
        let mut stats = SuppressionStats::default();
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(raw.len());

        for mut diagnostic in raw {
            let Some(severity) = self.rules.effective_severity(diagnostic.id, diagnostic.severity) else {
                continue;
            };
            diagnostic.severity = severity;
            if self.is_suppressed(&diagnostic) {
                stats.record(diagnostic.id);
                continue;
            }
            let key = (
                diagnostic.id,
                diagnostic.location.path.clone(),
                diagnostic.location.span,
                diagnostic.args.clone(),
            );
            if seen.insert(key) {
                kept.push(diagnostic);
            }
        }

        kept.sort_by(|a, b| {
            a.location
                .path
                .cmp(&b.location.path)
                .then(a.location.span.start.cmp(&b.location.span.start))
                .then(a.id.cmp(b.id))
                .then(a.location.span.end.cmp(&b.location.span.end))
                .then_with(|| a.args.cmp(&b.args))
        });
        (kept, stats)
    }

    fn is_suppressed(&self, diagnostic: &Diagnostic) -> bool {
        self.suppressions
            .get(&diagnostic.location.path)
            .is_some_and(|ctx| ctx.is_suppressed(diagnostic.location.position.line, diagnostic.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::diagnostics::Location;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = indoc! {"
        class A { }
        // patternlint:ignore-next-line[TTRESG004]
        class B { }
        #pragma warning disable TTRESG009
        class C { }
    "};

    fn file() -> Arc<SourceFile> {
        Arc::new(SourceFile::parse("A.cs", SOURCE))
    }

    fn diagnostic(file: &SourceFile, id: &'static str, line: usize, severity: Severity) -> Diagnostic {
        let start = file.line_index.line_start(line).unwrap_or(0);
        let span = Span::new(start, start + 5);
        Diagnostic {
            id,
            severity,
            args: vec![format!("line{line}")],
            message: String::new(),
            location: Location::new(file, span),
            additional_locations: Vec::new(),
            node_span: span,
        }
    }

    #[test]
    fn suppresses_dedupes_and_sorts() {
        let f = file();
        let rules = RuleSettings::default();
        let reporter = Reporter::new(&rules, &[Arc::clone(&f)]);
        let raw = vec![
            diagnostic(&f, "TTRESG009", 5, Severity::Error),
            diagnostic(&f, "TTRESG004", 3, Severity::Error),
            diagnostic(&f, "TTRESG009", 1, Severity::Error),
            diagnostic(&f, "TTRESG004", 1, Severity::Error),
            diagnostic(&f, "TTRESG004", 1, Severity::Error),
        ];
        let (kept, stats) = reporter.finish(raw);
        let ids: Vec<(&str, usize)> = kept
            .iter()
            .map(|d| (d.id, d.location.position.line))
            .collect();
        assert_eq!(ids, vec![("TTRESG004", 1), ("TTRESG009", 1)]);
        assert_eq!(stats.total_suppressed, 2);
        assert_eq!(stats.suppressed_by_id.get("TTRESG009"), Some(&1));
    }

    #[test]
    fn applies_rule_settings() {
        let f = file();
        let mut rules = RuleSettings::default();
        rules.disabled.push("TTRESG004".to_string());
        rules
            .severity
            .insert("TTRESG020".to_string(), "error".to_string());
        rules
            .severity
            .insert("TTRESG032".to_string(), "none".to_string());
        let reporter = Reporter::new(&rules, &[Arc::clone(&f)]);
        let raw = vec![
            diagnostic(&f, "TTRESG004", 1, Severity::Error),
            diagnostic(&f, "TTRESG020", 1, Severity::Warning),
            diagnostic(&f, "TTRESG032", 1, Severity::Warning),
        ];
        let (kept, _) = reporter.finish(raw);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "TTRESG020");
        assert_eq!(kept[0].severity, Severity::Error);
    }
}
