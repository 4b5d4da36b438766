//! Analysis and fix driver.
//!
//! Analysis classifies every declaration of the current assembly, runs the
//! rule catalogue against it and hands the combined output to the
//! reporter. Declarations share nothing, so they are evaluated on the rayon
//! pool. Fixing is sequential per file: one fix is applied, the
//! compilation is rebuilt and the catalogue re-run to confirm the fix
//! converged.

use crate::config::PatternLintConfig;
use crate::diagnostics::{AnalysisReport, Diagnostic, Reporter};
use crate::error::{ErrorCode, PatternLintError, Result};
use crate::fixes::{apply_fix, map_span, select_fix, FixEdit};
use crate::observability::{increment_processed, set_current_declaration, set_phase, set_progress, AnalysisPhase};
use crate::patterns::classify;
use crate::rules::{catalogue, evaluate, Rule, RuleContext};
use crate::semantic::{Compilation, TypeId};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: PatternLintConfig,
}

/// A fix applied to a compilation.
#[derive(Debug, Clone)]
pub struct AppliedFix {
    pub fix: FixEdit,
    pub compilation: Compilation,
}

/// A diagnostic whose fix was rejected.
#[derive(Debug, Clone, Serialize)]
pub struct FixFailure {
    pub diagnostic: Diagnostic,
    pub code: String,
    pub reason: String,
}

/// Outcome of [`Engine::fix_all`].
#[derive(Debug, Clone)]
pub struct FixRun {
    pub compilation: Compilation,
    pub applied: Vec<FixEdit>,
    pub failures: Vec<FixFailure>,
    pub rounds: usize,
}

impl FixRun {
    /// Files whose text differs from `before`, with their new text.
    pub fn changed_files(&self, before: &Compilation) -> Vec<(PathBuf, String)> {
        self.compilation
            .current_files()
            .iter()
            .zip(before.current_files())
            .filter(|(after, before)| after.text != before.text)
            .map(|(after, _)| (after.path.clone(), after.text.clone()))
            .collect()
    }
}

impl Engine {
    pub fn new(config: PatternLintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatternLintConfig {
        &self.config
    }

    /// Rules that are not turned off by configuration.
    fn active_rules(&self) -> Vec<Rule> {
        catalogue()
            .iter()
            .copied()
            .filter(|rule| !self.config.rules.is_disabled(rule.id))
            .collect()
    }

    /// Classifies and checks one declaration.
    fn evaluate_declaration(compilation: &Compilation, id: TypeId, rules: &[Rule]) -> (Vec<Diagnostic>, bool) {
        let decl = compilation.symbols().decl(id);
        let _declaration = set_current_declaration(decl.name.text.clone());
        let classification = classify(compilation, id);
        let ctx = RuleContext::new(compilation, id, &classification);
        let found = evaluate(&ctx, rules);
        increment_processed();
        (found, classification.primary.is_some() && ctx.is_home_part())
    }

    /// Diagnostics of every rule, before severity overrides and
    /// suppressions.
    fn raw_diagnostics(&self, compilation: &Compilation) -> (Vec<Diagnostic>, usize) {
        let rules = self.active_rules();
        let types: Vec<TypeId> = {
            let _phase = set_phase(AnalysisPhase::Classification);
            compilation.current_types().collect()
        };

        let _phase = set_phase(AnalysisPhase::RuleEvaluation);
        set_progress(0, types.len());
        let results: Vec<(Vec<Diagnostic>, bool)> = if self.config.analysis.parallel {
            types
                .par_iter()
                .map(|id| Self::evaluate_declaration(compilation, *id, &rules))
                .collect()
        } else {
            types
                .iter()
                .map(|id| Self::evaluate_declaration(compilation, *id, &rules))
                .collect()
        };

        let classified = results.iter().filter(|(_, classified)| *classified).count();
        let raw = results.into_iter().flat_map(|(found, _)| found).collect();
        (raw, classified)
    }

    /// Runs the catalogue over the current assembly.
    pub fn analyze(&self, compilation: &Compilation) -> AnalysisReport {
        let (raw, classified) = self.raw_diagnostics(compilation);
        let raw_count = raw.len();

        let _phase = set_phase(AnalysisPhase::Reporting);
        let reporter = Reporter::new(&self.config.rules, compilation.current_files());
        let (diagnostics, suppressions) = reporter.finish(raw);

        tracing::info!(
            files = compilation.current_files().len(),
            declarations = classified,
            raw = raw_count,
            reported = diagnostics.len(),
            "analysis finished"
        );
        AnalysisReport {
            diagnostics,
            suppressions,
            files_analyzed: compilation.current_files().len(),
            declarations_classified: classified,
        }
    }

    /// Applies the fix for `diagnostic` and, unless disabled, confirms the
    /// same diagnostic does not come back at the rewritten node.
    pub fn apply(&self, compilation: &Compilation, diagnostic: &Diagnostic) -> Result<AppliedFix> {
        let _phase = set_phase(AnalysisPhase::Fixing);
        let fix = select_fix(diagnostic, compilation).ok_or_else(|| {
            PatternLintError::fix(ErrorCode::FIX_NOT_AVAILABLE, diagnostic.id, "no fix for this diagnostic")
        })?;
        let file_id = compilation.file_id(&fix.path).ok_or_else(|| {
            PatternLintError::fix(
                ErrorCode::FIX_NOT_AVAILABLE,
                diagnostic.id,
                format!("{} is not part of the compilation", fix.path.display()),
            )
        })?;

        let original = compilation.symbols().file(file_id);
        let rewritten = apply_fix(original, &fix)?;
        let next = compilation.with_file_replaced(file_id, Arc::new(rewritten));

        if self.config.fix.verify {
            let (after, _) = self.raw_diagnostics(&next);
            if recurs(diagnostic, &fix, &after) {
                return Err(PatternLintError::fix(
                    ErrorCode::FIX_NOT_CONVERGED,
                    diagnostic.id,
                    format!("'{}' reproduces the diagnostic", fix.title),
                ));
            }
        }

        tracing::debug!(
            diagnostic = diagnostic.id,
            path = %fix.path.display(),
            strategy = %fix.strategy,
            "fix applied"
        );
        Ok(AppliedFix { fix, compilation: next })
    }

    /// Applies fixes until nothing fixable remains or the round limit is
    /// reached. Each round applies at most one fix per file.
    pub fn fix_all(&self, compilation: &Compilation) -> FixRun {
        let mut current = compilation.clone();
        let mut applied = Vec::new();
        let mut failures = Vec::new();
        let mut rejected: HashSet<(&'static str, PathBuf, Vec<String>)> = HashSet::new();
        let mut rounds = 0;

        while rounds < self.config.fix.max_iterations {
            rounds += 1;
            let report = self.analyze(&current);
            let mut touched: HashSet<PathBuf> = HashSet::new();

            for diagnostic in &report.diagnostics {
                let path = diagnostic.path().to_path_buf();
                let identity = (diagnostic.id, path.clone(), diagnostic.args.clone());
                if touched.contains(&path) || rejected.contains(&identity) {
                    continue;
                }
                match select_fix(diagnostic, &current) {
                    Some(fix) if !touched.contains(&fix.path) => {}
                    _ => continue,
                }
                match self.apply(&current, diagnostic) {
                    Ok(done) => {
                        touched.insert(done.fix.path.clone());
                        touched.insert(path);
                        current = done.compilation;
                        applied.push(done.fix);
                    }
                    Err(err) => {
                        tracing::warn!(diagnostic = diagnostic.id, error = %err, "fix rejected");
                        failures.push(FixFailure {
                            diagnostic: diagnostic.clone(),
                            code: err.code().to_string(),
                            reason: err.to_string(),
                        });
                        rejected.insert(identity);
                    }
                }
            }

            if touched.is_empty() {
                break;
            }
        }

        tracing::info!(applied = applied.len(), rejected = failures.len(), rounds, "fixing finished");
        FixRun {
            compilation: current,
            applied,
            failures,
            rounds,
        }
    }
}

/// Whether `after` still holds `original` at the node the fix rewrote.
fn recurs(original: &Diagnostic, fix: &FixEdit, after: &[Diagnostic]) -> bool {
    let mapped = map_span(original.node_span, &fix.edits);
    after.iter().filter(|d| d.id == original.id).any(|d| {
        if d.path() == fix.path {
            mapped.contains(d.location.span)
        } else {
            // reported in another part; that file was not rewritten
            d.path() == original.path() && d.location.span == original.location.span && d.args == original.args
        }
    })
}
