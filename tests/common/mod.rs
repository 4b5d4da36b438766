// Shared helpers for patternlint integration tests
#![allow(dead_code)]

use patternlint::config::PatternLintConfig;
use patternlint::diagnostics::{AnalysisReport, Diagnostic};
use patternlint::engine::Engine;
use patternlint::semantic::Compilation;

/// Compiles sources into an assembly named `App`.
pub fn compile(sources: &[(&str, &str)]) -> Compilation {
    Compilation::from_sources("App", sources)
}

pub fn compile_one(src: &str) -> Compilation {
    compile(&[("Test.cs", src)])
}

/// Engine evaluating declarations on the calling thread.
pub fn sequential_engine() -> Engine {
    let mut config = PatternLintConfig::default();
    config.analysis.parallel = false;
    Engine::new(config)
}

pub fn with_id<'a>(report: &'a AnalysisReport, id: &str) -> Vec<&'a Diagnostic> {
    report.diagnostics.iter().filter(|d| d.id == id).collect()
}

pub fn args_of(diagnostics: &[&Diagnostic]) -> Vec<Vec<String>> {
    diagnostics.iter().map(|d| d.args.clone()).collect()
}

/// Applies the fix of the first `id` diagnostic and returns the rewritten
/// compilation and the text of the rewritten file.
pub fn fix_first(src: &str, id: &str) -> (Compilation, String) {
    let engine = sequential_engine();
    let c = compile_one(src);
    let report = engine.analyze(&c);
    let diagnostic = report
        .diagnostics
        .iter()
        .find(|d| d.id == id)
        .unwrap_or_else(|| panic!("no {id} diagnostic in {:#?}", report.diagnostics));
    let applied = engine
        .apply(&c, diagnostic)
        .unwrap_or_else(|err| panic!("fix for {id} failed: {err}"));
    let text = applied
        .compilation
        .current_files()
        .iter()
        .find(|f| f.path == applied.fix.path)
        .map(|f| f.text.clone())
        .expect("rewritten file");
    (applied.compilation, text)
}

/// Diagnostics as comparable tuples, sorted.
pub fn fingerprint(diagnostics: &[Diagnostic]) -> Vec<(String, String, usize, Vec<String>)> {
    let mut out: Vec<_> = diagnostics
        .iter()
        .map(|d| {
            (
                d.id.to_string(),
                d.path().display().to_string(),
                d.location.span.start,
                d.args.clone(),
            )
        })
        .collect();
    out.sort();
    out
}
