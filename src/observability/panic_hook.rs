//! Custom panic hook for structured crash reports.
//!
//! A crash report names the phase, file and declaration being analyzed so
//! a failing input can be reproduced.

use super::context::{get_current_context, get_progress, AnalysisContext};
use std::panic::PanicHookInfo;
use tracing::Span;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the custom panic hook. Call early in `main`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        print_crash_report(info);
    }));
}

fn print_crash_report(info: &PanicHookInfo<'_>) {
    let context = get_current_context();
    let (processed, total) = get_progress();

    eprintln!();
    eprintln!("==================== PATTERNLINT CRASH REPORT ====================");
    eprintln!("  Version: {VERSION}");
    eprintln!("  Platform: {}", std::env::consts::OS);
    eprintln!("  Panic: {}", extract_panic_message(info));
    if let Some(location) = info.location() {
        eprintln!(
            "  Location: {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        );
    }
    for line in context_lines(&context, processed, total) {
        eprintln!("  {line}");
    }
    if std::env::var("RUST_BACKTRACE").is_ok() {
        eprintln!("{}", std::backtrace::Backtrace::capture());
    } else {
        eprintln!("  Run with RUST_BACKTRACE=1 for a stack trace");
    }
    eprintln!("==================================================================");
}

fn context_lines(context: &AnalysisContext, processed: usize, total: usize) -> Vec<String> {
    let mut lines = Vec::new();
    match &context.phase {
        Some(phase) => lines.push(format!("Phase: {phase}")),
        None => lines.push("Phase: (not set)".to_string()),
    }
    if let Some(metadata) = Span::current().metadata() {
        lines.push(format!("Span: {}", metadata.name()));
    }
    if let Some(file) = &context.current_file {
        lines.push(format!("File: {}", file.display()));
    }
    if let Some(decl) = &context.current_declaration {
        lines.push(format!("Declaration: {decl}"));
    }
    if total > 0 {
        lines.push(format!("Progress: {processed} / {total} declarations"));
    }
    lines
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::AnalysisPhase;
    use std::path::PathBuf;

    #[test]
    fn context_lines_include_declaration_and_progress() {
        let context = AnalysisContext {
            phase: Some(AnalysisPhase::RuleEvaluation),
            current_file: Some(PathBuf::from("A.cs")),
            current_declaration: Some("Demo.A".to_string()),
        };
        let lines = context_lines(&context, 3, 10);
        assert!(lines.contains(&"Phase: rule_evaluation".to_string()));
        assert!(lines.contains(&"Declaration: Demo.A".to_string()));
        assert!(lines.contains(&"Progress: 3 / 10 declarations".to_string()));
    }

    #[test]
    fn context_lines_without_phase() {
        let lines = context_lines(&AnalysisContext::new(), 0, 0);
        assert_eq!(lines, vec!["Phase: (not set)".to_string()]);
    }
}
