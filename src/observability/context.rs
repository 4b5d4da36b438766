//! Thread-local context tracking for crash reports.
//!
//! Provides context information about the current analysis phase, file and
//! declaration being processed. Uses thread-local storage for per-thread
//! context (works with rayon parallel iterators) and atomic counters for
//! global progress.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static DECLARATIONS_PROCESSED: AtomicUsize = AtomicUsize::new(0);
static DECLARATIONS_TOTAL: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    pub(crate) static CURRENT_CONTEXT: RefCell<AnalysisContext> = const { RefCell::new(AnalysisContext::new()) };
}

/// Snapshot of what patternlint was doing on this thread.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub phase: Option<AnalysisPhase>,
    pub current_file: Option<PathBuf>,
    /// Fully qualified name of the declaration under analysis
    pub current_declaration: Option<String>,
}

impl AnalysisContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            current_file: None,
            current_declaration: None,
        }
    }
}

/// Major stages of a patternlint run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum AnalysisPhase {
    /// Discovering source files
    FileDiscovery,
    /// Lexing and parsing source files
    Parsing,
    /// Building the symbol table
    SymbolCollection,
    /// Classifying declarations into pattern kinds
    Classification,
    /// Evaluating the rule catalogue
    RuleEvaluation,
    /// Aggregating and suppressing diagnostics
    Reporting,
    /// Producing and verifying fixes
    Fixing,
    /// Writing results
    OutputGeneration,
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FileDiscovery => "file_discovery",
            Self::Parsing => "parsing",
            Self::SymbolCollection => "symbol_collection",
            Self::Classification => "classification",
            Self::RuleEvaluation => "rule_evaluation",
            Self::Reporting => "reporting",
            Self::Fixing => "fixing",
            Self::OutputGeneration => "output_generation",
        };
        f.write_str(name)
    }
}

/// RAII guard restoring the previous context on drop.
pub struct ContextGuard {
    previous: AnalysisContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

fn update_context(apply: impl FnOnce(&mut AnalysisContext)) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        apply(&mut ctx.borrow_mut());
        ContextGuard { previous }
    })
}

/// Set the current analysis phase until the guard drops.
#[must_use]
pub fn set_phase(phase: AnalysisPhase) -> ContextGuard {
    update_context(|ctx| ctx.phase = Some(phase))
}

/// Set the current phase without a guard; it persists until changed.
pub fn set_phase_persistent(phase: AnalysisPhase) {
    CURRENT_CONTEXT.with(|ctx| {
        ctx.borrow_mut().phase = Some(phase);
    });
}

#[must_use]
pub fn set_current_file(path: impl Into<PathBuf>) -> ContextGuard {
    let path = path.into();
    update_context(|ctx| ctx.current_file = Some(path))
}

#[must_use]
pub fn set_current_declaration(name: impl Into<String>) -> ContextGuard {
    let name = name.into();
    update_context(|ctx| ctx.current_declaration = Some(name))
}

pub fn set_progress(processed: usize, total: usize) {
    DECLARATIONS_PROCESSED.store(processed, Ordering::Relaxed);
    DECLARATIONS_TOTAL.store(total, Ordering::Relaxed);
}

pub fn increment_processed() {
    DECLARATIONS_PROCESSED.fetch_add(1, Ordering::Relaxed);
}

#[must_use]
pub fn get_current_context() -> AnalysisContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// (processed, total) declarations.
#[must_use]
pub fn get_progress() -> (usize, usize) {
    (
        DECLARATIONS_PROCESSED.load(Ordering::Relaxed),
        DECLARATIONS_TOTAL.load(Ordering::Relaxed),
    )
}

pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = AnalysisContext::new();
    });
}
