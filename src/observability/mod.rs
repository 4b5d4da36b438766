//! Observability infrastructure: logging setup, crash reports and context
//! tracking.
//!
//! ## Usage
//!
//! ```ignore
//! use patternlint::observability::{init_tracing, install_panic_hook, set_phase, AnalysisPhase};
//!
//! fn main() {
//!     init_tracing(false);
//!     install_panic_hook();
//!     let _phase = set_phase(AnalysisPhase::Parsing);
//!     // a panic here reports the phase
//! }
//! ```

pub mod context;
pub mod panic_hook;

pub use context::{
    get_current_context, get_progress, increment_processed, reset_context, set_current_declaration,
    set_current_file, set_phase, set_phase_persistent, set_progress, AnalysisContext,
    AnalysisPhase, ContextGuard,
};
pub use panic_hook::install_panic_hook;

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "PATTERNLINT_LOG";

/// Install the global `tracing` subscriber writing to stderr.
///
/// The filter comes from `PATTERNLINT_LOG`, falling back to `debug` when
/// `verbose` is set and `warn` otherwise. Calling it twice is harmless.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "patternlint=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
