//! Runtime setup for the CLI: worker pool and terminal colours.

use crate::config::PatternLintConfig;

/// Rayon thread stack size (8MB for deeply nested syntax trees)
const RAYON_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Configure rayon global thread pool once at startup
pub fn configure_thread_pool(jobs: usize) {
    let mut builder = rayon::ThreadPoolBuilder::new().stack_size(RAYON_STACK_SIZE);

    if jobs > 0 {
        builder = builder.num_threads(jobs);
    }

    if let Err(e) = builder.build_global() {
        tracing::debug!("thread pool already configured: {e}");
    }
}

/// Colour is off when configured off or when writing to a file.
pub fn configure_color(config: &PatternLintConfig, to_file: bool) {
    let configured = config.output.as_ref().and_then(|o| o.use_color);
    if to_file || configured == Some(false) {
        colored::control::set_override(false);
    } else if configured == Some(true) {
        colored::control::set_override(true);
    }
}
