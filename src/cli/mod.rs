//! Command-line interface: argument parsing (`args`), subcommand handlers
//! (`commands`) and runtime setup (`setup`).

pub mod args;
pub mod commands;
pub mod setup;

pub use args::{AnalysisArgs, Cli, Commands, OutputFormat};
pub use commands::{handle_check_command, handle_fix_command, handle_rules_command, init_config};
pub use setup::{configure_color, configure_thread_pool};

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    args::parse_args()
}
