use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "patternlint")]
#[command(about = "Compile-time rules and fixes for smart enums, value objects and unions", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report pattern diagnostics
    Check {
        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output format (defaults to the configured one, then terminal)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply the available fixes
    Fix {
        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Show the fixes without writing files
        #[arg(long)]
        dry_run: bool,

        /// Apply fixes without re-checking them
        #[arg(long)]
        no_verify: bool,

        /// Output format (defaults to the configured one, then terminal)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the rule catalogue
    Rules,

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// Options shared by `check` and `fix`.
#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    /// Root directory (or single file) of the analysed assembly
    pub path: PathBuf,

    /// Configuration file (defaults to the nearest .patternlint.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Referenced assembly sources, as NAME=DIR or DIR
    #[arg(short, long = "reference")]
    pub references: Vec<String>,

    /// Assembly name (defaults to the root directory name)
    #[arg(long)]
    pub assembly_name: Option<String>,

    /// Evaluate declarations on a single thread
    #[arg(long)]
    pub no_parallel: bool,

    /// Number of worker threads (0 = one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

impl From<OutputFormat> for crate::io::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Json,
            OutputFormat::Markdown => Self::Markdown,
            OutputFormat::Terminal => Self::Terminal,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn check_accepts_repeated_references() {
        let cli = Cli::parse_from([
            "patternlint",
            "check",
            "src/Domain",
            "--format",
            "json",
            "-r",
            "Lib=../lib",
            "--reference",
            "../shared",
            "--no-parallel",
        ]);
        match cli.command {
            Commands::Check { analysis, format, output } => {
                assert_eq!(analysis.path, PathBuf::from("src/Domain"));
                assert_eq!(analysis.references, vec!["Lib=../lib", "../shared"]);
                assert!(analysis.no_parallel);
                assert_eq!(format, Some(OutputFormat::Json));
                assert_eq!(output, None);
            }
            other => panic!("expected check, got {other:?}"),
        }
    }

    #[test]
    fn fix_flags() {
        let cli = Cli::parse_from(["patternlint", "fix", ".", "--dry-run", "-j", "2"]);
        match cli.command {
            Commands::Fix {
                analysis,
                dry_run,
                no_verify,
                ..
            } => {
                assert!(dry_run);
                assert!(!no_verify);
                assert_eq!(analysis.jobs, Some(2));
            }
            other => panic!("expected fix, got {other:?}"),
        }
    }

    #[test]
    fn init_force() {
        let cli = Cli::parse_from(["patternlint", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }
}
