//! Command handlers for CLI subcommands
//!
//! Each handler loads configuration and sources, runs the engine and writes
//! the result. Handlers return whether the run succeeded; the binary turns
//! that into the exit code.

mod check;
mod fix;
mod init;

pub use check::handle_check_command;
pub use fix::handle_fix_command;
pub use init::init_config;

use super::args::{AnalysisArgs, OutputFormat};
use super::setup::{configure_color, configure_thread_pool};
use crate::config::validation::validate_paths_exist;
use crate::config::{load_config_file, load_config_from, PatternLintConfig};
use crate::io::{self, ReferenceSpec};
use crate::semantic::Compilation;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Print the rule catalogue.
pub fn handle_rules_command() -> Result<()> {
    println!("{}", io::rules_table());
    Ok(())
}

fn config_start(path: &Path) -> PathBuf {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if absolute.is_file() {
        absolute.parent().map(Path::to_path_buf).unwrap_or(absolute)
    } else {
        absolute
    }
}

/// Explicit config file, else the nearest one above the analysed path.
fn resolve_config(args: &AnalysisArgs) -> Result<PatternLintConfig> {
    let config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => load_config_from(&config_start(&args.path)),
    };
    Ok(apply_overrides(config, args))
}

/// Command-line flags win over the configuration file.
fn apply_overrides(mut config: PatternLintConfig, args: &AnalysisArgs) -> PatternLintConfig {
    if args.no_parallel {
        config.analysis.parallel = false;
    }
    if let Some(jobs) = args.jobs {
        config.analysis.jobs = jobs;
    }
    if let Some(name) = &args.assembly_name {
        config.analysis.assembly_name = Some(name.clone());
    }
    config
}

fn resolve_format(flag: Option<OutputFormat>, config: &PatternLintConfig) -> io::OutputFormat {
    flag.map(Into::into)
        .or_else(|| {
            config
                .output
                .as_ref()
                .and_then(|o| o.default_format.as_deref())
                .and_then(io::OutputFormat::parse)
        })
        .unwrap_or(io::OutputFormat::Terminal)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout())),
    }
}

/// Loads configuration and sources for `check` and `fix`.
fn prepare(args: &AnalysisArgs, output: Option<&Path>) -> Result<(PatternLintConfig, Compilation)> {
    crate::observability::init_tracing(args.verbose);
    let config = resolve_config(args)?;
    configure_thread_pool(config.analysis.jobs);
    configure_color(&config, output.is_some());

    let references: Vec<ReferenceSpec> = args.references.iter().map(|r| ReferenceSpec::parse(r)).collect();
    let roots: Vec<PathBuf> = std::iter::once(args.path.clone())
        .chain(references.iter().map(|r| r.root.clone()))
        .collect();
    let missing = validate_paths_exist(&roots);
    if !missing.is_empty() {
        let message = missing.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
        anyhow::bail!(message);
    }

    let compilation = io::load_compilation(&args.path, &references, &config)
        .with_context(|| format!("loading sources from {}", args.path.display()))?;
    Ok((config, compilation))
}
