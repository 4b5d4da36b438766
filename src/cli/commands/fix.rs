use super::{open_output, prepare, resolve_format};
use crate::cli::args::{AnalysisArgs, OutputFormat};
use crate::engine::Engine;
use crate::io::{create_writer, write_file};
use crate::observability::{set_phase, AnalysisPhase};
use anyhow::Result;
use std::path::PathBuf;

/// Applies fixes until a fixed point and writes the rewritten files unless
/// `dry_run`. `Ok(false)` when a fix was rejected.
pub fn handle_fix_command(
    analysis: AnalysisArgs,
    dry_run: bool,
    no_verify: bool,
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
) -> Result<bool> {
    let (mut config, compilation) = prepare(&analysis, output.as_deref())?;
    if no_verify {
        config.fix.verify = false;
    }
    let format = resolve_format(format, &config);
    let run = Engine::new(config).fix_all(&compilation);

    let changed = run.changed_files(&compilation);
    if !dry_run {
        for (path, text) in &changed {
            write_file(path, text)?;
            tracing::info!(path = %path.display(), "rewrote file");
        }
    }

    let _phase = set_phase(AnalysisPhase::OutputGeneration);
    let mut writer = create_writer(format, open_output(output.as_deref())?);
    writer.write_fixes(&run, dry_run)?;
    Ok(run.failures.is_empty())
}
