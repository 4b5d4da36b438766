use super::{open_output, prepare, resolve_format};
use crate::cli::args::{AnalysisArgs, OutputFormat};
use crate::engine::Engine;
use crate::io::create_writer;
use crate::observability::{set_phase, AnalysisPhase};
use anyhow::Result;
use std::path::PathBuf;

/// Runs the catalogue and writes the report. `Ok(false)` when an error
/// diagnostic remains.
pub fn handle_check_command(
    analysis: AnalysisArgs,
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
) -> Result<bool> {
    let (config, compilation) = prepare(&analysis, output.as_deref())?;
    let format = resolve_format(format, &config);
    let report = Engine::new(config).analyze(&compilation);

    let _phase = set_phase(AnalysisPhase::OutputGeneration);
    let mut writer = create_writer(format, open_output(output.as_deref())?);
    writer.write_report(&report)?;
    Ok(!report.has_errors())
}
