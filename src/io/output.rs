use crate::diagnostics::{AnalysisReport, Diagnostic, Severity};
use crate::engine::FixRun;
use crate::fixes::FixEdit;
use crate::rules::DESCRIPTORS;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "markdown" | "md" => Some(Self::Markdown),
            "terminal" | "text" => Some(Self::Terminal),
            _ => None,
        }
    }
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()>;
    fn write_fixes(&mut self, run: &FixRun, dry_run: bool) -> anyhow::Result<()>;
}

/// Fix run summary as serialized to JSON.
#[derive(Serialize)]
struct FixRunView<'a> {
    dry_run: bool,
    rounds: usize,
    applied: &'a [FixEdit],
    failures: &'a [crate::engine::FixFailure],
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        writeln!(self.writer, "{json}")?;
        Ok(())
    }

    fn write_fixes(&mut self, run: &FixRun, dry_run: bool) -> anyhow::Result<()> {
        let view = FixRunView {
            dry_run,
            rounds: run.rounds,
            applied: &run.applied,
            failures: &run.failures,
        };
        writeln!(self.writer, "{}", serde_json::to_string_pretty(&view)?)?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_summary_row(&mut self, metric: &str, value: usize) -> anyhow::Result<()> {
        writeln!(self.writer, "| {metric} | {value} |")?;
        Ok(())
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        writeln!(self.writer, "# Pattern Analysis Report")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        self.write_summary_row("Files Analyzed", report.files_analyzed)?;
        self.write_summary_row("Pattern Declarations", report.declarations_classified)?;
        self.write_summary_row("Errors", report.count(Severity::Error))?;
        self.write_summary_row("Warnings", report.count(Severity::Warning))?;
        self.write_summary_row("Suppressed", report.suppressions.total_suppressed)?;
        writeln!(self.writer)?;

        if report.diagnostics.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Diagnostics")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Location | Severity | Rule | Message |")?;
        writeln!(self.writer, "|----------|----------|------|---------|")?;
        for d in &report.diagnostics {
            writeln!(
                self.writer,
                "| {} | {} | {} | {} |",
                d.location,
                d.severity,
                d.id,
                d.message.replace('|', "\\|")
            )?;
        }
        Ok(())
    }

    fn write_fixes(&mut self, run: &FixRun, dry_run: bool) -> anyhow::Result<()> {
        let heading = if dry_run { "Proposed Fixes" } else { "Applied Fixes" };
        writeln!(self.writer, "# {heading}")?;
        writeln!(self.writer)?;
        for fix in &run.applied {
            writeln!(
                self.writer,
                "- `{}` {}: {} ({})",
                fix.diagnostic_id,
                fix.path.display(),
                fix.title,
                fix.strategy
            )?;
        }
        if !run.failures.is_empty() {
            writeln!(self.writer)?;
            writeln!(self.writer, "## Rejected")?;
            writeln!(self.writer)?;
            for failure in &run.failures {
                writeln!(self.writer, "- {}: {}", failure.diagnostic.location, failure.reason)?;
            }
        }
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_diagnostic(&mut self, d: &Diagnostic) -> anyhow::Result<()> {
        let severity = match d.severity {
            Severity::Error => d.severity.as_str().red().bold(),
            Severity::Warning => d.severity.as_str().yellow().bold(),
            Severity::Info => d.severity.as_str().blue(),
        };
        writeln!(
            self.writer,
            "{}: {}[{}]: {}",
            d.location.to_string().bold(),
            severity,
            d.id.dimmed(),
            d.message
        )?;
        for extra in &d.additional_locations {
            writeln!(self.writer, "    {} {}", "see".dimmed(), extra)?;
        }
        Ok(())
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        for d in &report.diagnostics {
            self.write_diagnostic(d)?;
        }
        if !report.diagnostics.is_empty() {
            writeln!(self.writer)?;
        }

        let errors = report.count(Severity::Error);
        let warnings = report.count(Severity::Warning);
        let (symbol, status) = if errors == 0 {
            ("✓".green(), "PASS".green().bold())
        } else {
            ("✗".red(), "FAIL".red().bold())
        };
        writeln!(
            self.writer,
            "{symbol} {status}: {} error(s), {} warning(s) in {} file(s), {} pattern declaration(s)",
            errors, warnings, report.files_analyzed, report.declarations_classified
        )?;
        if report.suppressions.total_suppressed > 0 {
            writeln!(
                self.writer,
                "  {} suppressed by comments",
                report.suppressions.total_suppressed.to_string().dimmed()
            )?;
        }
        Ok(())
    }

    fn write_fixes(&mut self, run: &FixRun, dry_run: bool) -> anyhow::Result<()> {
        let verb = if dry_run { "would fix" } else { "fixed" };
        for fix in &run.applied {
            writeln!(
                self.writer,
                "{} {} {} {}: {}",
                "✓".green(),
                verb,
                fix.diagnostic_id.bold(),
                fix.path.display(),
                fix.title
            )?;
        }
        for failure in &run.failures {
            writeln!(
                self.writer,
                "{} {}: {}",
                "✗".red(),
                failure.diagnostic.location,
                failure.reason
            )?;
        }
        writeln!(
            self.writer,
            "{} fix(es) in {} round(s), {} rejected",
            run.applied.len(),
            run.rounds,
            run.failures.len()
        )?;
        Ok(())
    }
}

/// Catalogue listing for `patternlint rules`.
pub fn rules_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Id", "Name", "Severity", "Fix"]);
    for d in DESCRIPTORS {
        table.add_row(vec![
            d.id.to_string(),
            d.name.to_string(),
            d.severity.to_string(),
            if d.has_fix { "yes" } else { "" }.to_string(),
        ]);
    }
    table
}

pub fn create_writer(format: OutputFormat, writer: Box<dyn Write>) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
    }
}
