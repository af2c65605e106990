//! Report rendering: machine-readable JSON and a human-readable table.

use crate::core::{Report, Result, Severity};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

pub fn render(report: &Report, format: OutputFormat, writer: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, report)?;
            writeln!(writer)?;
        }
        OutputFormat::Table => render_table(report, writer)?,
    }
    Ok(())
}

/// Render to a file, or stdout when no path is given.
pub fn write_report(report: &Report, format: OutputFormat, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            render(report, format, &mut file)
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            render(report, format, &mut handle)
        }
    }
}

fn render_table(report: &Report, writer: &mut impl Write) -> Result<()> {
    writeln!(writer, "Code smell report: {}", report.metadata.file_path)?;
    writeln!(
        writer,
        "Scanned {} with detectors v{}",
        report.metadata.scan_timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        report.metadata.detector_version
    )?;
    writeln!(writer)?;

    let breakdown = &report.summary.severity_breakdown;
    writeln!(
        writer,
        "Total: {} (high: {}, medium: {}, low: {})",
        report.summary.total_smells_detected, breakdown.high, breakdown.medium, breakdown.low
    )?;
    for (smell, count) in &report.summary.smells_by_type {
        writeln!(writer, "  {smell}: {count}")?;
    }

    if !report.details.is_empty() {
        writeln!(writer)?;
        writeln!(
            writer,
            "{:<22} {:<8} {:>11}  {}",
            "SMELL", "SEVERITY", "LINES", "MESSAGE"
        )?;
        for finding in &report.details {
            writeln!(
                writer,
                "{:<22} {:<8} {:>5}-{:<5}  {}",
                finding.smell_type.name(),
                severity_label(finding.severity),
                finding.line_start,
                finding.line_end,
                finding.message
            )?;
        }
    }

    if !report.metadata.warnings.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Warnings:")?;
        for warning in &report.metadata.warnings {
            writeln!(writer, "  {}: {}", warning.smell_type, warning.message)?;
        }
    }
    Ok(())
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "HIGH",
        Severity::Medium => "MEDIUM",
        Severity::Low => "LOW",
    }
}
