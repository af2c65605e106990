//! Command-line surface.

use crate::config::SmellConfig;
use crate::core::{Report, ReportMetadata, ReportSummary, SmellType};
use crate::engine::analyze_source;
use crate::output::{write_report, OutputFormat};
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "smellmap")]
#[command(about = "Detect code smells in Python source files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more Python files
    Scan {
        /// Files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run only these smells (comma-separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<SmellType>,

        /// Skip these smells (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<SmellType>,
    },

    /// Write a configuration file with the default settings
    InitConfig {
        /// Where to write it
        #[arg(short, long, default_value = "smellmap.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    ShowConfig {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Scan {
            files,
            config,
            format,
            output,
            only,
            exclude,
        } => scan(&files, config.as_deref(), format, output.as_deref(), &only, &exclude),
        Commands::InitConfig { output, force } => init_config(&output, force),
        Commands::ShowConfig { config } => show_config(config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SmellConfig> {
    match path {
        Some(path) => SmellConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(SmellConfig::default()),
    }
}

fn scan(
    files: &[PathBuf],
    config_path: Option<&Path>,
    format: OutputFormat,
    output: Option<&Path>,
    only: &[SmellType],
    exclude: &[SmellType],
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if !only.is_empty() {
        config.retain_only(only);
    }
    config.exclude(exclude);
    config.validate()?;

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let source = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let report = analyze_source(&source, &file.display().to_string(), &config)
            .with_context(|| format!("analysis of {} failed", file.display()))?;
        log::info!(
            "{}: {} smells",
            file.display(),
            report.summary.total_smells_detected
        );
        reports.push(report);
    }

    let report = combine_reports(reports, &config);
    write_report(&report, format, output)?;
    Ok(())
}

/// Merge per-file reports into one. Findings keep per-file order, files
/// in the order given on the command line.
fn combine_reports(mut reports: Vec<Report>, config: &SmellConfig) -> Report {
    if reports.len() == 1 {
        return reports.remove(0);
    }
    let file_count = reports.len();
    let mut details = Vec::new();
    let mut warnings = Vec::new();
    for report in reports {
        details.extend(report.details);
        warnings.extend(report.metadata.warnings);
    }
    let summary = ReportSummary::from_findings(&details);
    Report {
        metadata: ReportMetadata {
            file_path: format!("{file_count} files"),
            scan_timestamp: Utc::now(),
            active_smells: config.active(),
            detector_version: env!("CARGO_PKG_VERSION").to_string(),
            warnings,
        },
        summary,
        details,
    }
}

fn init_config(output: &Path, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            output.display()
        );
    }
    let config = SmellConfig::default();
    let toml = toml::to_string_pretty(&config).context("failed to serialize configuration")?;
    std::fs::write(output, toml)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote default configuration to {}", output.display());
    Ok(())
}

fn show_config(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
