//! The analysis pipeline: validate config, parse, index, run
//! detectors, aggregate.

use crate::analyzers::python::parse_module;
use crate::config::SmellConfig;
use crate::core::{Report, ReportMetadata, ReportSummary, Result, SourceTree};
use crate::index::SymbolIndex;
use crate::smells::run_detectors;
use chrono::Utc;

/// Analyze one Python source string and produce a report labelled with
/// `file_path`.
pub fn analyze_source(source: &str, file_path: &str, config: &SmellConfig) -> Result<Report> {
    config.validate()?;
    let tree = parse_module(source, file_path)?;
    analyze_parsed(&tree, file_path, config)
}

/// Analyze an already-parsed tree. The caller keeps ownership; the run
/// borrows it and leaves nothing behind.
pub fn analyze_tree(tree: &SourceTree, file_path: &str, config: &SmellConfig) -> Result<Report> {
    config.validate()?;
    analyze_parsed(tree, file_path, config)
}

fn analyze_parsed(tree: &SourceTree, file_path: &str, config: &SmellConfig) -> Result<Report> {
    let index = SymbolIndex::build(tree)?;
    log::debug!(
        "{file_path}: indexed {} classes, {} methods",
        index.classes.len(),
        index.methods.len()
    );

    let (findings, warnings) = run_detectors(&index, config);
    let summary = ReportSummary::from_findings(&findings);
    Ok(Report {
        metadata: ReportMetadata {
            file_path: file_path.to_string(),
            scan_timestamp: Utc::now(),
            active_smells: config.active(),
            detector_version: env!("CARGO_PKG_VERSION").to_string(),
            warnings,
        },
        summary,
        details: findings,
    })
}
