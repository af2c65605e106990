//! Smellmap: structural code-smell detection for Python sources.
//!
//! The pipeline parses a file into a language-neutral syntax tree,
//! builds a per-run symbol index, runs six independent detectors
//! against it, and aggregates their findings into a single report.

pub mod analyzers;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod index;
pub mod output;
pub mod smells;

pub use crate::config::{SmellConfig, Thresholds};
pub use crate::core::{Finding, Report, Severity, SmellType};
pub use crate::engine::{analyze_source, analyze_tree};
