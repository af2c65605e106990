//! Report-level types shared across the engine

pub mod ast;
pub mod errors;
pub mod metrics;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use ast::{Number, NumberKey, SourceTree, Span, SyntaxNode};
pub use errors::{Error, Result};

/// The six detected smell kinds, in the fixed order detectors run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SmellType {
    LongMethod,
    GodClass,
    DuplicatedCode,
    LargeParameterList,
    MagicNumbers,
    FeatureEnvy,
}

impl SmellType {
    /// Declared detector order; aggregation preserves it regardless of
    /// which detectors are enabled or when they finish.
    pub const ALL: [SmellType; 6] = [
        SmellType::LongMethod,
        SmellType::GodClass,
        SmellType::DuplicatedCode,
        SmellType::LargeParameterList,
        SmellType::MagicNumbers,
        SmellType::FeatureEnvy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SmellType::LongMethod => "LongMethod",
            SmellType::GodClass => "GodClass",
            SmellType::DuplicatedCode => "DuplicatedCode",
            SmellType::LargeParameterList => "LargeParameterList",
            SmellType::MagicNumbers => "MagicNumbers",
            SmellType::FeatureEnvy => "FeatureEnvy",
        }
    }
}

impl std::fmt::Display for SmellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SmellType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SmellType::ALL
            .into_iter()
            .find(|smell| smell.name() == s)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "unknown smell '{s}' (valid: {})",
                    SmellType::ALL.map(|s| s.name()).join(", ")
                ))
            })
    }
}

/// Severity levels for findings. Ordering supports monotonicity checks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(s)
    }
}

/// Per-smell metric record carried by a finding. One fixed shape per
/// smell type; the untagged representation keeps the wire format an
/// open mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SmellDetails {
    LongMethod {
        method_name: String,
        sloc: usize,
        cyclomatic_complexity: u32,
        sloc_threshold: usize,
        complexity_threshold: usize,
    },
    GodClass {
        class_name: String,
        method_count: usize,
        field_count: usize,
        coupling: usize,
        method_threshold: usize,
        field_threshold: usize,
    },
    DuplicatedCode {
        block1_name: String,
        block1_type: String,
        block1_start_line: usize,
        block1_end_line: usize,
        block2_name: String,
        block2_type: String,
        block2_start_line: usize,
        block2_end_line: usize,
        similarity: f64,
    },
    LargeParameterList {
        method_name: String,
        parameter_count: usize,
        parameters: Vec<String>,
        threshold: usize,
    },
    MagicNumbers {
        number: Number,
        occurrences: usize,
        locations: Vec<usize>,
        threshold: usize,
    },
    FeatureEnvy {
        method_name: String,
        foreign_accesses: usize,
        self_accesses: usize,
    },
}

/// A single detected smell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub smell_type: SmellType,
    pub severity: Severity,
    pub message: String,
    pub line_start: usize,
    pub line_end: usize,
    pub details: SmellDetails,
}

/// Non-fatal per-detector failure recorded in report metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorWarning {
    pub smell_type: SmellType,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub file_path: String,
    pub scan_timestamp: DateTime<Utc>,
    pub active_smells: Vec<SmellType>,
    pub detector_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DetectorWarning>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_smells_detected: usize,
    pub severity_breakdown: SeverityBreakdown,
    pub smells_by_type: BTreeMap<SmellType, usize>,
}

impl ReportSummary {
    /// Single pass over the concatenated findings.
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = ReportSummary {
            total_smells_detected: findings.len(),
            ..Default::default()
        };
        for finding in findings {
            match finding.severity {
                Severity::High => summary.severity_breakdown.high += 1,
                Severity::Medium => summary.severity_breakdown.medium += 1,
                Severity::Low => summary.severity_breakdown.low += 1,
            }
            *summary.smells_by_type.entry(finding.smell_type).or_insert(0) += 1;
        }
        summary
    }
}

/// Final analysis report for one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub details: Vec<Finding>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn finding(smell_type: SmellType, severity: Severity) -> Finding {
        Finding {
            smell_type,
            severity,
            message: String::new(),
            line_start: 1,
            line_end: 1,
            details: SmellDetails::FeatureEnvy {
                method_name: "m".into(),
                foreign_accesses: 3,
                self_accesses: 1,
            },
        }
    }

    #[test]
    fn summary_tallies_without_rederiving_severity() {
        let findings = vec![
            finding(SmellType::LongMethod, Severity::High),
            finding(SmellType::LongMethod, Severity::Medium),
            finding(SmellType::MagicNumbers, Severity::Medium),
        ];
        let summary = ReportSummary::from_findings(&findings);
        assert_eq!(summary.total_smells_detected, 3);
        assert_eq!(summary.severity_breakdown.high, 1);
        assert_eq!(summary.severity_breakdown.medium, 2);
        assert_eq!(summary.severity_breakdown.low, 0);
        assert_eq!(summary.smells_by_type[&SmellType::LongMethod], 2);
        assert_eq!(summary.smells_by_type[&SmellType::MagicNumbers], 1);
    }

    #[test]
    fn smell_type_round_trips_through_from_str() {
        for smell in SmellType::ALL {
            assert_eq!(smell.name().parse::<SmellType>().unwrap(), smell);
        }
        assert!("LongMethods".parse::<SmellType>().is_err());
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
    }
}
