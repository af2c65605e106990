//! Large parameter list detection.

use super::SmellDetector;
use crate::config::Thresholds;
use crate::core::{Finding, Severity, SmellDetails, SmellType};
use crate::index::SymbolIndex;

/// Parameters past the cutoff before the finding escalates to high.
const HIGH_MARGIN: usize = 4;

pub struct LargeParameterListDetector;

impl SmellDetector for LargeParameterListDetector {
    fn smell_type(&self) -> SmellType {
        SmellType::LargeParameterList
    }

    fn detect(&self, index: &SymbolIndex<'_>, thresholds: &Thresholds) -> Vec<Finding> {
        let limit = thresholds.large_parameter_list;
        let mut findings = Vec::new();

        for method in &index.methods {
            let count = method.params.len();
            if count <= limit {
                continue;
            }
            let severity = if count >= limit + HIGH_MARGIN {
                Severity::High
            } else {
                Severity::Medium
            };
            let name = index.qualified_name(method);
            findings.push(Finding {
                smell_type: SmellType::LargeParameterList,
                severity,
                message: format!("Method '{name}' takes {count} parameters (limit {limit})"),
                line_start: method.span.line_start,
                line_end: method.span.line_end,
                details: SmellDetails::LargeParameterList {
                    method_name: name,
                    parameter_count: count,
                    parameters: method.params.clone(),
                    threshold: limit,
                },
            });
        }
        findings
    }
}
