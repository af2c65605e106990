//! Long method detection: SLOC and cyclomatic complexity against
//! their configured cutoffs.

use super::SmellDetector;
use crate::config::Thresholds;
use crate::core::{Finding, Severity, SmellDetails, SmellType};
use crate::index::SymbolIndex;

pub struct LongMethodDetector;

impl SmellDetector for LongMethodDetector {
    fn smell_type(&self) -> SmellType {
        SmellType::LongMethod
    }

    fn detect(&self, index: &SymbolIndex<'_>, thresholds: &Thresholds) -> Vec<Finding> {
        let sloc_limit = thresholds.long_method_sloc;
        let complexity_limit = thresholds.long_method_cyclomatic;
        let mut findings = Vec::new();

        for method in &index.methods {
            let sloc = method.sloc;
            let complexity = method.cyclomatic as usize;
            if sloc <= sloc_limit && complexity <= complexity_limit {
                continue;
            }

            // Either metric at 150% of its cutoff escalates.
            let severity = if sloc * 2 >= sloc_limit * 3 || complexity * 2 >= complexity_limit * 3
            {
                Severity::High
            } else {
                Severity::Medium
            };

            let name = index.qualified_name(method);
            findings.push(Finding {
                smell_type: SmellType::LongMethod,
                severity,
                message: format!(
                    "Method '{name}' is too long: {sloc} lines (limit {sloc_limit}), \
                     complexity {complexity} (limit {complexity_limit})"
                ),
                line_start: method.span.line_start,
                line_end: method.span.line_end,
                details: SmellDetails::LongMethod {
                    method_name: name,
                    sloc,
                    cyclomatic_complexity: method.cyclomatic,
                    sloc_threshold: sloc_limit,
                    complexity_threshold: complexity_limit,
                },
            });
        }
        findings
    }
}
