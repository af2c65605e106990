//! Feature envy detection: class methods that touch another object's
//! data more than their own.

use super::SmellDetector;
use crate::config::Thresholds;
use crate::core::{Finding, Severity, SmellDetails, SmellType};
use crate::index::{AccessOwner, SymbolIndex};

/// Ratios this many times the configured minimum escalate to high.
const HIGH_RATIO_FACTOR: f64 = 3.0;

/// Constructors exist to touch collaborator state; skip them.
const SKIPPED: [&str; 3] = ["__init__", "__post_init__", "__new__"];

pub struct FeatureEnvyDetector;

impl SmellDetector for FeatureEnvyDetector {
    fn smell_type(&self) -> SmellType {
        SmellType::FeatureEnvy
    }

    fn detect(&self, index: &SymbolIndex<'_>, thresholds: &Thresholds) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (id, method) in index.methods.iter().enumerate() {
            if method.class.is_none() || SKIPPED.contains(&method.name.as_str()) {
                continue;
            }
            if method.sloc < thresholds.envy_min_sloc {
                continue;
            }

            let mut self_accesses = 0usize;
            let mut foreign_accesses = 0usize;
            for access in index.accesses_of(id) {
                match access.owner {
                    AccessOwner::SelfRef => self_accesses += 1,
                    AccessOwner::Named(_) => foreign_accesses += 1,
                }
            }

            if foreign_accesses < thresholds.envy_min_foreign_accesses {
                continue;
            }
            let ratio = foreign_accesses as f64 / self_accesses.max(1) as f64;
            if ratio < thresholds.envy_min_ratio {
                continue;
            }

            let severity = if ratio >= thresholds.envy_min_ratio * HIGH_RATIO_FACTOR {
                Severity::High
            } else {
                Severity::Medium
            };
            let name = index.qualified_name(method);
            findings.push(Finding {
                smell_type: SmellType::FeatureEnvy,
                severity,
                message: format!(
                    "Method '{name}' accesses other objects {foreign_accesses} times \
                     but its own only {self_accesses}"
                ),
                line_start: method.span.line_start,
                line_end: method.span.line_end,
                details: SmellDetails::FeatureEnvy {
                    method_name: name,
                    foreign_accesses,
                    self_accesses,
                },
            });
        }
        findings
    }
}
