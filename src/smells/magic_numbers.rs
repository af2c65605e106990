//! Magic number detection: repeated numeric literals outside the
//! exempt set {-1, 0, 1}.

use super::SmellDetector;
use crate::config::Thresholds;
use crate::core::{Finding, NumberKey, Severity, SmellDetails, SmellType};
use crate::index::SymbolIndex;
use std::collections::BTreeMap;

pub struct MagicNumbersDetector;

impl SmellDetector for MagicNumbersDetector {
    fn smell_type(&self) -> SmellType {
        SmellType::MagicNumbers
    }

    fn detect(&self, index: &SymbolIndex<'_>, thresholds: &Thresholds) -> Vec<Finding> {
        let limit = thresholds.magic_number_occurrences;

        // Group by canonical value; 2 and 2.0 share a bucket. Keys are
        // kept in first-occurrence order so findings come out by the
        // line a value first appears on, not by magnitude.
        let mut groups: BTreeMap<NumberKey, Vec<&crate::index::LiteralOccurrence>> =
            BTreeMap::new();
        let mut order: Vec<NumberKey> = Vec::new();
        for literal in &index.literals {
            if literal.value.is_exempt() {
                continue;
            }
            let key = literal.value.key();
            let group = groups.entry(key).or_default();
            if group.is_empty() {
                order.push(key);
            }
            group.push(literal);
        }

        let mut findings = Vec::new();
        for key in order {
            let occurrences = &groups[&key];
            let count = occurrences.len();
            if count < limit {
                continue;
            }
            let severity = if count >= limit * 2 {
                Severity::High
            } else {
                Severity::Medium
            };
            let value = occurrences[0].value;
            let mut locations: Vec<usize> = occurrences.iter().map(|o| o.line).collect();
            locations.sort_unstable();
            findings.push(Finding {
                smell_type: SmellType::MagicNumbers,
                severity,
                message: format!("Number {value} appears {count} times; name it as a constant"),
                line_start: locations[0],
                line_end: locations[locations.len() - 1],
                details: SmellDetails::MagicNumbers {
                    number: value,
                    occurrences: count,
                    locations,
                    threshold: limit,
                },
            });
        }
        findings
    }
}
