//! God class detection: classes that concentrate too many methods or
//! fields.

use super::SmellDetector;
use crate::config::Thresholds;
use crate::core::{Finding, Severity, SmellDetails, SmellType};
use crate::index::SymbolIndex;

pub struct GodClassDetector;

impl SmellDetector for GodClassDetector {
    fn smell_type(&self) -> SmellType {
        SmellType::GodClass
    }

    fn detect(&self, index: &SymbolIndex<'_>, thresholds: &Thresholds) -> Vec<Finding> {
        let method_limit = thresholds.god_class_methods;
        let field_limit = thresholds.god_class_fields;
        let mut findings = Vec::new();

        for class in &index.classes {
            let method_count = class.methods.len();
            let field_count = class.fields.len();
            let methods_over = method_count > method_limit;
            let fields_over = field_count > field_limit;
            if !methods_over && !fields_over {
                continue;
            }

            let severity = if methods_over && fields_over {
                Severity::High
            } else {
                Severity::Medium
            };

            findings.push(Finding {
                smell_type: SmellType::GodClass,
                severity,
                message: format!(
                    "Class '{}' is doing too much: {method_count} methods \
                     (limit {method_limit}), {field_count} fields (limit {field_limit})",
                    class.name
                ),
                line_start: class.span.line_start,
                line_end: class.span.line_end,
                details: SmellDetails::GodClass {
                    class_name: class.name.clone(),
                    method_count,
                    field_count,
                    coupling: class.coupled_types.len(),
                    method_threshold: method_limit,
                    field_threshold: field_limit,
                },
            });
        }
        findings
    }
}
