//! Duplicated code detection: pairwise Jaccard similarity over
//! canonical token sets.
//!
//! The only O(n²) detector; the pair comparisons are independent, so
//! they run on the rayon pool and are re-ordered deterministically
//! afterwards.

use super::SmellDetector;
use crate::config::Thresholds;
use crate::core::metrics::{jaccard, token_set};
use crate::core::{Finding, Severity, SmellDetails, SmellType};
use crate::index::{MethodInfo, SymbolIndex};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Similarity at or above this is reported as high regardless of the
/// configured minimum.
const HIGH_SIMILARITY: f64 = 0.95;

pub struct DuplicatedCodeDetector;

impl SmellDetector for DuplicatedCodeDetector {
    fn smell_type(&self) -> SmellType {
        SmellType::DuplicatedCode
    }

    fn detect(&self, index: &SymbolIndex<'_>, thresholds: &Thresholds) -> Vec<Finding> {
        let minimum = thresholds.duplication_similarity;
        let tokens: Vec<_> = index
            .methods
            .iter()
            .map(|method| token_set(method.body))
            .collect();

        // Pair indices in definition order; (i, j) with i < j.
        let pairs: Vec<(usize, usize)> = (0..index.methods.len())
            .flat_map(|i| (i + 1..index.methods.len()).map(move |j| (i, j)))
            .collect();

        let mut matches: Vec<(usize, usize, f64)> = pairs
            .par_iter()
            .filter_map(|&(i, j)| {
                // An empty body is never a duplicate of anything, even
                // with the minimum configured down to 0.0.
                if tokens[i].is_empty() || tokens[j].is_empty() {
                    return None;
                }
                let similarity = jaccard(&tokens[i], &tokens[j]);
                (similarity >= minimum).then_some((i, j, similarity))
            })
            .collect();

        // Descending similarity; stable, so ties keep pair order.
        matches.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));

        matches
            .into_iter()
            .map(|(i, j, similarity)| {
                let first = &index.methods[i];
                let second = &index.methods[j];
                let severity = if similarity >= HIGH_SIMILARITY {
                    Severity::High
                } else {
                    Severity::Medium
                };
                Finding {
                    smell_type: SmellType::DuplicatedCode,
                    severity,
                    message: format!(
                        "'{}' and '{}' are {:.0}% similar",
                        index.qualified_name(first),
                        index.qualified_name(second),
                        similarity * 100.0
                    ),
                    line_start: first.span.line_start,
                    line_end: first.span.line_end,
                    details: SmellDetails::DuplicatedCode {
                        block1_name: index.qualified_name(first),
                        block1_type: block_type(first),
                        block1_start_line: first.span.line_start,
                        block1_end_line: first.span.line_end,
                        block2_name: index.qualified_name(second),
                        block2_type: block_type(second),
                        block2_start_line: second.span.line_start,
                        block2_end_line: second.span.line_end,
                        similarity,
                    },
                }
            })
            .collect()
    }
}

fn block_type(method: &MethodInfo<'_>) -> String {
    if method.class.is_some() {
        "method".to_string()
    } else {
        "function".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::python::parse_module;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn run(source: &str, minimum: f64) -> Vec<Finding> {
        let tree = parse_module(source, "test.py").unwrap();
        let index = SymbolIndex::build(&tree).unwrap();
        let thresholds = Thresholds {
            duplication_similarity: minimum,
            ..Thresholds::default()
        };
        DuplicatedCodeDetector.detect(&index, &thresholds)
    }

    #[test]
    fn renamed_copies_are_identical_token_sets() {
        let findings = run(
            indoc! {r#"
                def total_price(items):
                    result = 0
                    for item in items:
                        result = result + item
                    return result

                def total_weight(boxes):
                    acc = 0
                    for box in boxes:
                        acc = acc + box
                    return acc
            "#},
            0.85,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        match &findings[0].details {
            SmellDetails::DuplicatedCode {
                block1_name,
                block2_name,
                block1_type,
                similarity,
                ..
            } => {
                assert_eq!(block1_name, "total_price");
                assert_eq!(block2_name, "total_weight");
                assert_eq!(block1_type, "function");
                assert_eq!(*similarity, 1.0);
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn dissimilar_bodies_pass() {
        let findings = run(
            indoc! {r#"
                def ask(prompt):
                    while True:
                        answer = prompt

                def flat(x):
                    return x
            "#},
            0.85,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn empty_bodies_are_never_paired() {
        let source = "def a():\n    pass\n\ndef b():\n    pass\n";
        assert!(run(source, 0.5).is_empty());
        // A minimum of 0.0 is valid configuration and would otherwise
        // admit every pair, empty ones included.
        assert!(run(source, 0.0).is_empty());
    }

    #[test]
    fn pairs_are_ordered_by_descending_similarity() {
        let findings = run(
            indoc! {r#"
                def one(items):
                    s = 0
                    for i in items:
                        s = s + i
                    return s

                def two(items):
                    s = 0
                    for i in items:
                        s = s + i
                    return s

                def three(items):
                    s = 1
                    if items:
                        s = s * 2
                    for i in items:
                        s = s + i
                    return s
            "#},
            0.5,
        );
        let similarities: Vec<f64> = findings
            .iter()
            .map(|f| match &f.details {
                SmellDetails::DuplicatedCode { similarity, .. } => *similarity,
                other => panic!("unexpected details: {other:?}"),
            })
            .collect();
        assert!(similarities.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(similarities[0], 1.0);
    }
}
