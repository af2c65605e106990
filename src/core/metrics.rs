//! Metric library: pure functions over the syntax tree, reusable
//! across detectors.

use crate::core::ast::{CodeLineMask, Span, SyntaxNode};
use std::collections::BTreeSet;

/// Source lines of code spanned by `span`: non-blank, non-comment
/// lines only.
pub fn sloc(span: Span, code_lines: &CodeLineMask) -> usize {
    code_lines.count_in(span)
}

/// Cyclomatic complexity of a statement body: base 1, +1 per
/// `if`/`while`/`for`/`except` clause, +(N−1) per boolean operator
/// combining N operands.
pub fn cyclomatic(body: &[SyntaxNode]) -> u32 {
    let mut complexity = 1;
    for stmt in body {
        stmt.walk(&mut |node| {
            complexity += branch_weight(node);
        });
    }
    complexity
}

fn branch_weight(node: &SyntaxNode) -> u32 {
    match node {
        SyntaxNode::If { .. }
        | SyntaxNode::While { .. }
        | SyntaxNode::For { .. }
        | SyntaxNode::ExceptClause { .. } => 1,
        SyntaxNode::BoolOp { operands, .. } => operands.len().saturating_sub(1) as u32,
        _ => 0,
    }
}

/// Canonical token set of a statement body. Keyword kinds and operator
/// symbols survive; identifier names and literal values are normalized
/// to generic placeholders, so structurally similar but textually
/// different code still matches.
pub fn token_set(body: &[SyntaxNode]) -> BTreeSet<&'static str> {
    let mut tokens = BTreeSet::new();
    for stmt in body {
        stmt.walk(&mut |node| collect_tokens(node, &mut tokens));
    }
    tokens
}

fn collect_tokens(node: &SyntaxNode, tokens: &mut BTreeSet<&'static str>) {
    match node {
        SyntaxNode::Module { .. } | SyntaxNode::Unhandled { .. } => {}
        SyntaxNode::ClassDef { .. } => {
            tokens.insert("class");
            tokens.insert("ID");
        }
        SyntaxNode::FunctionDef { .. } => {
            tokens.insert("def");
            tokens.insert("ID");
        }
        SyntaxNode::If { .. } => {
            tokens.insert("if");
        }
        SyntaxNode::While { .. } => {
            tokens.insert("while");
        }
        SyntaxNode::For { .. } => {
            tokens.insert("for");
            tokens.insert("in");
        }
        SyntaxNode::Try { .. } => {
            tokens.insert("try");
        }
        SyntaxNode::ExceptClause { .. } => {
            tokens.insert("except");
        }
        SyntaxNode::With { .. } => {
            tokens.insert("with");
        }
        SyntaxNode::Return { .. } => {
            tokens.insert("return");
        }
        SyntaxNode::Assign { .. } => {
            tokens.insert("=");
        }
        SyntaxNode::BoolOp { op, .. } => {
            tokens.insert(op.symbol());
        }
        SyntaxNode::BinOp { op, .. } => {
            tokens.insert(op.symbol());
        }
        SyntaxNode::UnaryOp { op, .. } => {
            tokens.insert(op.symbol());
        }
        SyntaxNode::Compare { ops, .. } => {
            for op in ops {
                tokens.insert(op.symbol());
            }
        }
        SyntaxNode::Call { .. } => {
            tokens.insert("()");
        }
        SyntaxNode::Attribute { .. } => {
            tokens.insert(".");
            tokens.insert("ID");
        }
        SyntaxNode::Name { .. } => {
            tokens.insert("ID");
        }
        SyntaxNode::NumberLiteral { .. } => {
            tokens.insert("NUM");
        }
        SyntaxNode::StringLiteral { .. } => {
            tokens.insert("STR");
        }
    }
}

/// Jaccard similarity |A∩B| / |A∪B|. Empty-either pairs score 0.
pub fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::{BoolOpKind, Number};

    fn name(id: &str) -> SyntaxNode {
        SyntaxNode::Name {
            id: id.into(),
            span: Span::new(1, 1),
        }
    }

    #[test]
    fn cyclomatic_counts_branches_and_boolean_operands() {
        let body = vec![SyntaxNode::If {
            test: Box::new(SyntaxNode::BoolOp {
                op: BoolOpKind::And,
                operands: vec![name("a"), name("b"), name("c")],
                span: Span::new(1, 1),
            }),
            body: vec![SyntaxNode::While {
                test: Box::new(name("d")),
                body: vec![name("e")],
                orelse: vec![],
                span: Span::new(2, 3),
            }],
            orelse: vec![],
            span: Span::new(1, 3),
        }];
        // 1 base + if + while + (3-1) boolean operands
        assert_eq!(cyclomatic(&body), 5);
    }

    #[test]
    fn cyclomatic_of_straight_line_code_is_one() {
        let body = vec![SyntaxNode::Assign {
            targets: vec![name("x")],
            value: Box::new(SyntaxNode::NumberLiteral {
                value: Number::Int(5),
                span: Span::new(1, 1),
            }),
            span: Span::new(1, 1),
        }];
        assert_eq!(cyclomatic(&body), 1);
    }

    #[test]
    fn token_set_normalizes_names_and_literals() {
        let a = vec![SyntaxNode::Assign {
            targets: vec![name("total")],
            value: Box::new(SyntaxNode::NumberLiteral {
                value: Number::Int(5),
                span: Span::new(1, 1),
            }),
            span: Span::new(1, 1),
        }];
        let b = vec![SyntaxNode::Assign {
            targets: vec![name("count")],
            value: Box::new(SyntaxNode::NumberLiteral {
                value: Number::Float(0.25),
                span: Span::new(9, 9),
            }),
            span: Span::new(9, 9),
        }];
        assert_eq!(token_set(&a), token_set(&b));
        assert_eq!(jaccard(&token_set(&a), &token_set(&b)), 1.0);
    }

    #[test]
    fn jaccard_is_zero_for_empty_sets() {
        let empty = BTreeSet::new();
        let mut other = BTreeSet::new();
        other.insert("if");
        assert_eq!(jaccard(&empty, &other), 0.0);
        assert_eq!(jaccard(&empty, &empty), 0.0);
    }
}
