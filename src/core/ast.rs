//! Engine-owned syntax tree.
//!
//! The parser collaborator lowers its own AST into this closed tagged
//! union, so the engine never depends on parser types. Every node kind
//! the detectors care about gets an explicit variant; anything else is
//! lowered to `Unhandled`, which still exposes its children so a
//! traversal never silently skips a subtree.

use serde::{Deserialize, Serialize};

/// Inclusive 1-based line range of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line_start: usize,
    pub line_end: usize,
}

impl Span {
    pub fn new(line_start: usize, line_end: usize) -> Self {
        Self {
            line_start,
            line_end,
        }
    }
}

/// Numeric literal value. Integer and float literals that compare equal
/// group together, matching Python number semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Canonical grouping key for [`Number`]: floats with an exact integer
/// value share a key with that integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumberKey {
    Int(i64),
    Bits(u64),
}

impl Number {
    pub fn key(&self) -> NumberKey {
        match *self {
            Number::Int(i) => NumberKey::Int(i),
            Number::Float(f) => {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    NumberKey::Int(f as i64)
                } else {
                    NumberKey::Bits(f.to_bits())
                }
            }
        }
    }

    /// Values that never count as magic numbers.
    pub fn is_exempt(&self) -> bool {
        matches!(self.key(), NumberKey::Int(-1..=1))
    }

    pub fn negated(&self) -> Number {
        match *self {
            Number::Int(i) => Number::Int(-i),
            Number::Float(f) => Number::Float(-f),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::Int(i) => serializer.serialize_i64(i),
            Number::Float(f) => serializer.serialize_f64(f),
        }
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NumberVisitor;

        impl serde::de::Visitor<'_> for NumberVisitor {
            type Value = Number;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a numeric literal")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Number, E> {
                Ok(Number::Int(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Number, E> {
                i64::try_from(v)
                    .map(Number::Int)
                    .or(Ok(Number::Float(v as f64)))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Number, E> {
                Ok(Number::Float(v))
            }
        }

        deserializer.deserialize_any(NumberVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOpKind {
    And,
    Or,
}

impl BoolOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            BoolOpKind::And => "and",
            BoolOpKind::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOpKind {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

impl BinOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mult => "*",
            BinOpKind::MatMult => "@",
            BinOpKind::Div => "/",
            BinOpKind::Mod => "%",
            BinOpKind::Pow => "**",
            BinOpKind::LShift => "<<",
            BinOpKind::RShift => ">>",
            BinOpKind::BitOr => "|",
            BinOpKind::BitXor => "^",
            BinOpKind::BitAnd => "&",
            BinOpKind::FloorDiv => "//",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOpKind {
    Not,
    Neg,
    Pos,
    Invert,
}

impl UnaryOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOpKind::Not => "not",
            UnaryOpKind::Neg => "-",
            UnaryOpKind::Pos => "+",
            UnaryOpKind::Invert => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOpKind {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CompareOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOpKind::Eq => "==",
            CompareOpKind::NotEq => "!=",
            CompareOpKind::Lt => "<",
            CompareOpKind::LtE => "<=",
            CompareOpKind::Gt => ">",
            CompareOpKind::GtE => ">=",
            CompareOpKind::Is => "is",
            CompareOpKind::IsNot => "is not",
            CompareOpKind::In => "in",
            CompareOpKind::NotIn => "not in",
        }
    }
}

/// Closed union over the node kinds the detectors recognize.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    Module {
        body: Vec<SyntaxNode>,
        span: Span,
    },
    ClassDef {
        name: String,
        body: Vec<SyntaxNode>,
        span: Span,
    },
    FunctionDef {
        name: String,
        params: Vec<String>,
        body: Vec<SyntaxNode>,
        span: Span,
    },
    If {
        test: Box<SyntaxNode>,
        body: Vec<SyntaxNode>,
        orelse: Vec<SyntaxNode>,
        span: Span,
    },
    While {
        test: Box<SyntaxNode>,
        body: Vec<SyntaxNode>,
        orelse: Vec<SyntaxNode>,
        span: Span,
    },
    For {
        target: Box<SyntaxNode>,
        iter: Box<SyntaxNode>,
        body: Vec<SyntaxNode>,
        orelse: Vec<SyntaxNode>,
        span: Span,
    },
    Try {
        body: Vec<SyntaxNode>,
        handlers: Vec<SyntaxNode>,
        orelse: Vec<SyntaxNode>,
        finalbody: Vec<SyntaxNode>,
        span: Span,
    },
    ExceptClause {
        body: Vec<SyntaxNode>,
        span: Span,
    },
    With {
        items: Vec<SyntaxNode>,
        body: Vec<SyntaxNode>,
        span: Span,
    },
    Return {
        value: Option<Box<SyntaxNode>>,
        span: Span,
    },
    Assign {
        targets: Vec<SyntaxNode>,
        value: Box<SyntaxNode>,
        span: Span,
    },
    BoolOp {
        op: BoolOpKind,
        operands: Vec<SyntaxNode>,
        span: Span,
    },
    BinOp {
        op: BinOpKind,
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
        span: Span,
    },
    UnaryOp {
        op: UnaryOpKind,
        operand: Box<SyntaxNode>,
        span: Span,
    },
    Compare {
        left: Box<SyntaxNode>,
        ops: Vec<CompareOpKind>,
        comparators: Vec<SyntaxNode>,
        span: Span,
    },
    Call {
        callee: Box<SyntaxNode>,
        args: Vec<SyntaxNode>,
        span: Span,
    },
    Attribute {
        owner: Box<SyntaxNode>,
        attr: String,
        span: Span,
    },
    Name {
        id: String,
        span: Span,
    },
    NumberLiteral {
        value: Number,
        span: Span,
    },
    StringLiteral {
        span: Span,
    },
    Unhandled {
        children: Vec<SyntaxNode>,
        span: Span,
    },
}

impl SyntaxNode {
    pub fn span(&self) -> Span {
        match self {
            SyntaxNode::Module { span, .. }
            | SyntaxNode::ClassDef { span, .. }
            | SyntaxNode::FunctionDef { span, .. }
            | SyntaxNode::If { span, .. }
            | SyntaxNode::While { span, .. }
            | SyntaxNode::For { span, .. }
            | SyntaxNode::Try { span, .. }
            | SyntaxNode::ExceptClause { span, .. }
            | SyntaxNode::With { span, .. }
            | SyntaxNode::Return { span, .. }
            | SyntaxNode::Assign { span, .. }
            | SyntaxNode::BoolOp { span, .. }
            | SyntaxNode::BinOp { span, .. }
            | SyntaxNode::UnaryOp { span, .. }
            | SyntaxNode::Compare { span, .. }
            | SyntaxNode::Call { span, .. }
            | SyntaxNode::Attribute { span, .. }
            | SyntaxNode::Name { span, .. }
            | SyntaxNode::NumberLiteral { span, .. }
            | SyntaxNode::StringLiteral { span, .. }
            | SyntaxNode::Unhandled { span, .. } => *span,
        }
    }

    /// Visit every direct child. The match is exhaustive on purpose: a
    /// new variant does not compile until traversal handles it.
    pub fn for_each_child<'a>(&'a self, f: &mut impl FnMut(&'a SyntaxNode)) {
        match self {
            SyntaxNode::Module { body, .. }
            | SyntaxNode::ClassDef { body, .. }
            | SyntaxNode::FunctionDef { body, .. }
            | SyntaxNode::ExceptClause { body, .. } => body.iter().for_each(f),
            SyntaxNode::If {
                test, body, orelse, ..
            }
            | SyntaxNode::While {
                test, body, orelse, ..
            } => {
                f(test);
                body.iter().for_each(&mut *f);
                orelse.iter().for_each(f);
            }
            SyntaxNode::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                f(target);
                f(iter);
                body.iter().for_each(&mut *f);
                orelse.iter().for_each(f);
            }
            SyntaxNode::Try {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            } => {
                body.iter().for_each(&mut *f);
                handlers.iter().for_each(&mut *f);
                orelse.iter().for_each(&mut *f);
                finalbody.iter().for_each(f);
            }
            SyntaxNode::With { items, body, .. } => {
                items.iter().for_each(&mut *f);
                body.iter().for_each(f);
            }
            SyntaxNode::Return { value, .. } => {
                if let Some(value) = value {
                    f(value);
                }
            }
            SyntaxNode::Assign { targets, value, .. } => {
                targets.iter().for_each(&mut *f);
                f(value);
            }
            SyntaxNode::BoolOp { operands, .. } => operands.iter().for_each(f),
            SyntaxNode::BinOp { left, right, .. } => {
                f(left);
                f(right);
            }
            SyntaxNode::UnaryOp { operand, .. } => f(operand),
            SyntaxNode::Compare {
                left, comparators, ..
            } => {
                f(left);
                comparators.iter().for_each(f);
            }
            SyntaxNode::Call { callee, args, .. } => {
                f(callee);
                args.iter().for_each(f);
            }
            SyntaxNode::Attribute { owner, .. } => f(owner),
            SyntaxNode::Unhandled { children, .. } => children.iter().for_each(f),
            SyntaxNode::Name { .. }
            | SyntaxNode::NumberLiteral { .. }
            | SyntaxNode::StringLiteral { .. } => {}
        }
    }

    /// Depth-first preorder walk over this node and all descendants.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a SyntaxNode)) {
        f(self);
        self.for_each_child(&mut |child| child.walk(f));
    }
}

/// Per-line mask of which source lines carry code (non-blank,
/// non-comment). Built by the parser, consumed by the SLOC metric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeLineMask {
    lines: Vec<bool>,
}

impl CodeLineMask {
    pub fn from_source(source: &str) -> Self {
        let lines = source
            .lines()
            .map(|line| {
                let trimmed = line.trim();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            })
            .collect();
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_code(&self, line: usize) -> bool {
        line >= 1 && self.lines.get(line - 1).copied().unwrap_or(false)
    }

    /// Count code lines inside an inclusive span.
    pub fn count_in(&self, span: Span) -> usize {
        (span.line_start..=span.line_end)
            .filter(|&line| self.is_code(line))
            .count()
    }
}

/// Output of the parsing collaborator: the lowered tree plus the line
/// mask the SLOC metric needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTree {
    pub root: SyntaxNode,
    pub code_lines: CodeLineMask,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_grouping_treats_equal_int_and_float_alike() {
        assert_eq!(Number::Int(2).key(), Number::Float(2.0).key());
        assert_ne!(Number::Int(2).key(), Number::Float(2.5).key());
    }

    #[test]
    fn exempt_values_cover_float_forms() {
        assert!(Number::Int(0).is_exempt());
        assert!(Number::Int(1).is_exempt());
        assert!(Number::Int(-1).is_exempt());
        assert!(Number::Float(0.0).is_exempt());
        assert!(Number::Float(-1.0).is_exempt());
        assert!(!Number::Int(2).is_exempt());
        assert!(!Number::Float(0.9).is_exempt());
    }

    #[test]
    fn code_line_mask_skips_blank_and_comment_lines() {
        let mask = CodeLineMask::from_source("x = 1\n\n# comment\n    y = 2\n");
        assert!(mask.is_code(1));
        assert!(!mask.is_code(2));
        assert!(!mask.is_code(3));
        assert!(mask.is_code(4));
        assert_eq!(mask.count_in(Span::new(1, 4)), 2);
    }

    #[test]
    fn walk_reaches_nested_children() {
        let tree = SyntaxNode::If {
            test: Box::new(SyntaxNode::Name {
                id: "flag".into(),
                span: Span::new(1, 1),
            }),
            body: vec![SyntaxNode::NumberLiteral {
                value: Number::Int(7),
                span: Span::new(2, 2),
            }],
            orelse: vec![],
            span: Span::new(1, 2),
        };
        let mut seen = 0;
        tree.walk(&mut |_| seen += 1);
        assert_eq!(seen, 3);
    }
}
