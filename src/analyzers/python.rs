//! Python parsing collaborator: lowers the `rustpython_parser` AST
//! into the engine's closed [`SyntaxNode`] union with 1-based line
//! spans.
//!
//! Constructs the detectors never look inside (comprehensions, lambda
//! bodies, subscripts, ...) become `Unhandled` nodes that keep their
//! children, so literal and attribute collection still sees them.

use crate::core::ast::{
    BinOpKind, BoolOpKind, CodeLineMask, CompareOpKind, Number, SourceTree, Span, SyntaxNode,
    UnaryOpKind,
};
use crate::core::errors::{Error, Result};
use rustpython_parser::ast::{self, Ranged};
use rustpython_parser::{parse, Mode};

/// Parse Python source into a [`SourceTree`]. `file` labels parse
/// errors only.
pub fn parse_module(source: &str, file: &str) -> Result<SourceTree> {
    let module = parse(source, Mode::Module, file).map_err(|err| Error::Parse {
        file: file.to_string(),
        message: err.to_string(),
    })?;
    let lines = LineIndex::new(source);
    let body = match &module {
        ast::Mod::Module(module) => lower_body(&module.body, &lines),
        _ => {
            return Err(Error::Parse {
                file: file.to_string(),
                message: "expected a module".to_string(),
            })
        }
    };
    let line_count = source.lines().count().max(1);
    Ok(SourceTree {
        root: SyntaxNode::Module {
            body,
            span: Span::new(1, line_count),
        },
        code_lines: CodeLineMask::from_source(source),
    })
}

/// Byte-offset to 1-based line translation.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    fn span(&self, node: &impl Ranged) -> Span {
        let start = node.range().start().to_usize();
        let end = node.range().end().to_usize();
        let line_start = self.line_of(start);
        let line_end = self.line_of(end.saturating_sub(1).max(start));
        Span::new(line_start, line_end.max(line_start))
    }
}

fn lower_body(body: &[ast::Stmt], lines: &LineIndex) -> Vec<SyntaxNode> {
    body.iter().map(|stmt| lower_stmt(stmt, lines)).collect()
}

fn lower_stmt(stmt: &ast::Stmt, lines: &LineIndex) -> SyntaxNode {
    match stmt {
        ast::Stmt::FunctionDef(f) => {
            lower_function(&f.name, &f.args, &f.body, lines.span(f), lines)
        }
        ast::Stmt::AsyncFunctionDef(f) => {
            lower_function(&f.name, &f.args, &f.body, lines.span(f), lines)
        }
        ast::Stmt::ClassDef(c) => SyntaxNode::ClassDef {
            name: c.name.to_string(),
            body: lower_body(&c.body, lines),
            span: lines.span(c),
        },
        ast::Stmt::Return(r) => SyntaxNode::Return {
            value: r
                .value
                .as_deref()
                .map(|value| Box::new(lower_expr(value, lines))),
            span: lines.span(r),
        },
        ast::Stmt::Assign(a) => SyntaxNode::Assign {
            targets: a
                .targets
                .iter()
                .map(|target| lower_expr(target, lines))
                .collect(),
            value: Box::new(lower_expr(&a.value, lines)),
            span: lines.span(a),
        },
        // Annotated assignment with a value behaves like a plain
        // assignment for field extraction.
        ast::Stmt::AnnAssign(a) => match &a.value {
            Some(value) => SyntaxNode::Assign {
                targets: vec![lower_expr(&a.target, lines)],
                value: Box::new(lower_expr(value, lines)),
                span: lines.span(a),
            },
            None => SyntaxNode::Unhandled {
                children: vec![lower_expr(&a.target, lines)],
                span: lines.span(a),
            },
        },
        // Augmented assignment reads before it writes, so it does not
        // define a field; keep target and value visible as children.
        ast::Stmt::AugAssign(a) => SyntaxNode::Unhandled {
            children: vec![lower_expr(&a.target, lines), lower_expr(&a.value, lines)],
            span: lines.span(a),
        },
        ast::Stmt::If(i) => SyntaxNode::If {
            test: Box::new(lower_expr(&i.test, lines)),
            body: lower_body(&i.body, lines),
            orelse: lower_body(&i.orelse, lines),
            span: lines.span(i),
        },
        ast::Stmt::While(w) => SyntaxNode::While {
            test: Box::new(lower_expr(&w.test, lines)),
            body: lower_body(&w.body, lines),
            orelse: lower_body(&w.orelse, lines),
            span: lines.span(w),
        },
        ast::Stmt::For(f) => lower_for(&f.target, &f.iter, &f.body, &f.orelse, lines.span(f), lines),
        ast::Stmt::AsyncFor(f) => {
            lower_for(&f.target, &f.iter, &f.body, &f.orelse, lines.span(f), lines)
        }
        ast::Stmt::With(w) => lower_with(&w.items, &w.body, lines.span(w), lines),
        ast::Stmt::AsyncWith(w) => lower_with(&w.items, &w.body, lines.span(w), lines),
        ast::Stmt::Try(t) => lower_try(&t.body, &t.handlers, &t.orelse, &t.finalbody, lines.span(t), lines),
        ast::Stmt::TryStar(t) => {
            lower_try(&t.body, &t.handlers, &t.orelse, &t.finalbody, lines.span(t), lines)
        }
        ast::Stmt::Expr(e) => lower_expr(&e.value, lines),
        ast::Stmt::Raise(r) => SyntaxNode::Unhandled {
            children: r
                .exc
                .as_deref()
                .into_iter()
                .chain(r.cause.as_deref())
                .map(|expr| lower_expr(expr, lines))
                .collect(),
            span: lines.span(r),
        },
        ast::Stmt::Assert(a) => SyntaxNode::Unhandled {
            children: std::iter::once(&*a.test)
                .chain(a.msg.as_deref())
                .map(|expr| lower_expr(expr, lines))
                .collect(),
            span: lines.span(a),
        },
        ast::Stmt::Delete(d) => SyntaxNode::Unhandled {
            children: d
                .targets
                .iter()
                .map(|expr| lower_expr(expr, lines))
                .collect(),
            span: lines.span(d),
        },
        ast::Stmt::Match(m) => {
            let mut children = vec![lower_expr(&m.subject, lines)];
            for case in &m.cases {
                if let Some(guard) = &case.guard {
                    children.push(lower_expr(guard, lines));
                }
                children.extend(lower_body(&case.body, lines));
            }
            SyntaxNode::Unhandled {
                children,
                span: lines.span(m),
            }
        }
        other => SyntaxNode::Unhandled {
            children: vec![],
            span: lines.span(other),
        },
    }
}

fn lower_function(
    name: &ast::Identifier,
    args: &ast::Arguments,
    body: &[ast::Stmt],
    span: Span,
    lines: &LineIndex,
) -> SyntaxNode {
    SyntaxNode::FunctionDef {
        name: name.to_string(),
        params: param_names(args),
        body: lower_body(body, lines),
        span,
    }
}

fn lower_for(
    target: &ast::Expr,
    iter: &ast::Expr,
    body: &[ast::Stmt],
    orelse: &[ast::Stmt],
    span: Span,
    lines: &LineIndex,
) -> SyntaxNode {
    SyntaxNode::For {
        target: Box::new(lower_expr(target, lines)),
        iter: Box::new(lower_expr(iter, lines)),
        body: lower_body(body, lines),
        orelse: lower_body(orelse, lines),
        span,
    }
}

fn lower_with(
    items: &[ast::WithItem],
    body: &[ast::Stmt],
    span: Span,
    lines: &LineIndex,
) -> SyntaxNode {
    let mut lowered_items = Vec::new();
    for item in items {
        lowered_items.push(lower_expr(&item.context_expr, lines));
        if let Some(vars) = &item.optional_vars {
            lowered_items.push(lower_expr(vars, lines));
        }
    }
    SyntaxNode::With {
        items: lowered_items,
        body: lower_body(body, lines),
        span,
    }
}

fn lower_try(
    body: &[ast::Stmt],
    handlers: &[ast::ExceptHandler],
    orelse: &[ast::Stmt],
    finalbody: &[ast::Stmt],
    span: Span,
    lines: &LineIndex,
) -> SyntaxNode {
    let handlers = handlers
        .iter()
        .map(|handler| {
            let ast::ExceptHandler::ExceptHandler(h) = handler;
            SyntaxNode::ExceptClause {
                body: lower_body(&h.body, lines),
                span: lines.span(h),
            }
        })
        .collect();
    SyntaxNode::Try {
        body: lower_body(body, lines),
        handlers,
        orelse: lower_body(orelse, lines),
        finalbody: lower_body(finalbody, lines),
        span,
    }
}

fn param_names(args: &ast::Arguments) -> Vec<String> {
    let mut names = Vec::new();
    for arg in args.posonlyargs.iter().chain(args.args.iter()) {
        names.push(arg.def.arg.to_string());
    }
    if let Some(vararg) = &args.vararg {
        names.push(format!("*{}", vararg.arg.as_str()));
    }
    for arg in &args.kwonlyargs {
        names.push(arg.def.arg.to_string());
    }
    if let Some(kwarg) = &args.kwarg {
        names.push(format!("**{}", kwarg.arg.as_str()));
    }
    names
}

fn lower_expr(expr: &ast::Expr, lines: &LineIndex) -> SyntaxNode {
    let span = lines.span(expr);
    match expr {
        ast::Expr::BoolOp(b) => SyntaxNode::BoolOp {
            op: match b.op {
                ast::BoolOp::And => BoolOpKind::And,
                ast::BoolOp::Or => BoolOpKind::Or,
            },
            operands: b
                .values
                .iter()
                .map(|value| lower_expr(value, lines))
                .collect(),
            span,
        },
        ast::Expr::BinOp(b) => SyntaxNode::BinOp {
            op: lower_operator(b.op),
            left: Box::new(lower_expr(&b.left, lines)),
            right: Box::new(lower_expr(&b.right, lines)),
            span,
        },
        ast::Expr::UnaryOp(u) => {
            let operand = lower_expr(&u.operand, lines);
            // `-1` parses as unary minus over a literal; fold it so the
            // exempt set can see negative values.
            if let (ast::UnaryOp::USub, SyntaxNode::NumberLiteral { value, .. }) =
                (u.op, &operand)
            {
                return SyntaxNode::NumberLiteral {
                    value: value.negated(),
                    span,
                };
            }
            SyntaxNode::UnaryOp {
                op: match u.op {
                    ast::UnaryOp::Not => UnaryOpKind::Not,
                    ast::UnaryOp::USub => UnaryOpKind::Neg,
                    ast::UnaryOp::UAdd => UnaryOpKind::Pos,
                    ast::UnaryOp::Invert => UnaryOpKind::Invert,
                },
                operand: Box::new(operand),
                span,
            }
        }
        ast::Expr::Compare(c) => SyntaxNode::Compare {
            left: Box::new(lower_expr(&c.left, lines)),
            ops: c.ops.iter().map(|op| lower_cmp_op(*op)).collect(),
            comparators: c
                .comparators
                .iter()
                .map(|comparator| lower_expr(comparator, lines))
                .collect(),
            span,
        },
        ast::Expr::Call(c) => {
            let mut args: Vec<SyntaxNode> = c
                .args
                .iter()
                .map(|arg| lower_expr(arg, lines))
                .collect();
            args.extend(
                c.keywords
                    .iter()
                    .map(|keyword| lower_expr(&keyword.value, lines)),
            );
            SyntaxNode::Call {
                callee: Box::new(lower_expr(&c.func, lines)),
                args,
                span,
            }
        }
        ast::Expr::Attribute(a) => SyntaxNode::Attribute {
            owner: Box::new(lower_expr(&a.value, lines)),
            attr: a.attr.to_string(),
            span,
        },
        ast::Expr::Name(n) => SyntaxNode::Name {
            id: n.id.to_string(),
            span,
        },
        ast::Expr::Constant(c) => lower_constant(&c.value, span),
        ast::Expr::Subscript(s) => SyntaxNode::Unhandled {
            children: vec![lower_expr(&s.value, lines), lower_expr(&s.slice, lines)],
            span,
        },
        ast::Expr::Starred(s) => SyntaxNode::Unhandled {
            children: vec![lower_expr(&s.value, lines)],
            span,
        },
        ast::Expr::Tuple(t) => lower_sequence(&t.elts, span, lines),
        ast::Expr::List(l) => lower_sequence(&l.elts, span, lines),
        ast::Expr::Set(s) => lower_sequence(&s.elts, span, lines),
        ast::Expr::Dict(d) => SyntaxNode::Unhandled {
            children: d
                .keys
                .iter()
                .flatten()
                .chain(d.values.iter())
                .map(|expr| lower_expr(expr, lines))
                .collect(),
            span,
        },
        ast::Expr::IfExp(i) => SyntaxNode::Unhandled {
            children: vec![
                lower_expr(&i.test, lines),
                lower_expr(&i.body, lines),
                lower_expr(&i.orelse, lines),
            ],
            span,
        },
        ast::Expr::NamedExpr(n) => SyntaxNode::Unhandled {
            children: vec![lower_expr(&n.target, lines), lower_expr(&n.value, lines)],
            span,
        },
        ast::Expr::Lambda(l) => SyntaxNode::Unhandled {
            children: vec![lower_expr(&l.body, lines)],
            span,
        },
        ast::Expr::Await(a) => SyntaxNode::Unhandled {
            children: vec![lower_expr(&a.value, lines)],
            span,
        },
        ast::Expr::Yield(y) => SyntaxNode::Unhandled {
            children: y
                .value
                .as_deref()
                .map(|value| vec![lower_expr(value, lines)])
                .unwrap_or_default(),
            span,
        },
        ast::Expr::YieldFrom(y) => SyntaxNode::Unhandled {
            children: vec![lower_expr(&y.value, lines)],
            span,
        },
        ast::Expr::ListComp(c) => lower_comprehension(&[&c.elt], &c.generators, span, lines),
        ast::Expr::SetComp(c) => lower_comprehension(&[&c.elt], &c.generators, span, lines),
        ast::Expr::GeneratorExp(c) => lower_comprehension(&[&c.elt], &c.generators, span, lines),
        ast::Expr::DictComp(c) => {
            lower_comprehension(&[&c.key, &c.value], &c.generators, span, lines)
        }
        ast::Expr::FormattedValue(f) => SyntaxNode::Unhandled {
            children: vec![lower_expr(&f.value, lines)],
            span,
        },
        ast::Expr::JoinedStr(j) => SyntaxNode::Unhandled {
            children: j
                .values
                .iter()
                .map(|value| lower_expr(value, lines))
                .collect(),
            span,
        },
        ast::Expr::Slice(s) => SyntaxNode::Unhandled {
            children: [s.lower.as_deref(), s.upper.as_deref(), s.step.as_deref()]
                .into_iter()
                .flatten()
                .map(|expr| lower_expr(expr, lines))
                .collect(),
            span,
        },
    }
}

fn lower_sequence(elts: &[ast::Expr], span: Span, lines: &LineIndex) -> SyntaxNode {
    SyntaxNode::Unhandled {
        children: elts.iter().map(|elt| lower_expr(elt, lines)).collect(),
        span,
    }
}

fn lower_comprehension(
    elts: &[&ast::Expr],
    generators: &[ast::Comprehension],
    span: Span,
    lines: &LineIndex,
) -> SyntaxNode {
    let mut children: Vec<SyntaxNode> =
        elts.iter().map(|elt| lower_expr(elt, lines)).collect();
    for generator in generators {
        children.push(lower_expr(&generator.target, lines));
        children.push(lower_expr(&generator.iter, lines));
        children.extend(generator.ifs.iter().map(|cond| lower_expr(cond, lines)));
    }
    SyntaxNode::Unhandled { children, span }
}

fn lower_constant(constant: &ast::Constant, span: Span) -> SyntaxNode {
    match constant {
        ast::Constant::Int(value) => {
            // BigInt; round-trip through the decimal form so huge
            // literals degrade to floats instead of failing.
            let text = value.to_string();
            match text.parse::<i64>() {
                Ok(int) => SyntaxNode::NumberLiteral {
                    value: Number::Int(int),
                    span,
                },
                Err(_) => match text.parse::<f64>() {
                    Ok(float) => SyntaxNode::NumberLiteral {
                        value: Number::Float(float),
                        span,
                    },
                    Err(_) => SyntaxNode::Unhandled {
                        children: vec![],
                        span,
                    },
                },
            }
        }
        ast::Constant::Float(value) => SyntaxNode::NumberLiteral {
            value: Number::Float(*value),
            span,
        },
        ast::Constant::Str(_) => SyntaxNode::StringLiteral { span },
        _ => SyntaxNode::Unhandled {
            children: vec![],
            span,
        },
    }
}

fn lower_operator(op: ast::Operator) -> BinOpKind {
    match op {
        ast::Operator::Add => BinOpKind::Add,
        ast::Operator::Sub => BinOpKind::Sub,
        ast::Operator::Mult => BinOpKind::Mult,
        ast::Operator::MatMult => BinOpKind::MatMult,
        ast::Operator::Div => BinOpKind::Div,
        ast::Operator::Mod => BinOpKind::Mod,
        ast::Operator::Pow => BinOpKind::Pow,
        ast::Operator::LShift => BinOpKind::LShift,
        ast::Operator::RShift => BinOpKind::RShift,
        ast::Operator::BitOr => BinOpKind::BitOr,
        ast::Operator::BitXor => BinOpKind::BitXor,
        ast::Operator::BitAnd => BinOpKind::BitAnd,
        ast::Operator::FloorDiv => BinOpKind::FloorDiv,
    }
}

fn lower_cmp_op(op: ast::CmpOp) -> CompareOpKind {
    match op {
        ast::CmpOp::Eq => CompareOpKind::Eq,
        ast::CmpOp::NotEq => CompareOpKind::NotEq,
        ast::CmpOp::Lt => CompareOpKind::Lt,
        ast::CmpOp::LtE => CompareOpKind::LtE,
        ast::CmpOp::Gt => CompareOpKind::Gt,
        ast::CmpOp::GtE => CompareOpKind::GtE,
        ast::CmpOp::Is => CompareOpKind::Is,
        ast::CmpOp::IsNot => CompareOpKind::IsNot,
        ast::CmpOp::In => CompareOpKind::In,
        ast::CmpOp::NotIn => CompareOpKind::NotIn,
    }
}
