//! Symbol index: one forward traversal of the syntax tree extracting
//! classes, methods, numeric literals, and attribute accesses.
//!
//! The index borrows the tree for the duration of a run and is
//! discarded with the report; nothing is cached across runs.

use crate::core::ast::{CodeLineMask, Number, SourceTree, Span, SyntaxNode};
use crate::core::errors::{Error, Result};
use crate::core::metrics;
use std::collections::BTreeSet;

pub type ClassId = usize;
pub type MethodId = usize;

/// Method names whose top-level `self.<field> = ...` assignments
/// define instance fields.
const INIT_LIKE: [&str; 3] = ["__init__", "__post_init__", "__new__"];

/// Receiver names excluded from parameter lists of class methods.
const RECEIVERS: [&str; 2] = ["self", "cls"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub span: Span,
    /// Methods defined directly in the class body, in source order.
    pub methods: Vec<MethodId>,
    /// Instance fields assigned at the top level of init-like methods.
    pub fields: BTreeSet<String>,
    /// Distinct non-self attribute owners referenced within the class.
    pub coupled_types: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo<'a> {
    pub name: String,
    /// Nearest enclosing class, if any.
    pub class: Option<ClassId>,
    pub span: Span,
    /// Parameter names, excluding an implicit receiver.
    pub params: Vec<String>,
    pub body: &'a [SyntaxNode],
    /// Memoized at build time, computed once per run.
    pub sloc: usize,
    pub cyclomatic: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessOwner {
    SelfRef,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeAccess {
    pub owner: AccessOwner,
    pub attribute: String,
    pub line: usize,
    pub method: Option<MethodId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralOccurrence {
    pub value: Number,
    pub line: usize,
    pub method: Option<MethodId>,
}

#[derive(Debug, Default)]
pub struct SymbolIndex<'a> {
    pub classes: Vec<ClassInfo>,
    pub methods: Vec<MethodInfo<'a>>,
    pub literals: Vec<LiteralOccurrence>,
    pub attribute_accesses: Vec<AttributeAccess>,
}

impl<'a> SymbolIndex<'a> {
    pub fn build(tree: &'a SourceTree) -> Result<SymbolIndex<'a>> {
        let mut builder = Builder {
            index: SymbolIndex::default(),
            code_lines: &tree.code_lines,
        };
        builder.visit(&tree.root, Context::default())?;
        Ok(builder.index)
    }

    /// Attribute accesses recorded inside one method body.
    pub fn accesses_of(&self, method: MethodId) -> impl Iterator<Item = &AttributeAccess> {
        self.attribute_accesses
            .iter()
            .filter(move |access| access.method == Some(method))
    }

    /// `Class.method` label for messages, or the bare name for
    /// module-level functions.
    pub fn qualified_name(&self, method: &MethodInfo<'_>) -> String {
        match method.class {
            Some(class) => format!("{}.{}", self.classes[class].name, method.name),
            None => method.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Context {
    class: Option<ClassId>,
    method: Option<MethodId>,
    /// True only for statements directly inside a class body.
    class_direct: bool,
}

struct Builder<'a, 'm> {
    index: SymbolIndex<'a>,
    code_lines: &'m CodeLineMask,
}

impl<'a> Builder<'a, '_> {
    fn visit(&mut self, node: &'a SyntaxNode, ctx: Context) -> Result<()> {
        match node {
            SyntaxNode::ClassDef { name, body, span } => {
                let id = self.index.classes.len();
                self.index.classes.push(ClassInfo {
                    name: name.clone(),
                    span: *span,
                    methods: Vec::new(),
                    fields: BTreeSet::new(),
                    coupled_types: BTreeSet::new(),
                });
                let inner = Context {
                    class: Some(id),
                    method: ctx.method,
                    class_direct: true,
                };
                for stmt in body {
                    self.visit(stmt, inner)?;
                }
                Ok(())
            }
            SyntaxNode::FunctionDef {
                name,
                params,
                body,
                span,
            } => self.visit_function(name, params, body, *span, ctx),
            SyntaxNode::NumberLiteral { value, span } => {
                self.index.literals.push(LiteralOccurrence {
                    value: *value,
                    line: span.line_start,
                    method: ctx.method,
                });
                Ok(())
            }
            SyntaxNode::Attribute { owner, attr, span } => {
                if let SyntaxNode::Name { id, .. } = owner.as_ref() {
                    let owner = if id == "self" {
                        AccessOwner::SelfRef
                    } else {
                        if let Some(class) = ctx.class {
                            self.index.classes[class].coupled_types.insert(id.clone());
                        }
                        AccessOwner::Named(id.clone())
                    };
                    self.index.attribute_accesses.push(AttributeAccess {
                        owner,
                        attribute: attr.clone(),
                        line: span.line_start,
                        method: ctx.method,
                    });
                    Ok(())
                } else {
                    self.visit_children(node, ctx)
                }
            }
            SyntaxNode::Assign { targets, span, .. } => {
                if targets.is_empty() {
                    return Err(Error::structural(format!(
                        "assignment without targets at line {}",
                        span.line_start
                    )));
                }
                self.visit_children(node, ctx)
            }
            SyntaxNode::BoolOp { operands, span, .. } => {
                if operands.len() < 2 {
                    return Err(Error::structural(format!(
                        "boolean operator with {} operand(s) at line {}",
                        operands.len(),
                        span.line_start
                    )));
                }
                self.visit_children(node, ctx)
            }
            SyntaxNode::Compare {
                ops,
                comparators,
                span,
                ..
            } => {
                if comparators.is_empty() || ops.len() != comparators.len() {
                    return Err(Error::structural(format!(
                        "comparison with mismatched operands at line {}",
                        span.line_start
                    )));
                }
                self.visit_children(node, ctx)
            }
            _ => self.visit_children(node, ctx),
        }
    }

    fn visit_children(&mut self, node: &'a SyntaxNode, ctx: Context) -> Result<()> {
        let ctx = Context {
            class_direct: false,
            ..ctx
        };
        let mut children = Vec::new();
        node.for_each_child(&mut |child| children.push(child));
        for child in children {
            self.visit(child, ctx)?;
        }
        Ok(())
    }

    fn visit_function(
        &mut self,
        name: &str,
        params: &[String],
        body: &'a [SyntaxNode],
        span: Span,
        ctx: Context,
    ) -> Result<()> {
        let id = self.index.methods.len();
        let params: Vec<String> = if ctx.class_direct {
            params
                .iter()
                .enumerate()
                .filter(|(i, p)| !(*i == 0 && RECEIVERS.contains(&p.as_str())))
                .map(|(_, p)| p.clone())
                .collect()
        } else {
            params.to_vec()
        };
        self.index.methods.push(MethodInfo {
            name: name.to_string(),
            class: ctx.class,
            span,
            params,
            body,
            sloc: metrics::sloc(span, self.code_lines),
            cyclomatic: metrics::cyclomatic(body),
        });

        if ctx.class_direct {
            if let Some(class) = ctx.class {
                self.index.classes[class].methods.push(id);
                if INIT_LIKE.contains(&name) {
                    let fields = collect_self_fields(body);
                    self.index.classes[class].fields.extend(fields);
                }
            }
        }

        let inner = Context {
            class: ctx.class,
            method: Some(id),
            class_direct: false,
        };
        for stmt in body {
            self.visit(stmt, inner)?;
        }
        Ok(())
    }
}

/// Field names assigned via `self.<field> = ...` at the top level of an
/// init-like method body.
fn collect_self_fields(body: &[SyntaxNode]) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    for stmt in body {
        if let SyntaxNode::Assign { targets, .. } = stmt {
            for target in targets {
                if let SyntaxNode::Attribute { owner, attr, .. } = target {
                    if matches!(owner.as_ref(), SyntaxNode::Name { id, .. } if id == "self") {
                        fields.insert(attr.clone());
                    }
                }
            }
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::python::parse_module;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn index_of(tree: &SourceTree) -> SymbolIndex<'_> {
        SymbolIndex::build(tree).unwrap()
    }

    #[test]
    fn classes_and_methods_are_extracted_in_source_order() {
        let tree = parse_module(
            indoc! {r#"
                class Order:
                    def __init__(self, total):
                        self.total = total
                        self.items = []

                    def add(self, item, price):
                        self.items.append(item)

                def helper(x):
                    return x
            "#},
            "order.py",
        )
        .unwrap();
        let index = index_of(&tree);

        assert_eq!(index.classes.len(), 1);
        let class = &index.classes[0];
        assert_eq!(class.name, "Order");
        assert_eq!(class.methods, vec![0, 1]);
        assert_eq!(
            class.fields,
            BTreeSet::from(["total".to_string(), "items".to_string()])
        );

        assert_eq!(index.methods.len(), 3);
        assert_eq!(index.methods[0].name, "__init__");
        assert_eq!(index.methods[0].params, vec!["total"]);
        assert_eq!(index.methods[1].params, vec!["item", "price"]);
        assert_eq!(index.methods[2].class, None);
        assert_eq!(index.methods[2].params, vec!["x"]);
        assert_eq!(index.qualified_name(&index.methods[1]), "Order.add");
    }

    #[test]
    fn literals_and_accesses_carry_their_method() {
        let tree = parse_module(
            indoc! {r#"
                class Cart:
                    def checkout(self, order):
                        rate = 0.2
                        return order.total + order.tax
            "#},
            "cart.py",
        )
        .unwrap();
        let index = index_of(&tree);

        assert_eq!(index.literals.len(), 1);
        assert_eq!(index.literals[0].value, Number::Float(0.2));
        assert_eq!(index.literals[0].method, Some(0));

        let accesses: Vec<_> = index.accesses_of(0).collect();
        assert_eq!(accesses.len(), 2);
        assert!(accesses
            .iter()
            .all(|a| a.owner == AccessOwner::Named("order".into())));
        assert_eq!(index.classes[0].coupled_types, BTreeSet::from(["order".to_string()]));
    }

    #[test]
    fn nested_function_attaches_to_enclosing_class_but_not_its_roster() {
        let tree = parse_module(
            indoc! {r#"
                class Report:
                    def render(self):
                        def fmt(value):
                            return value
                        return fmt(1)
            "#},
            "report.py",
        )
        .unwrap();
        let index = index_of(&tree);
        assert_eq!(index.classes[0].methods.len(), 1);
        let nested = &index.methods[1];
        assert_eq!(nested.name, "fmt");
        assert_eq!(nested.class, Some(0));
        // Not a class-body method, so its leading param is kept.
        assert_eq!(nested.params, vec!["value"]);
    }

    #[test]
    fn memoized_metrics_match_the_metric_library() {
        let tree = parse_module(
            indoc! {r#"
                def decide(a, b):
                    if a and b:
                        return a
                    # comment only
                    return b
            "#},
            "decide.py",
        )
        .unwrap();
        let index = index_of(&tree);
        let method = &index.methods[0];
        // def line + if + return + return; the comment line is excluded.
        assert_eq!(method.sloc, 4);
        // base 1 + if + (2-1) boolean operands
        assert_eq!(method.cyclomatic, 3);
    }
}
