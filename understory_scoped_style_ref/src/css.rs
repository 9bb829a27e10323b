// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lowering rule trees to CSS blocks, and rendering blocks to text.
//!
//! Top-level entries are rules (one scoped class each) or at-rules. Inside a
//! rule:
//!
//! - literals and resolvers are declarations; `camelCase` names become
//!   `kebab-case` properties,
//! - a nested name containing `&` is a selector with `&` standing for the
//!   parent selector,
//! - a nested name starting with `@` wraps the parent selector in that
//!   at-rule,
//! - any other nested name is a descendant selector.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use understory_scoped_style::{ClassNameMap, Resolver, RuleTree, RuleValue};

use crate::engine::CompileError;

pub(crate) enum Value<C> {
    Fixed(String),
    Computed(Resolver<C>),
}

impl<C> Value<C> {
    fn from_leaf(value: &RuleValue<C>) -> Option<Self> {
        match value {
            RuleValue::Literal(s) => Some(Self::Fixed(s.clone())),
            RuleValue::Resolver(r) => Some(Self::Computed(r.clone())),
            RuleValue::Nested(_) => None,
        }
    }

    /// Computed values have no text until a configuration is supplied.
    fn render(&self, config: Option<&C>) -> Option<String> {
        match self {
            Self::Fixed(s) => Some(s.clone()),
            Self::Computed(r) => config.map(|c| r.resolve(c)),
        }
    }
}

pub(crate) struct Declaration<C> {
    property: String,
    value: Value<C>,
}

pub(crate) enum Block<C> {
    Rule {
        selector: String,
        declarations: Vec<Declaration<C>>,
    },
    AtRule {
        prelude: String,
        declarations: Vec<Declaration<C>>,
        blocks: Vec<Block<C>>,
    },
    Directive {
        name: String,
        value: Value<C>,
    },
}

/// Converts a rule name such as `backgroundColor` to `background-color`.
pub(crate) fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Lowers a top-level rule tree, minting classes through `class_for`.
pub(crate) fn lower<C>(
    rules: &RuleTree<C>,
    classes: &mut ClassNameMap,
    class_for: &dyn Fn(&str) -> String,
) -> Result<Vec<Block<C>>, CompileError> {
    let mut out = Vec::new();
    for (name, value) in rules.iter() {
        if name.is_empty() {
            return Err(CompileError::EmptyName);
        }
        if name.starts_with('@') {
            out.push(lower_at_rule(name, value, classes, class_for)?);
            continue;
        }
        let Some(inner) = value.as_nested() else {
            return Err(CompileError::TopLevelValue {
                rule: name.to_string(),
            });
        };
        let class = match classes.get(name) {
            Some(class) => class.to_string(),
            None => {
                let class = class_for(name);
                classes.insert(name, class.clone());
                class
            }
        };
        lower_rule(&format!(".{class}"), inner, &mut out);
    }
    Ok(out)
}

fn lower_at_rule<C>(
    name: &str,
    value: &RuleValue<C>,
    classes: &mut ClassNameMap,
    class_for: &dyn Fn(&str) -> String,
) -> Result<Block<C>, CompileError> {
    let inner = match value {
        RuleValue::Nested(inner) => inner,
        RuleValue::Literal(s) => {
            return Ok(Block::Directive {
                name: name.to_string(),
                value: Value::Fixed(s.clone()),
            });
        }
        RuleValue::Resolver(r) => {
            return Ok(Block::Directive {
                name: name.to_string(),
                value: Value::Computed(r.clone()),
            });
        }
    };

    let mut declarations = Vec::new();
    let mut blocks = Vec::new();
    let keyframes = name.starts_with("@keyframes");
    for (child, child_value) in inner.iter() {
        match child_value {
            RuleValue::Nested(tree) if keyframes => lower_rule(child, tree, &mut blocks),
            RuleValue::Nested(_) => {
                let single: RuleTree<C> = [(child, child_value.clone())].into_iter().collect();
                blocks.extend(lower(&single, classes, class_for)?);
            }
            leaf => {
                if let Some(value) = Value::from_leaf(leaf) {
                    declarations.push(Declaration {
                        property: kebab_case(child),
                        value,
                    });
                }
            }
        }
    }
    Ok(Block::AtRule {
        prelude: name.to_string(),
        declarations,
        blocks,
    })
}

fn lower_rule<C>(selector: &str, tree: &RuleTree<C>, out: &mut Vec<Block<C>>) {
    let mut declarations = Vec::new();
    let mut children = Vec::new();
    for (name, value) in tree.iter() {
        match value {
            RuleValue::Nested(inner) if name.starts_with('@') => {
                let mut wrapped = Vec::new();
                lower_rule(selector, inner, &mut wrapped);
                children.push(Block::AtRule {
                    prelude: name.to_string(),
                    declarations: Vec::new(),
                    blocks: wrapped,
                });
            }
            RuleValue::Nested(inner) => {
                let nested = if name.contains('&') {
                    name.replace('&', selector)
                } else {
                    format!("{selector} {name}")
                };
                lower_rule(&nested, inner, &mut children);
            }
            leaf => {
                if let Some(value) = Value::from_leaf(leaf) {
                    declarations.push(Declaration {
                        property: kebab_case(name),
                        value,
                    });
                }
            }
        }
    }
    out.push(Block::Rule {
        selector: selector.to_string(),
        declarations,
    });
    out.append(&mut children);
}

/// Renders blocks to text. Blocks with nothing to show are skipped.
pub(crate) fn render<C>(blocks: &[Block<C>], config: Option<&C>) -> String {
    let mut out = String::new();
    render_into(&mut out, blocks, config, 0);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn render_declarations<C>(
    out: &mut String,
    declarations: &[Declaration<C>],
    config: Option<&C>,
    depth: usize,
) {
    for decl in declarations {
        if let Some(value) = decl.value.render(config) {
            indent(out, depth);
            out.push_str(&decl.property);
            out.push_str(": ");
            out.push_str(&value);
            out.push_str(";\n");
        }
    }
}

fn render_into<C>(out: &mut String, blocks: &[Block<C>], config: Option<&C>, depth: usize) {
    for block in blocks {
        match block {
            Block::Rule {
                selector,
                declarations,
            } => {
                let mut body = String::new();
                render_declarations(&mut body, declarations, config, depth + 1);
                if body.is_empty() {
                    continue;
                }
                indent(out, depth);
                out.push_str(selector);
                out.push_str(" {\n");
                out.push_str(&body);
                indent(out, depth);
                out.push_str("}\n");
            }
            Block::AtRule {
                prelude,
                declarations,
                blocks,
            } => {
                let mut body = String::new();
                render_declarations(&mut body, declarations, config, depth + 1);
                render_into(&mut body, blocks, config, depth + 1);
                if body.is_empty() {
                    continue;
                }
                indent(out, depth);
                out.push_str(prelude);
                out.push_str(" {\n");
                out.push_str(&body);
                indent(out, depth);
                out.push_str("}\n");
            }
            Block::Directive { name, value } => {
                if let Some(value) = value.render(config) {
                    indent(out, depth);
                    out.push_str(name);
                    out.push(' ');
                    out.push_str(&value);
                    out.push_str(";\n");
                }
            }
        }
    }
}
