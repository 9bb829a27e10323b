// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static/dynamic rule classification.
//!
//! A leaf is *dynamic* when it is a [`Resolver`](crate::Resolver) and
//! *static* otherwise. Classification walks the tree once per side and
//! produces two sibling trees that keep the original nesting. A nested rule
//! with mixed leaves shows up on both sides, each copy holding its own
//! disjoint subset. A side that ends up with nothing in it is `None`.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use crate::engine::{CompileOptions, SharedSheet, StyleEngine, StyleSheet};
use crate::rules::{RuleTree, RuleValue};

/// The two halves of a rule tree, before compilation.
pub struct Partition<C> {
    /// Literal-only rules, or `None` if there are none.
    pub static_rules: Option<RuleTree<C>>,
    /// Resolver-only rules, or `None` if there are none.
    pub dynamic_rules: Option<RuleTree<C>>,
}

impl<C> Partition<C> {
    /// Returns `true` if both sides are absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.static_rules.is_none() && self.dynamic_rules.is_none()
    }

    /// Rebuilds a single tree from both sides.
    ///
    /// For any tree `t`, `partition(&t).recombine() == t.pruned()`.
    #[must_use]
    pub fn recombine(&self) -> RuleTree<C> {
        let mut out = self.static_rules.clone().unwrap_or_default();
        if let Some(dynamic) = &self.dynamic_rules {
            merge_into(&mut out, dynamic);
        }
        out
    }
}

impl<C> fmt::Debug for Partition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partition")
            .field("static_rules", &self.static_rules)
            .field("dynamic_rules", &self.dynamic_rules)
            .finish()
    }
}

fn merge_into<C>(target: &mut RuleTree<C>, source: &RuleTree<C>) {
    for (name, value) in source.iter() {
        if let (Some(RuleValue::Nested(existing)), RuleValue::Nested(incoming)) =
            (target.get_mut(name), value)
        {
            merge_into(existing, incoming);
            continue;
        }
        target.insert(name, value.clone());
    }
}

fn extract<C>(tree: &RuleTree<C>, dynamic: bool) -> Option<RuleTree<C>> {
    let mut out = RuleTree::new();
    for (name, value) in tree.iter() {
        match value {
            RuleValue::Literal(_) if !dynamic => {
                out.insert(name, value.clone());
            }
            RuleValue::Resolver(_) if dynamic => {
                out.insert(name, value.clone());
            }
            RuleValue::Nested(sub) => {
                if let Some(side) = extract(sub, dynamic) {
                    out.insert(name, RuleValue::Nested(side));
                }
            }
            _ => {}
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Returns the literal-only subtree of `tree`, or `None` if it has no literals.
#[must_use]
pub fn extract_static<C>(tree: &RuleTree<C>) -> Option<RuleTree<C>> {
    extract(tree, false)
}

/// Returns the resolver-only subtree of `tree`, or `None` if it has no
/// resolvers.
#[must_use]
pub fn extract_dynamic<C>(tree: &RuleTree<C>) -> Option<RuleTree<C>> {
    extract(tree, true)
}

/// Splits `tree` into its static and dynamic halves.
///
/// ```rust
/// use understory_scoped_style::{RuleTreeBuilder, partition};
///
/// let tree = RuleTreeBuilder::<u32>::new()
///     .nested(
///         "root",
///         RuleTreeBuilder::new()
///             .literal("display", "block")
///             .resolver("width", |w: &u32| format!("{w}px"))
///             .build(),
///     )
///     .build();
///
/// let parts = partition(&tree);
/// let statics = parts.static_rules.as_ref().unwrap();
/// let dynamics = parts.dynamic_rules.as_ref().unwrap();
/// assert!(statics.get("root").unwrap().as_nested().unwrap().contains("display"));
/// assert!(dynamics.get("root").unwrap().as_nested().unwrap().contains("width"));
/// assert_eq!(parts.recombine(), tree);
/// ```
#[must_use]
pub fn partition<C>(tree: &RuleTree<C>) -> Partition<C> {
    Partition {
        static_rules: extract_static(tree),
        dynamic_rules: extract_dynamic(tree),
    }
}

/// A classified rule tree with its static half compiled.
///
/// One of these exists per (component, style-set) pair and is shared by every
/// instance of that pair.
pub struct SeparatedStylesheet<S: StyleSheet> {
    static_rules: Option<RuleTree<S::Config>>,
    static_sheet: Option<SharedSheet<S>>,
    dynamic_rules: Option<RuleTree<S::Config>>,
}

impl<S: StyleSheet> SeparatedStylesheet<S> {
    /// Returns the literal-only rules.
    #[must_use]
    pub fn static_rules(&self) -> Option<&RuleTree<S::Config>> {
        self.static_rules.as_ref()
    }

    /// Returns the compiled static sheet, present exactly when
    /// [`static_rules`](Self::static_rules) is.
    #[must_use]
    pub fn static_sheet(&self) -> Option<&SharedSheet<S>> {
        self.static_sheet.as_ref()
    }

    /// Returns the resolver-only rules, left uncompiled for per-instance use.
    #[must_use]
    pub fn dynamic_rules(&self) -> Option<&RuleTree<S::Config>> {
        self.dynamic_rules.as_ref()
    }

    /// Returns `true` if neither side has any rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.static_rules.is_none() && self.dynamic_rules.is_none()
    }
}

impl<S: StyleSheet> fmt::Debug for SeparatedStylesheet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeparatedStylesheet")
            .field("static_rules", &self.static_rules)
            .field("static_sheet", &self.static_sheet.is_some())
            .field("dynamic_rules", &self.dynamic_rules)
            .finish()
    }
}

/// Classifies `tree` and compiles its static half with `engine`.
///
/// The dynamic half is returned as a rule tree. Engine errors are returned
/// unchanged.
pub fn separate<E: StyleEngine>(
    tree: &RuleTree<E::Config>,
    engine: &mut E,
) -> Result<SeparatedStylesheet<E::Sheet>, E::Error> {
    let Partition {
        static_rules,
        dynamic_rules,
    } = partition(tree);

    let static_sheet = match &static_rules {
        Some(rules) => {
            tracing::debug!(rules = rules.len(), "compiling static sheet");
            let sheet = engine.compile(rules, &CompileOptions::for_static())?;
            Some(Rc::new(RefCell::new(sheet)))
        }
        None => None,
    };

    Ok(SeparatedStylesheet {
        static_rules,
        static_sheet,
        dynamic_rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleTreeBuilder;
    use crate::testing::{MockEngine, Op, TestConfig};
    use alloc::string::ToString;

    fn mixed() -> RuleTree<TestConfig> {
        RuleTreeBuilder::new()
            .nested(
                "root",
                RuleTreeBuilder::new()
                    .literal("display", "flex")
                    .resolver("color", |c: &TestConfig| c.color.to_string())
                    .build(),
            )
            .nested(
                "label",
                RuleTreeBuilder::new().literal("font-weight", "bold").build(),
            )
            .build()
    }

    #[test]
    fn mixed_rule_appears_on_both_sides_with_disjoint_leaves() {
        let parts = partition(&mixed());
        let statics = parts.static_rules.as_ref().unwrap();
        let dynamics = parts.dynamic_rules.as_ref().unwrap();

        let s_root = statics.get("root").unwrap().as_nested().unwrap();
        let d_root = dynamics.get("root").unwrap().as_nested().unwrap();
        assert!(s_root.contains("display") && !s_root.contains("color"));
        assert!(d_root.contains("color") && !d_root.contains("display"));

        assert!(statics.contains("label"));
        assert!(!dynamics.contains("label"));
    }

    #[test]
    fn empty_sides_are_absent() {
        let literal_only = RuleTreeBuilder::<TestConfig>::new()
            .nested("root", RuleTreeBuilder::new().literal("a", "b").build())
            .build();
        assert!(extract_dynamic(&literal_only).is_none());

        let resolver_only = RuleTreeBuilder::<TestConfig>::new()
            .nested(
                "root",
                RuleTreeBuilder::new()
                    .resolver("a", |_: &TestConfig| "b".into())
                    .build(),
            )
            .build();
        assert!(extract_static(&resolver_only).is_none());

        let hollow = RuleTreeBuilder::<TestConfig>::new()
            .nested("root", RuleTreeBuilder::new().nested("x", RuleTree::new()).build())
            .build();
        assert!(partition(&hollow).is_empty());
    }

    #[test]
    fn separate_compiles_static_side_only() {
        let mut engine = MockEngine::new();
        let separated = separate(&mixed(), &mut engine).unwrap();

        assert!(separated.static_sheet().is_some());
        assert!(separated.dynamic_rules().is_some());
        let log = engine.ops();
        assert_eq!(log.len(), 1);
        assert!(matches!(log[0], Op::Compile { link: false, .. }));
    }

    #[test]
    fn separate_without_rules_compiles_nothing() {
        let mut engine = MockEngine::new();
        let separated = separate(&RuleTree::new(), &mut engine).unwrap();

        assert!(separated.is_empty());
        assert!(separated.static_sheet().is_none());
        assert!(engine.ops().is_empty());
    }

    #[test]
    fn separate_propagates_engine_errors() {
        let mut engine = MockEngine::failing();
        assert!(separate(&mixed(), &mut engine).is_err());
    }
}
