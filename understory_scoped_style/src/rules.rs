// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style rule trees.
//!
//! A [`RuleTree`] maps rule names to [`RuleValue`]s. A value is either a
//! literal string, a nested tree, or a [`Resolver`] that computes a string
//! from a configuration object `C`. Nesting depth is arbitrary.
//!
//! Trees keep insertion order (the first declared rule is the component's
//! primary rule), but equality is map equality: two trees are equal when
//! they hold the same names with equal values, regardless of order.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A configuration-dependent rule value.
///
/// Resolvers are shared: cloning a resolver clones the handle, not the
/// closure. Two resolvers are equal only when they are the same closure.
pub struct Resolver<C> {
    f: Rc<dyn Fn(&C) -> String>,
}

impl<C> Resolver<C> {
    /// Wraps a closure as a resolver.
    pub fn new(f: impl Fn(&C) -> String + 'static) -> Self {
        Self { f: Rc::new(f) }
    }

    /// Evaluates the resolver against `config`.
    #[must_use]
    pub fn resolve(&self, config: &C) -> String {
        (self.f)(config)
    }

    /// Returns `true` if both resolvers wrap the same closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl<C> Clone for Resolver<C> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<C> PartialEq for Resolver<C> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<C> fmt::Debug for Resolver<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

/// The value held under a rule name.
pub enum RuleValue<C> {
    /// A fixed string value.
    Literal(String),
    /// A nested rule tree.
    Nested(RuleTree<C>),
    /// A value computed from configuration.
    Resolver(Resolver<C>),
}

impl<C> RuleValue<C> {
    /// Returns `true` if this value contains a resolver at any depth.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::Literal(_) => false,
            Self::Nested(tree) => tree.iter().any(|(_, value)| value.is_dynamic()),
            Self::Resolver(_) => true,
        }
    }

    /// Returns the literal string, if this is a literal.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested tree, if this is a nested value.
    #[must_use]
    pub fn as_nested(&self) -> Option<&RuleTree<C>> {
        match self {
            Self::Nested(tree) => Some(tree),
            _ => None,
        }
    }
}

impl<C> Clone for RuleValue<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(s) => Self::Literal(s.clone()),
            Self::Nested(tree) => Self::Nested(tree.clone()),
            Self::Resolver(r) => Self::Resolver(r.clone()),
        }
    }
}

impl<C> PartialEq for RuleValue<C> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Nested(a), Self::Nested(b)) => a == b,
            (Self::Resolver(a), Self::Resolver(b)) => a == b,
            _ => false,
        }
    }
}

impl<C> fmt::Debug for RuleValue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Self::Nested(tree) => f.debug_tuple("Nested").field(tree).finish(),
            Self::Resolver(r) => r.fmt(f),
        }
    }
}

impl<C> From<&str> for RuleValue<C> {
    fn from(value: &str) -> Self {
        Self::Literal(value.into())
    }
}

impl<C> From<String> for RuleValue<C> {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl<C> From<RuleTree<C>> for RuleValue<C> {
    fn from(value: RuleTree<C>) -> Self {
        Self::Nested(value)
    }
}

impl<C> From<Resolver<C>> for RuleValue<C> {
    fn from(value: Resolver<C>) -> Self {
        Self::Resolver(value)
    }
}

/// An insertion-ordered mapping from rule names to [`RuleValue`]s.
///
/// # Example
///
/// ```rust
/// use understory_scoped_style::{RuleTree, RuleTreeBuilder};
///
/// struct Config {
///     accent: &'static str,
/// }
///
/// let tree: RuleTree<Config> = RuleTreeBuilder::new()
///     .nested(
///         "root",
///         RuleTreeBuilder::new()
///             .literal("display", "flex")
///             .resolver("color", |c: &Config| c.accent.into())
///             .build(),
///     )
///     .build();
///
/// assert_eq!(tree.len(), 1);
/// assert!(tree.get("root").unwrap().is_dynamic());
/// ```
pub struct RuleTree<C> {
    entries: Vec<(String, RuleValue<C>)>,
}

impl<C> RuleTree<C> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no top-level entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the tree holds no literal or resolver at any depth.
    ///
    /// A tree whose only entries are (recursively) empty nested trees counts
    /// as empty.
    #[must_use]
    pub fn is_recursively_empty(&self) -> bool {
        self.entries.iter().all(|(_, value)| match value {
            RuleValue::Nested(tree) => tree.is_recursively_empty(),
            _ => false,
        })
    }

    /// Returns the value for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RuleValue<C>> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Returns `true` if the tree has a top-level entry named `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts a value, returning the previous value for `name`.
    ///
    /// Replacing an existing entry keeps its original position.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<RuleValue<C>>,
    ) -> Option<RuleValue<C>> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(core::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Returns a mutable reference to the value for `name`, if present.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut RuleValue<C>> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleValue<C>)> + '_ {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates rule names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Returns a copy with every recursively-empty nested tree removed.
    #[must_use]
    pub fn pruned(&self) -> Self {
        let mut out = Self::new();
        for (name, value) in &self.entries {
            match value {
                RuleValue::Nested(tree) => {
                    if !tree.is_recursively_empty() {
                        out.entries
                            .push((name.clone(), RuleValue::Nested(tree.pruned())));
                    }
                }
                other => out.entries.push((name.clone(), other.clone())),
            }
        }
        out
    }
}

impl<C> Default for RuleTree<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for RuleTree<C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<C> PartialEq for RuleTree<C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name).is_some_and(|v| v == value))
    }
}

impl<C> fmt::Debug for RuleTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<C, K, V> FromIterator<(K, V)> for RuleTree<C>
where
    K: Into<String>,
    V: Into<RuleValue<C>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        for (name, value) in iter {
            tree.insert(name, value);
        }
        tree
    }
}

/// Builder for constructing [`RuleTree`] instances.
pub struct RuleTreeBuilder<C> {
    tree: RuleTree<C>,
}

impl<C> RuleTreeBuilder<C> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: RuleTree::new(),
        }
    }

    /// Adds a literal value.
    #[must_use]
    pub fn literal(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tree.insert(name, RuleValue::Literal(value.into()));
        self
    }

    /// Adds a nested tree.
    #[must_use]
    pub fn nested(mut self, name: impl Into<String>, tree: RuleTree<C>) -> Self {
        self.tree.insert(name, RuleValue::Nested(tree));
        self
    }

    /// Adds a resolver computed from configuration.
    #[must_use]
    pub fn resolver(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&C) -> String + 'static,
    ) -> Self {
        self.tree
            .insert(name, RuleValue::Resolver(Resolver::new(f)));
        self
    }

    /// Builds the tree.
    #[must_use]
    pub fn build(self) -> RuleTree<C> {
        self.tree
    }
}

impl<C> Default for RuleTreeBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for RuleTreeBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTreeBuilder")
            .field("tree", &self.tree)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn insert_replaces_in_place() {
        let mut tree = RuleTree::<()>::new();
        tree.insert("a", "1");
        tree.insert("b", "2");
        let prev = tree.insert("a", "3");

        assert_eq!(prev, Some(RuleValue::Literal("1".to_string())));
        let names: Vec<_> = tree.names().collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(tree.get("a").and_then(RuleValue::as_literal), Some("3"));
    }

    #[test]
    fn equality_ignores_order_but_not_resolver_identity() {
        let r = Resolver::<u32>::new(|n| n.to_string());
        let a: RuleTree<u32> = [("x", RuleValue::<u32>::from("1")), ("y", r.clone().into())]
            .into_iter()
            .collect();
        let b: RuleTree<u32> = [("y", RuleValue::<u32>::from(r)), ("x", "1".into())]
            .into_iter()
            .collect();
        assert_eq!(a, b);

        let c = RuleTreeBuilder::new()
            .literal("x", "1")
            .resolver("y", |n: &u32| n.to_string())
            .build();
        assert_ne!(a, c, "distinct closures never compare equal");
    }

    #[test]
    fn recursively_empty_detection_and_pruning() {
        let tree = RuleTreeBuilder::<()>::new()
            .nested(
                "outer",
                RuleTreeBuilder::new()
                    .nested("inner", RuleTree::new())
                    .build(),
            )
            .literal("kept", "yes")
            .build();

        assert!(!tree.is_recursively_empty());
        assert!(tree.get("outer").unwrap().as_nested().unwrap().is_recursively_empty());

        let pruned = tree.pruned();
        assert_eq!(pruned.len(), 1);
        assert!(pruned.contains("kept"));
        assert!(RuleTree::<()>::new().is_recursively_empty());
    }

    #[test]
    fn dynamic_detection_is_deep() {
        let tree = RuleTreeBuilder::<u8>::new()
            .nested(
                "a",
                RuleTreeBuilder::new()
                    .nested(
                        "b",
                        RuleTreeBuilder::new()
                            .resolver("c", |_| String::new())
                            .build(),
                    )
                    .build(),
            )
            .literal("d", "x")
            .build();

        assert!(tree.get("a").unwrap().is_dynamic());
        assert!(!tree.get("d").unwrap().is_dynamic());
    }
}
