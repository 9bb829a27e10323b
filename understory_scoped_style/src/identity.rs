// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity-keyed naming for components and style sets.
//!
//! The separated-sheet cache is keyed by *identity*, not by value: two style
//! sets built from equal trees are cached independently, and a component type
//! keeps one identifier for the life of the table.
//!
//! Identity is recorded in an explicit side table. The first time a
//! [`ComponentKey`] or [`StyleSet`] is observed, the table mints a fresh
//! [`Uid`] from its [`UidSource`] and remembers it. Style sets are pinned by
//! the table (it holds a clone of the handle), so an address can never be
//! recycled for a different set while the table lives.
//!
//! ## Stability precondition
//!
//! Callers must keep component keys and style sets referentially stable for
//! the life of a component. Building a new [`StyleSet`] on every mount still
//! produces correct styles but gives every instance its own cache entry.
//!
//! ```rust
//! use understory_scoped_style::{ComponentKey, IdentityTable, RuleTree, StyleSet};
//!
//! struct Button;
//!
//! let mut ids = IdentityTable::<()>::new();
//! let shared = StyleSet::new(RuleTree::new());
//! let twin = StyleSet::new(RuleTree::new());
//!
//! let k1 = ids.cache_key(ComponentKey::of::<Button>(), &shared);
//! let k2 = ids.cache_key(ComponentKey::of::<Button>(), &shared.clone());
//! let k3 = ids.cache_key(ComponentKey::of::<Button>(), &twin);
//!
//! assert_eq!(k1, k2);
//! assert_ne!(k1, k3);
//! ```

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use core::any::TypeId;
use core::fmt;

use hashbrown::HashMap;

use crate::rules::RuleTree;

/// A shared, identity-carrying handle to a [`RuleTree`].
///
/// Clones share identity. Independently constructed sets never do, even when
/// their trees are equal.
pub struct StyleSet<C> {
    tree: Rc<RuleTree<C>>,
}

impl<C> StyleSet<C> {
    /// Wraps `tree` in a new identity.
    #[must_use]
    pub fn new(tree: RuleTree<C>) -> Self {
        Self {
            tree: Rc::new(tree),
        }
    }

    /// Returns the rule tree.
    #[must_use]
    pub fn tree(&self) -> &RuleTree<C> {
        &self.tree
    }

    /// Returns `true` if both handles share one identity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.tree).cast::<()>().addr()
    }
}

impl<C> Clone for StyleSet<C> {
    fn clone(&self) -> Self {
        Self {
            tree: Rc::clone(&self.tree),
        }
    }
}

impl<C> From<RuleTree<C>> for StyleSet<C> {
    fn from(tree: RuleTree<C>) -> Self {
        Self::new(tree)
    }
}

impl<C> fmt::Debug for StyleSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleSet")
            .field("addr", &self.addr())
            .field("tree", &self.tree)
            .finish()
    }
}

/// The identity of a component type.
///
/// Use [`ComponentKey::of`] for Rust types, or [`ComponentKey::named`] when
/// the host defines component types at runtime (for example by tag name).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKey {
    /// A Rust type.
    Type(TypeId),
    /// A host-defined name.
    Named(&'static str),
}

impl ComponentKey {
    /// Returns the key for type `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeId::of::<T>())
    }

    /// Returns the key for a host-defined component name.
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self::Named(name)
    }
}

/// An opaque, process-unique identifier minted by a [`UidSource`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(String);

impl Uid {
    /// Wraps an already-unique string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Uid").field(&self.0).finish()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces a unique [`Uid`] on every call.
pub trait UidSource {
    /// Mints a new identifier, distinct from every earlier one.
    fn next_uid(&mut self) -> Uid;
}

/// A counter-backed [`UidSource`]: `u0`, `u1`, `u2`, …
#[derive(Clone, Debug)]
pub struct SequentialUids {
    prefix: String,
    next: u64,
}

impl SequentialUids {
    /// Creates a source with the default `u` prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefix("u")
    }

    /// Creates a source whose identifiers start with `prefix`.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequentialUids {
    fn default() -> Self {
        Self::new()
    }
}

impl UidSource for SequentialUids {
    fn next_uid(&mut self) -> Uid {
        let uid = Uid(format!("{}{:x}", self.prefix, self.next));
        self.next += 1;
        uid
    }
}

/// The composite cache key of a (component, style-set) pair.
///
/// Displays as the concatenation of both identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    component: Uid,
    style_set: Uid,
}

impl CacheKey {
    /// Returns the component's identifier.
    #[must_use]
    pub fn component(&self) -> &Uid {
        &self.component
    }

    /// Returns the style set's identifier.
    #[must_use]
    pub fn style_set(&self) -> &Uid {
        &self.style_set
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.component, self.style_set)
    }
}

/// Side table from component and style-set identity to minted [`Uid`]s.
///
/// Entries are never removed. The key space is bounded by the number of
/// distinct component types and style-set definitions, which is static for
/// a typical application.
pub struct IdentityTable<C, U = SequentialUids> {
    uids: U,
    components: HashMap<ComponentKey, Uid>,
    style_sets: HashMap<usize, (StyleSet<C>, Uid)>,
}

impl<C> IdentityTable<C> {
    /// Creates an empty table minting [`SequentialUids`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_uids(SequentialUids::new())
    }
}

impl<C> Default for IdentityTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, U: UidSource> IdentityTable<C, U> {
    /// Creates an empty table minting identifiers from `uids`.
    #[must_use]
    pub fn with_uids(uids: U) -> Self {
        Self {
            uids,
            components: HashMap::new(),
            style_sets: HashMap::new(),
        }
    }

    /// Returns the identifier for `key`, minting one on first observation.
    pub fn component_uid(&mut self, key: ComponentKey) -> Uid {
        let uids = &mut self.uids;
        self.components
            .entry(key)
            .or_insert_with(|| uids.next_uid())
            .clone()
    }

    /// Returns the identifier for `set`, minting one on first observation.
    pub fn style_set_uid(&mut self, set: &StyleSet<C>) -> Uid {
        let uids = &mut self.uids;
        self.style_sets
            .entry(set.addr())
            .or_insert_with(|| (set.clone(), uids.next_uid()))
            .1
            .clone()
    }

    /// Returns the composite key of a (component, style-set) pair.
    pub fn cache_key(&mut self, component: ComponentKey, set: &StyleSet<C>) -> CacheKey {
        CacheKey {
            component: self.component_uid(component),
            style_set: self.style_set_uid(set),
        }
    }
}

impl<C, U> IdentityTable<C, U> {
    /// Returns the identifier already minted for `key`, if any.
    #[must_use]
    pub fn lookup_component(&self, key: ComponentKey) -> Option<&Uid> {
        self.components.get(&key)
    }

    /// Returns the identifier already minted for `set`, if any.
    #[must_use]
    pub fn lookup_style_set(&self, set: &StyleSet<C>) -> Option<&Uid> {
        self.style_sets.get(&set.addr()).map(|(_, uid)| uid)
    }

    /// Returns the number of component identities seen.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Returns the number of style-set identities seen.
    #[must_use]
    pub fn style_set_count(&self) -> usize {
        self.style_sets.len()
    }
}

impl<C, U: fmt::Debug> fmt::Debug for IdentityTable<C, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityTable")
            .field("uids", &self.uids)
            .field("components", &self.components.len())
            .field("style_sets", &self.style_sets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleTreeBuilder;
    use alloc::string::ToString;

    struct Card;
    struct Badge;

    #[test]
    fn sequential_uids_are_distinct() {
        let mut uids = SequentialUids::with_prefix("x");
        let a = uids.next_uid();
        let b = uids.next_uid();
        assert_eq!(a.as_str(), "x0");
        assert_eq!(b.as_str(), "x1");
    }

    #[test]
    fn component_identity_is_per_type() {
        let mut ids = IdentityTable::<()>::new();
        let card = ids.component_uid(ComponentKey::of::<Card>());
        let card_again = ids.component_uid(ComponentKey::of::<Card>());
        let badge = ids.component_uid(ComponentKey::of::<Badge>());
        let named = ids.component_uid(ComponentKey::named("x-card"));

        assert_eq!(card, card_again);
        assert_ne!(card, badge);
        assert_ne!(card, named);
        assert_eq!(ids.component_count(), 3);
    }

    #[test]
    fn equal_trees_get_distinct_identities() {
        let tree = || RuleTreeBuilder::<()>::new().literal("color", "red").build();
        let a = StyleSet::new(tree());
        let b = StyleSet::new(tree());
        assert_eq!(a.tree(), b.tree());

        let mut ids = IdentityTable::new();
        assert_ne!(ids.style_set_uid(&a), ids.style_set_uid(&b));
        assert_eq!(ids.style_set_uid(&a), ids.style_set_uid(&a.clone()));
        assert_eq!(ids.style_set_count(), 2);
    }

    #[test]
    fn pinned_sets_keep_their_identity_after_caller_drops() {
        let mut ids = IdentityTable::<()>::new();
        let first = StyleSet::new(RuleTree::new());
        let uid = ids.style_set_uid(&first);
        drop(first);

        // The table still holds the first set, so this allocation cannot
        // reuse its address.
        let second = StyleSet::new(RuleTree::new());
        assert_ne!(ids.style_set_uid(&second), uid);
    }

    #[test]
    fn cache_key_displays_as_concatenation() {
        let mut ids = IdentityTable::<()>::new();
        let set = StyleSet::new(RuleTree::new());
        let key = ids.cache_key(ComponentKey::of::<Card>(), &set);
        assert_eq!(key.to_string(), "u0u1");
        assert_eq!(key.component().as_str(), "u0");
        assert_eq!(key.style_set().as_str(), "u1");
    }
}
