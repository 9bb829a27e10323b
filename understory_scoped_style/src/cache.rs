// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoized classification per (component, style-set) pair.

use alloc::rc::Rc;
use core::fmt;

use hashbrown::HashMap;

use crate::classify::{SeparatedStylesheet, separate};
use crate::engine::StyleEngine;
use crate::identity::{CacheKey, ComponentKey, IdentityTable, SequentialUids, StyleSet, UidSource};

/// Append-only cache of [`SeparatedStylesheet`]s.
///
/// The first request for a pair classifies its style set and compiles the
/// static half; every later request returns the same `Rc`. A compile error
/// stores nothing, so the next request tries again.
pub struct StylesheetCache<E: StyleEngine, U = SequentialUids> {
    identities: IdentityTable<E::Config, U>,
    entries: HashMap<CacheKey, Rc<SeparatedStylesheet<E::Sheet>>>,
}

impl<E: StyleEngine> StylesheetCache<E> {
    /// Creates an empty cache minting [`SequentialUids`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_uids(SequentialUids::new())
    }
}

impl<E: StyleEngine> Default for StylesheetCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: StyleEngine, U: UidSource> StylesheetCache<E, U> {
    /// Creates an empty cache minting identifiers from `uids`.
    #[must_use]
    pub fn with_uids(uids: U) -> Self {
        Self {
            identities: IdentityTable::with_uids(uids),
            entries: HashMap::new(),
        }
    }

    /// Returns the separated sheet for a pair, classifying on first use.
    pub fn get_or_create(
        &mut self,
        component: ComponentKey,
        style_set: &StyleSet<E::Config>,
        engine: &mut E,
    ) -> Result<(CacheKey, Rc<SeparatedStylesheet<E::Sheet>>), E::Error> {
        let key = self.identities.cache_key(component, style_set);
        if let Some(existing) = self.entries.get(&key) {
            tracing::trace!(%key, "separated sheet cache hit");
            return Ok((key, Rc::clone(existing)));
        }

        tracing::debug!(%key, "classifying style set");
        let separated = Rc::new(separate(style_set.tree(), engine)?);
        self.entries.insert(key.clone(), Rc::clone(&separated));
        Ok((key, separated))
    }
}

impl<E: StyleEngine, U> StylesheetCache<E, U> {
    /// Returns the number of cached pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` has a cached entry.
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the cached entry for `key`.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<&Rc<SeparatedStylesheet<E::Sheet>>> {
        self.entries.get(key)
    }

    /// Returns the identity side table.
    #[must_use]
    pub fn identities(&self) -> &IdentityTable<E::Config, U> {
        &self.identities
    }
}

impl<E: StyleEngine, U: fmt::Debug> fmt::Debug for StylesheetCache<E, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StylesheetCache")
            .field("identities", &self.identities)
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleTree, RuleTreeBuilder};
    use crate::testing::{MockEngine, Op, TestConfig};
    use alloc::string::ToString;

    struct Panel;
    struct Toolbar;

    fn styles() -> RuleTree<TestConfig> {
        RuleTreeBuilder::new()
            .nested(
                "root",
                RuleTreeBuilder::new()
                    .literal("margin", "0")
                    .resolver("color", |c: &TestConfig| c.color.to_string())
                    .build(),
            )
            .build()
    }

    fn compiles(engine: &MockEngine) -> usize {
        engine
            .ops()
            .iter()
            .filter(|op| matches!(op, Op::Compile { .. }))
            .count()
    }

    #[test]
    fn same_pair_returns_identical_entry_without_recompiling() {
        let mut engine = MockEngine::new();
        let mut cache = StylesheetCache::new();
        let set = StyleSet::new(styles());

        let (k1, a) = cache
            .get_or_create(ComponentKey::of::<Panel>(), &set, &mut engine)
            .unwrap();
        let (k2, b) = cache
            .get_or_create(ComponentKey::of::<Panel>(), &set.clone(), &mut engine)
            .unwrap();

        assert_eq!(k1, k2);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(compiles(&engine), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn deeply_equal_style_sets_are_cached_independently() {
        let mut engine = MockEngine::new();
        let mut cache = StylesheetCache::new();
        let first = StyleSet::new(styles());
        let second = StyleSet::new(styles());

        let (k1, a) = cache
            .get_or_create(ComponentKey::of::<Panel>(), &first, &mut engine)
            .unwrap();
        let (k2, b) = cache
            .get_or_create(ComponentKey::of::<Panel>(), &second, &mut engine)
            .unwrap();

        assert_ne!(k1, k2);
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(compiles(&engine), 2);
    }

    #[test]
    fn components_sharing_a_style_set_get_separate_entries() {
        let mut engine = MockEngine::new();
        let mut cache = StylesheetCache::new();
        let set = StyleSet::new(styles());

        let (k1, _) = cache
            .get_or_create(ComponentKey::of::<Panel>(), &set, &mut engine)
            .unwrap();
        let (k2, _) = cache
            .get_or_create(ComponentKey::of::<Toolbar>(), &set, &mut engine)
            .unwrap();

        assert_ne!(k1, k2);
        assert_eq!(k1.style_set(), k2.style_set());
        assert_eq!(cache.identities().style_set_count(), 1);
    }

    #[test]
    fn failed_compile_is_not_cached() {
        let mut engine = MockEngine::failing();
        let mut cache = StylesheetCache::new();
        let set = StyleSet::new(styles());

        assert!(
            cache
                .get_or_create(ComponentKey::of::<Panel>(), &set, &mut engine)
                .is_err()
        );
        assert!(cache.is_empty());

        engine.set_failing(false);
        let (key, _) = cache
            .get_or_create(ComponentKey::of::<Panel>(), &set, &mut engine)
            .unwrap();
        assert!(cache.contains(&key));
    }
}
