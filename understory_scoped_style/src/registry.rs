// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference-counted registration of shared static sheets.
//!
//! A static sheet is shared by every instance of one (component, style-set)
//! pair. Each instance `manage`s it once after mounting and `unmanage`s it
//! once on teardown. The sheet is attached when its first user arrives and
//! detached when its last user leaves.

use alloc::rc::Rc;
use core::fmt;

use hashbrown::HashMap;

use crate::engine::{SharedSheet, StyleSheet};
use crate::identity::CacheKey;

/// The process-wide bookkeeping for shared sheets.
///
/// Implementations must tolerate many instances registering and releasing
/// the same key independently.
pub trait SheetRegistry<S> {
    /// Makes `sheet` known under `key`. A second `add` for a known key is a
    /// no-op.
    fn add(&mut self, key: &CacheKey, sheet: &SharedSheet<S>);

    /// Records one more user of `key`, attaching the sheet for the first.
    ///
    /// Returns the sheet, or `None` if `key` was never added.
    fn manage(&mut self, key: &CacheKey) -> Option<SharedSheet<S>>;

    /// Records one fewer user of `key`, detaching the sheet after the last.
    fn unmanage(&mut self, key: &CacheKey);

    /// Returns the number of current users of `key`.
    fn refs(&self, key: &CacheKey) -> usize;
}

struct Managed<S> {
    sheet: SharedSheet<S>,
    refs: usize,
}

/// The default [`SheetRegistry`].
///
/// Construct one per process (or one per test) and hand it to the
/// [`StyleRuntime`](crate::StyleRuntime). It is never reset; entries stay
/// known after their last user leaves so a later mount can re-attach.
///
/// ```rust
/// # use understory_scoped_style::{SheetsManager, SheetRegistry};
/// # fn demo<S: understory_scoped_style::StyleSheet>(
/// #     key: understory_scoped_style::CacheKey,
/// #     sheet: understory_scoped_style::SharedSheet<S>,
/// # ) {
/// let mut sheets: SheetsManager<S> = SheetsManager::new();
/// sheets.add(&key, &sheet);
/// sheets.manage(&key); // attaches
/// sheets.manage(&key);
/// sheets.unmanage(&key);
/// assert!(sheet.borrow().is_attached());
/// sheets.unmanage(&key); // detaches
/// assert!(!sheet.borrow().is_attached());
/// # }
/// ```
pub struct SheetsManager<S> {
    entries: HashMap<CacheKey, Managed<S>>,
}

impl<S> SheetsManager<S> {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the number of known sheets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no sheet has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` has at least one user.
    #[must_use]
    pub fn is_managed(&self, key: &CacheKey) -> bool {
        self.entries.get(key).is_some_and(|m| m.refs > 0)
    }

    /// Returns the sheet known under `key`.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<&SharedSheet<S>> {
        self.entries.get(key).map(|m| &m.sheet)
    }
}

impl<S> Default for SheetsManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for SheetsManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, m)| (k, m.refs)))
            .finish()
    }
}

impl<S: StyleSheet> SheetRegistry<S> for SheetsManager<S> {
    fn add(&mut self, key: &CacheKey, sheet: &SharedSheet<S>) {
        self.entries
            .entry(key.clone())
            .or_insert_with(|| Managed {
                sheet: Rc::clone(sheet),
                refs: 0,
            });
    }

    fn manage(&mut self, key: &CacheKey) -> Option<SharedSheet<S>> {
        let managed = self.entries.get_mut(key)?;
        if managed.refs == 0 {
            tracing::trace!(%key, "attaching shared sheet");
            managed.sheet.borrow_mut().attach();
        }
        managed.refs += 1;
        Some(Rc::clone(&managed.sheet))
    }

    fn unmanage(&mut self, key: &CacheKey) {
        let Some(managed) = self.entries.get_mut(key) else {
            tracing::warn!(%key, "unmanage for a sheet that was never added");
            return;
        };
        if managed.refs == 0 {
            tracing::warn!(%key, "unbalanced unmanage ignored");
            return;
        }
        managed.refs -= 1;
        if managed.refs == 0 {
            tracing::trace!(%key, "detaching shared sheet");
            managed.sheet.borrow_mut().detach();
        }
    }

    fn refs(&self, key: &CacheKey) -> usize {
        self.entries.get(key).map_or(0, |m| m.refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StyleEngine;
    use crate::identity::{ComponentKey, IdentityTable, StyleSet};
    use crate::rules::RuleTreeBuilder;
    use crate::testing::{MockEngine, MockSheet, Op, TestConfig};
    use crate::CompileOptions;
    use core::cell::RefCell;

    fn fixture() -> (MockEngine, CacheKey, SharedSheet<MockSheet>) {
        let mut engine = MockEngine::new();
        let tree = RuleTreeBuilder::<TestConfig>::new()
            .nested("root", RuleTreeBuilder::new().literal("a", "b").build())
            .build();
        let sheet = engine.compile(&tree, &CompileOptions::for_static()).unwrap();
        let key = IdentityTable::new().cache_key(ComponentKey::named("x"), &StyleSet::new(tree));
        (engine, key, Rc::new(RefCell::new(sheet)))
    }

    #[test]
    fn attaches_once_and_detaches_after_last_user() {
        let (engine, key, sheet) = fixture();
        let mut sheets = SheetsManager::<MockSheet>::new();
        sheets.add(&key, &sheet);
        sheets.add(&key, &sheet);
        assert_eq!(sheets.len(), 1);

        assert!(sheets.manage(&key).is_some());
        assert!(sheets.manage(&key).is_some());
        assert_eq!(sheets.refs(&key), 2);

        sheets.unmanage(&key);
        assert!(sheet.borrow().is_attached());
        sheets.unmanage(&key);
        assert!(!sheet.borrow().is_attached());

        let attaches = engine.ops().iter().filter(|op| matches!(op, Op::Attach(_))).count();
        let detaches = engine.ops().iter().filter(|op| matches!(op, Op::Detach(_))).count();
        assert_eq!((attaches, detaches), (1, 1));
    }

    #[test]
    fn unbalanced_and_unknown_releases_are_ignored() {
        let (_engine, key, sheet) = fixture();
        let mut sheets = SheetsManager::<MockSheet>::new();

        sheets.unmanage(&key);
        assert!(sheets.manage(&key).is_none(), "manage before add has no sheet");

        sheets.add(&key, &sheet);
        sheets.unmanage(&key);
        assert_eq!(sheets.refs(&key), 0);
        assert!(!sheets.is_managed(&key));
    }
}
