// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Class-name maps and the static/dynamic merge.

use alloc::string::String;
use core::fmt;

use smallvec::SmallVec;

/// An insertion-ordered mapping from rule name to class-name string.
///
/// Most components declare a handful of rules, so entries live inline until
/// the map grows past four of them.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClassNameMap {
    entries: SmallVec<[(String, String); 4]>,
}

impl ClassNameMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the class string for `rule`.
    #[must_use]
    pub fn get(&self, rule: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == rule)
            .map(|(_, class)| class.as_str())
    }

    /// Sets the class string for `rule`, keeping its position if present.
    pub fn insert(&mut self, rule: impl Into<String>, class: impl Into<String>) {
        let rule = rule.into();
        let class = class.into();
        match self.entries.iter_mut().find(|(name, _)| *name == rule) {
            Some((_, slot)) => *slot = class,
            None => self.entries.push((rule, class)),
        }
    }

    /// Iterates `(rule, class)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(name, class)| (name.as_str(), class.as_str()))
    }

    /// Returns the first entry.
    #[must_use]
    pub fn first(&self) -> Option<(&str, &str)> {
        self.iter().next()
    }

    /// Returns the class string of the first declared rule.
    ///
    /// This is a convenience for components that style a single root
    /// element. It does not imply that a component has only one class.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.first().map(|(_, class)| class)
    }
}

impl fmt::Debug for ClassNameMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for ClassNameMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (rule, class) in iter {
            map.insert(rule, class);
        }
        map
    }
}

/// Merges static and dynamic class names.
///
/// Static entries come first, in their own order. A dynamic entry for a rule
/// that already has a static class is appended after a single space; any
/// other dynamic entry is added on its own. Static classes always precede
/// dynamic ones, so dynamic declarations win the cascade at equal
/// specificity.
///
/// ```rust
/// use understory_scoped_style::{ClassNameMap, merge_class_names};
///
/// let statics: ClassNameMap = [("a", "c1"), ("b", "c2")].into_iter().collect();
/// let dynamics: ClassNameMap = [("b", "c3"), ("d", "c4")].into_iter().collect();
///
/// let merged = merge_class_names(Some(&statics), Some(&dynamics));
/// assert_eq!(merged.get("a"), Some("c1"));
/// assert_eq!(merged.get("b"), Some("c2 c3"));
/// assert_eq!(merged.get("d"), Some("c4"));
/// ```
#[must_use]
pub fn merge_class_names(
    statics: Option<&ClassNameMap>,
    dynamics: Option<&ClassNameMap>,
) -> ClassNameMap {
    let mut merged = statics.cloned().unwrap_or_default();
    let Some(dynamics) = dynamics else {
        return merged;
    };
    for (rule, class) in dynamics.iter() {
        match merged.entries.iter_mut().find(|(name, _)| name == rule) {
            Some((_, existing)) => {
                existing.push(' ');
                existing.push_str(class);
            }
            None => merged.entries.push((rule.into(), class.into())),
        }
    }
    merged
}
