// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The explicitly constructed shared state behind every styled instance.

use core::fmt;

use crate::cache::StylesheetCache;
use crate::engine::StyleEngine;
use crate::identity::{SequentialUids, UidSource};
use crate::registry::SheetsManager;

/// Owns the style engine, the separated-sheet cache, and the shared sheet
/// registry.
///
/// Create one when the application starts and pass it to every lifecycle
/// call. It is never reset. Tests build a fresh runtime per case instead of
/// sharing global state.
pub struct StyleRuntime<E: StyleEngine, R = SheetsManager<<E as StyleEngine>::Sheet>, U = SequentialUids>
{
    pub(crate) engine: E,
    pub(crate) cache: StylesheetCache<E, U>,
    pub(crate) sheets: R,
}

impl<E: StyleEngine> StyleRuntime<E> {
    /// Creates a runtime with the default registry and identifier source.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self::from_parts(engine, SheetsManager::new(), SequentialUids::new())
    }
}

impl<E: StyleEngine, R, U: UidSource> StyleRuntime<E, R, U> {
    /// Creates a runtime from a custom registry and identifier source.
    #[must_use]
    pub fn from_parts(engine: E, sheets: R, uids: U) -> Self {
        Self {
            engine,
            cache: StylesheetCache::with_uids(uids),
            sheets,
        }
    }
}

impl<E: StyleEngine, R, U> StyleRuntime<E, R, U> {
    /// Returns the style engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the style engine mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Returns the separated-sheet cache.
    #[must_use]
    pub fn cache(&self) -> &StylesheetCache<E, U> {
        &self.cache
    }

    /// Returns the shared sheet registry.
    #[must_use]
    pub fn sheets(&self) -> &R {
        &self.sheets
    }
}

impl<E, R, U> fmt::Debug for StyleRuntime<E, R, U>
where
    E: StyleEngine + fmt::Debug,
    R: fmt::Debug,
    U: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleRuntime")
            .field("engine", &self.engine)
            .field("cache", &self.cache)
            .field("sheets", &self.sheets)
            .finish()
    }
}
