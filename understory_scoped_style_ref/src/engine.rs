// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reference [`StyleEngine`].

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use understory_scoped_style::{ClassNameMap, CompileOptions, RuleTree, StyleEngine, StyleSheet};

use crate::css::{self, Block};
use crate::medium::{SheetId, StyleMedium};

/// Errors reported by [`RefEngine::compile`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A top-level entry that is neither a nested rule nor an at-rule.
    #[error("top-level rule `{rule}` must be a nested block or an at-rule")]
    TopLevelValue {
        /// The offending rule name.
        rule: String,
    },
    /// A top-level entry with an empty name.
    #[error("rule names must not be empty")]
    EmptyName,
}

/// Compiles rule trees to CSS text injected into a [`StyleMedium`].
///
/// Class names are `{prefix}{meta}-{rule}-{sheet}` (the `meta-` part only
/// when [`CompileOptions::meta`] is set), so two sheets compiled from the
/// same rule names never collide.
pub struct RefEngine<C> {
    medium: StyleMedium,
    prefix: String,
    next_sheet: SheetId,
    _config: PhantomData<fn(&C)>,
}

impl<C> RefEngine<C> {
    /// Creates an engine injecting into `medium`.
    #[must_use]
    pub fn new(medium: &StyleMedium) -> Self {
        Self {
            medium: medium.clone(),
            prefix: String::new(),
            next_sheet: 1,
            _config: PhantomData,
        }
    }

    /// Sets a prefix for every generated class name.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Returns the medium sheets are injected into.
    #[must_use]
    pub fn medium(&self) -> &StyleMedium {
        &self.medium
    }

    /// Returns how many sheets have been compiled.
    #[must_use]
    pub fn compiled(&self) -> u32 {
        self.next_sheet - 1
    }
}

impl<C> fmt::Debug for RefEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefEngine")
            .field("prefix", &self.prefix)
            .field("compiled", &self.compiled())
            .finish_non_exhaustive()
    }
}

impl<C> StyleEngine for RefEngine<C> {
    type Config = C;
    type Sheet = RefSheet<C>;
    type Error = CompileError;

    fn compile(
        &mut self,
        rules: &RuleTree<C>,
        options: &CompileOptions,
    ) -> Result<RefSheet<C>, CompileError> {
        let id = self.next_sheet;
        let stem = match &options.meta {
            Some(meta) => format!("{}{meta}-", self.prefix),
            None => self.prefix.clone(),
        };
        let class_for = |rule: &str| format!("{stem}{rule}-{id}");

        let mut classes = ClassNameMap::new();
        let blocks = css::lower(rules, &mut classes, &class_for)?;
        self.next_sheet += 1;

        tracing::debug!(sheet = id, link = options.link, rules = classes.len(), "compiled sheet");
        let text = css::render(&blocks, None);
        Ok(RefSheet {
            id,
            blocks,
            classes,
            medium: self.medium.clone(),
            link: options.link,
            attached: false,
            text,
        })
    }
}

/// A sheet compiled by [`RefEngine`].
pub struct RefSheet<C> {
    id: SheetId,
    blocks: Vec<Block<C>>,
    classes: ClassNameMap,
    medium: StyleMedium,
    link: bool,
    attached: bool,
    text: String,
}

impl<C> RefSheet<C> {
    /// Returns the sheet's id within its medium.
    #[must_use]
    pub fn id(&self) -> SheetId {
        self.id
    }

    /// Returns `true` if updates rewrite the injected text immediately.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.link
    }

    /// Returns the sheet's current CSS, whether or not it is injected.
    ///
    /// Resolver declarations are omitted until the first
    /// [`update`](StyleSheet::update).
    #[must_use]
    pub fn css(&self) -> &str {
        &self.text
    }
}

impl<C> StyleSheet for RefSheet<C> {
    type Config = C;

    fn attach(&mut self) {
        self.medium.inject(self.id, self.text.clone());
        self.attached = true;
    }

    fn detach(&mut self) {
        self.medium.remove(self.id);
        self.attached = false;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn update(&mut self, config: &C) {
        self.text = css::render(&self.blocks, Some(config));
        if self.attached && self.link {
            self.medium.rewrite(self.id, self.text.clone());
        }
    }

    fn classes(&self) -> &ClassNameMap {
        &self.classes
    }
}

impl<C> Drop for RefSheet<C> {
    fn drop(&mut self) {
        if self.attached {
            self.medium.remove(self.id);
        }
    }
}

impl<C> fmt::Debug for RefSheet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefSheet")
            .field("id", &self.id)
            .field("classes", &self.classes)
            .field("link", &self.link)
            .field("attached", &self.attached)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}
