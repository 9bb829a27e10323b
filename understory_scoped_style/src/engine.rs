// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The style-engine seam.
//!
//! This crate never produces CSS text itself. A [`StyleEngine`] compiles a
//! [`RuleTree`] into a [`StyleSheet`] handle, and the handle owns injection
//! into whatever style medium the embedder uses (a document, a test buffer,
//! a native renderer).

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;

use crate::classes::ClassNameMap;
use crate::rules::RuleTree;

/// A sheet handle shared between every instance of one component/style-set
/// pair.
///
/// Instances only read through it; the [`SheetRegistry`](crate::SheetRegistry)
/// is the one party that toggles its attachment.
pub type SharedSheet<S> = Rc<RefCell<S>>;

/// Options passed to [`StyleEngine::compile`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// When `true`, [`StyleSheet::update`] regenerates injected CSS
    /// immediately. Unlinked sheets pick up new output on the next attach.
    pub link: bool,
    /// Optional human-readable label, typically folded into class names.
    pub meta: Option<String>,
}

impl CompileOptions {
    /// Options for a shared static sheet: unlinked, since it never updates.
    #[must_use]
    pub fn for_static() -> Self {
        Self {
            link: false,
            meta: None,
        }
    }

    /// Options for an instance-owned dynamic sheet: linked.
    #[must_use]
    pub fn for_dynamic() -> Self {
        Self {
            link: true,
            meta: None,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }
}

/// A compiled stylesheet handle.
pub trait StyleSheet {
    /// The configuration type resolver rules are evaluated against.
    type Config;

    /// Injects the sheet into the active style medium.
    fn attach(&mut self);

    /// Removes the sheet from the active style medium.
    fn detach(&mut self);

    /// Returns `true` while the sheet is injected.
    fn is_attached(&self) -> bool;

    /// Re-evaluates resolver rules against `config`.
    ///
    /// Class names keep their identity; only the CSS behind them changes.
    fn update(&mut self, config: &Self::Config);

    /// Returns the generated class names, keyed by rule name.
    fn classes(&self) -> &ClassNameMap;
}

/// Compiles rule trees into [`StyleSheet`] handles.
pub trait StyleEngine {
    /// The configuration type resolver rules are evaluated against.
    type Config;
    /// The handle type produced by [`compile`](Self::compile).
    type Sheet: StyleSheet<Config = Self::Config>;
    /// Error reported for rule trees the engine cannot compile.
    type Error: core::error::Error + 'static;

    /// Compiles `rules` into a detached sheet.
    fn compile(
        &mut self,
        rules: &RuleTree<Self::Config>,
        options: &CompileOptions,
    ) -> Result<Self::Sheet, Self::Error>;
}
