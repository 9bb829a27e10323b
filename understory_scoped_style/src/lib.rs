// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Scoped Style: generated, component-scoped stylesheets.
//!
//! This crate splits a component's style rules into a **static** half, fixed
//! CSS compiled once and shared by every instance, and a **dynamic** half,
//! rules computed from a configuration object and compiled per instance. It
//! keeps the resulting sheets attached in lockstep with the component's
//! lifecycle and exposes merged class names.
//!
//! ## Core Concepts
//!
//! - [`RuleTree`]: rule name → [`RuleValue`] (`Literal`, `Nested`, or
//!   `Resolver`), arbitrarily nested.
//! - [`partition`] / [`separate`]: classify a tree into static and dynamic
//!   halves; `separate` also compiles the static half.
//! - [`StylesheetCache`]: one [`SeparatedStylesheet`] per
//!   ([`ComponentKey`], [`StyleSet`]) pair, keyed by identity.
//! - [`SheetRegistry`] / [`SheetsManager`]: reference-counted attachment of
//!   shared static sheets.
//! - [`InstanceStyles`]: the per-instance
//!   `Uninitialized → Initialized → Attached → Destroyed` state machine.
//! - [`merge_class_names`]: static classes first, dynamic appended.
//! - [`ConfigBridge`]: the request/deliver/refresh configuration handshake.
//! - [`Styled`]: composition wrapper exposing host lifecycle entry points.
//!
//! CSS generation lives behind the [`StyleEngine`] and [`StyleSheet`] traits.
//! `understory_scoped_style_ref` provides an in-memory implementation.
//!
//! ## Example
//!
//! ```rust
//! use understory_scoped_style::{
//!     ComponentKey, InstanceStyles, RuleTreeBuilder, StyleRuntime, StyleSet,
//! };
//! # use understory_scoped_style::{ClassNameMap, CompileOptions, RuleTree, StyleEngine, StyleSheet};
//! # #[derive(Debug, thiserror::Error)]
//! # #[error("never")]
//! # struct Never;
//! # struct Sheet { classes: ClassNameMap, attached: bool }
//! # impl StyleSheet for Sheet {
//! #     type Config = Theme;
//! #     fn attach(&mut self) { self.attached = true; }
//! #     fn detach(&mut self) { self.attached = false; }
//! #     fn is_attached(&self) -> bool { self.attached }
//! #     fn update(&mut self, _: &Theme) {}
//! #     fn classes(&self) -> &ClassNameMap { &self.classes }
//! # }
//! # #[derive(Default)]
//! # struct Engine { next: u32 }
//! # impl StyleEngine for Engine {
//! #     type Config = Theme;
//! #     type Sheet = Sheet;
//! #     type Error = Never;
//! #     fn compile(&mut self, rules: &RuleTree<Theme>, _: &CompileOptions) -> Result<Sheet, Never> {
//! #         self.next += 1;
//! #         let n = self.next;
//! #         let classes = rules.names().map(|r| (r.to_string(), format!("{r}-{n}"))).collect();
//! #         Ok(Sheet { classes, attached: false })
//! #     }
//! # }
//!
//! #[derive(Default)]
//! struct Theme {
//!     accent: String,
//! }
//!
//! struct Button;
//!
//! let button_styles = StyleSet::new(
//!     RuleTreeBuilder::new()
//!         .nested(
//!             "root",
//!             RuleTreeBuilder::new()
//!                 .literal("padding", "4px 8px")
//!                 .resolver("color", |t: &Theme| t.accent.clone())
//!                 .build(),
//!         )
//!         .build(),
//! );
//!
//! let mut runtime = StyleRuntime::new(Engine::default());
//! let mut styles = InstanceStyles::new();
//!
//! styles
//!     .initialize(&mut runtime, ComponentKey::of::<Button>(), &button_styles)
//!     .unwrap();
//! styles.attach(&mut runtime).unwrap();
//! styles
//!     .update_config(Theme { accent: "rebeccapurple".into() })
//!     .unwrap();
//!
//! // Static class first, then this instance's dynamic class.
//! assert_eq!(styles.primary_class_name(), Some("root-1 root-2"));
//!
//! styles.destroy(&mut runtime);
//! ```
//!
//! ## Identity
//!
//! Caching is by identity, not value. Keep one [`StyleSet`] per component
//! definition and clone the handle; see the [`identity`] module.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It is single-threaded by design:
//! shared sheets are `Rc<RefCell<_>>`.

#![no_std]

extern crate alloc;

mod bridge;
mod cache;
mod classes;
mod classify;
mod component;
mod engine;
pub mod identity;
mod lifecycle;
mod registry;
mod rules;
mod runtime;

#[cfg(test)]
mod testing;

pub use bridge::{ConfigBridge, ConfigEnvironment, ConfigEvent, ConfigMessage, InstanceId};
pub use cache::StylesheetCache;
pub use classes::{ClassNameMap, merge_class_names};
pub use classify::{
    Partition, SeparatedStylesheet, extract_dynamic, extract_static, partition, separate,
};
pub use component::{Styled, StyledComponent};
pub use engine::{CompileOptions, SharedSheet, StyleEngine, StyleSheet};
pub use identity::{CacheKey, ComponentKey, IdentityTable, SequentialUids, StyleSet, Uid, UidSource};
pub use lifecycle::{InstanceStyles, LifecycleError, LifecycleState};
pub use registry::{SheetRegistry, SheetsManager};
pub use rules::{Resolver, RuleTree, RuleTreeBuilder, RuleValue};
pub use runtime::StyleRuntime;
