// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Scoped Style Reference Engine.
//!
//! This crate provides a small, in-memory implementation of the
//! [`StyleEngine`](understory_scoped_style::StyleEngine) and
//! [`ConfigEnvironment`](understory_scoped_style::ConfigEnvironment) seams
//! for **tests and experimentation**:
//!
//! - [`RefEngine`] compiles rule trees to CSS text with scoped class names.
//! - [`StyleMedium`] records what is injected, in injection order.
//! - [`ConfigHub`] answers configuration requests and broadcasts refreshes.
//!
//! It is not a CSS validator. Property names and values pass through as
//! written (apart from `camelCase` to `kebab-case`).
//!
//! ## Example
//!
//! ```rust
//! use understory_scoped_style::{
//!     ComponentKey, InstanceStyles, RuleTreeBuilder, StyleRuntime, StyleSet,
//! };
//! use understory_scoped_style_ref::{RefEngine, StyleMedium};
//!
//! struct Badge;
//!
//! let styles = StyleSet::new(
//!     RuleTreeBuilder::new()
//!         .nested(
//!             "root",
//!             RuleTreeBuilder::new()
//!                 .literal("borderRadius", "4px")
//!                 .resolver("color", |accent: &String| accent.clone())
//!                 .build(),
//!         )
//!         .build(),
//! );
//!
//! let medium = StyleMedium::new();
//! let mut runtime = StyleRuntime::new(RefEngine::new(&medium));
//! let mut badge = InstanceStyles::new();
//! badge
//!     .initialize(&mut runtime, ComponentKey::of::<Badge>(), &styles)
//!     .unwrap();
//! badge.attach(&mut runtime).unwrap();
//! badge.update_config("teal".to_string()).unwrap();
//!
//! assert_eq!(badge.primary_class_name(), Some("root-1 root-2"));
//! assert_eq!(
//!     medium.css(),
//!     ".root-1 {\n  border-radius: 4px;\n}\n.root-2 {\n  color: teal;\n}\n"
//! );
//!
//! badge.destroy(&mut runtime);
//! assert!(medium.is_empty());
//! ```

#![no_std]

extern crate alloc;

mod css;
mod engine;
mod hub;
mod medium;

pub use engine::{CompileError, RefEngine, RefSheet};
pub use hub::ConfigHub;
pub use medium::{SheetId, StyleMedium};
