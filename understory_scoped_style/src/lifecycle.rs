// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-instance stylesheet lifecycle.
//!
//! [`InstanceStyles`] walks one component instance through
//! `Uninitialized → Initialized → Attached → Destroyed`:
//!
//! - **initialize** (before first render): fetch the pair's
//!   [`SeparatedStylesheet`](crate::SeparatedStylesheet) from the cache and
//!   compile an instance-owned dynamic sheet if there are dynamic rules.
//! - **attach** (after first render): register the shared static sheet with
//!   the [`SheetRegistry`]; inject the dynamic sheet, then evaluate it against
//!   the current configuration.
//! - **update configuration** (zero or more times): re-evaluate the dynamic
//!   sheet. Before attach the configuration is only stored; attach applies it.
//! - **destroy** (unmount): release the static sheet and drop the dynamic one.
//!
//! A missing static or dynamic sheet is a normal state; every step skips it.

use core::cell::Ref;
use core::fmt;

use crate::classes::{ClassNameMap, merge_class_names};
use crate::engine::{CompileOptions, SharedSheet, StyleEngine, StyleSheet};
use crate::identity::{CacheKey, ComponentKey, StyleSet, UidSource};
use crate::registry::SheetRegistry;
use crate::runtime::StyleRuntime;

/// Lifecycle position of an [`InstanceStyles`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Created, nothing compiled yet.
    Uninitialized,
    /// Sheets compiled, nothing injected yet.
    Initialized,
    /// Sheets injected and up to date with configuration.
    Attached,
    /// Torn down. Terminal.
    Destroyed,
}

/// Errors reported by [`InstanceStyles`].
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError<E> {
    /// The operation is not valid in the current state. Nothing changed.
    #[error("cannot {operation} while {state:?}")]
    InvalidTransition {
        /// The rejected operation.
        operation: &'static str,
        /// The state at the time of the call.
        state: LifecycleState,
    },
    /// The style engine rejected a rule tree.
    #[error("style engine rejected the rule tree")]
    Compile(#[source] E),
}

/// The stylesheet state of one mounted component instance.
pub struct InstanceStyles<E: StyleEngine> {
    state: LifecycleState,
    key: Option<CacheKey>,
    static_sheet: Option<SharedSheet<E::Sheet>>,
    dynamic_sheet: Option<E::Sheet>,
    registered: bool,
    config: E::Config,
    class_names: ClassNameMap,
}

impl<E: StyleEngine> InstanceStyles<E>
where
    E::Config: Default,
{
    /// Creates uninitialized styles with the empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(E::Config::default())
    }
}

impl<E: StyleEngine> Default for InstanceStyles<E>
where
    E::Config: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E: StyleEngine> InstanceStyles<E> {
    /// Creates uninitialized styles with a starting configuration.
    #[must_use]
    pub fn with_config(config: E::Config) -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            key: None,
            static_sheet: None,
            dynamic_sheet: None,
            registered: false,
            config,
            class_names: ClassNameMap::new(),
        }
    }

    fn expect_state(
        &self,
        expected: LifecycleState,
        operation: &'static str,
    ) -> Result<(), LifecycleError<E::Error>> {
        if self.state == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }

    /// Compiles this instance's sheets. Valid only when uninitialized.
    ///
    /// The static half comes from the runtime's cache and is shared; the
    /// dynamic half is compiled fresh for this instance. On error the
    /// instance stays uninitialized and holds nothing.
    pub fn initialize<R, U: UidSource>(
        &mut self,
        runtime: &mut StyleRuntime<E, R, U>,
        component: ComponentKey,
        style_set: &StyleSet<E::Config>,
    ) -> Result<(), LifecycleError<E::Error>> {
        self.expect_state(LifecycleState::Uninitialized, "initialize")?;

        let (key, separated) = runtime
            .cache
            .get_or_create(component, style_set, &mut runtime.engine)
            .map_err(LifecycleError::Compile)?;

        let dynamic_sheet = match separated.dynamic_rules() {
            Some(rules) => Some(
                runtime
                    .engine
                    .compile(rules, &CompileOptions::for_dynamic())
                    .map_err(LifecycleError::Compile)?,
            ),
            None => None,
        };

        tracing::trace!(
            %key,
            has_static = separated.static_sheet().is_some(),
            has_dynamic = dynamic_sheet.is_some(),
            "styles initialized"
        );
        self.static_sheet = separated.static_sheet().cloned();
        self.dynamic_sheet = dynamic_sheet;
        self.key = Some(key);
        self.state = LifecycleState::Initialized;
        self.refresh_class_names();
        Ok(())
    }

    /// Injects this instance's sheets. Valid only when initialized.
    ///
    /// The static sheet is registered once for this instance. The dynamic
    /// sheet is injected first and then evaluated, since resolvers may depend
    /// on context that only exists once the sheet is live.
    pub fn attach<R: SheetRegistry<E::Sheet>, U>(
        &mut self,
        runtime: &mut StyleRuntime<E, R, U>,
    ) -> Result<(), LifecycleError<E::Error>> {
        self.expect_state(LifecycleState::Initialized, "attach")?;

        if let (Some(sheet), Some(key)) = (&self.static_sheet, &self.key) {
            runtime.sheets.add(key, sheet);
            self.registered = runtime.sheets.manage(key).is_some();
        }
        if let Some(sheet) = &mut self.dynamic_sheet {
            sheet.attach();
            sheet.update(&self.config);
        }

        tracing::trace!(registered = self.registered, "styles attached");
        self.state = LifecycleState::Attached;
        self.refresh_class_names();
        Ok(())
    }

    /// Applies a new configuration.
    ///
    /// Valid once initialized and until destroyed. Once attached, the dynamic
    /// sheet (if any) is re-evaluated immediately; before that, the value is
    /// kept for [`attach`](Self::attach). The static sheet is never touched.
    pub fn update_config(&mut self, config: E::Config) -> Result<(), LifecycleError<E::Error>> {
        match self.state {
            LifecycleState::Initialized => {
                self.config = config;
            }
            LifecycleState::Attached => {
                self.config = config;
                if let Some(sheet) = &mut self.dynamic_sheet {
                    sheet.update(&self.config);
                }
                self.refresh_class_names();
            }
            state => {
                return Err(LifecycleError::InvalidTransition {
                    operation: "update configuration",
                    state,
                });
            }
        }
        Ok(())
    }

    /// Tears down this instance's sheets.
    ///
    /// Valid in every state and idempotent. The static sheet is released from
    /// the registry only if this instance registered it; the registry decides
    /// when the shared sheet actually leaves the medium. The dynamic sheet is
    /// detached and dropped.
    pub fn destroy<R: SheetRegistry<E::Sheet>, U>(&mut self, runtime: &mut StyleRuntime<E, R, U>) {
        if self.state == LifecycleState::Destroyed {
            return;
        }
        if self.registered {
            if let Some(key) = &self.key {
                runtime.sheets.unmanage(key);
            }
            self.registered = false;
        }
        if let Some(mut sheet) = self.dynamic_sheet.take() {
            if sheet.is_attached() {
                sheet.detach();
            }
        }
        self.static_sheet = None;
        self.class_names = ClassNameMap::new();

        tracing::trace!(from = ?self.state, "styles destroyed");
        self.state = LifecycleState::Destroyed;
    }

    /// Merges the current static and dynamic class names.
    #[must_use]
    pub fn compute_class_names(&self) -> ClassNameMap {
        let statics: Option<Ref<'_, E::Sheet>> = self.static_sheet.as_ref().map(|s| s.borrow());
        merge_class_names(
            statics.as_deref().map(|s| s.classes()),
            self.dynamic_sheet.as_ref().map(|s| s.classes()),
        )
    }

    fn refresh_class_names(&mut self) {
        self.class_names = self.compute_class_names();
    }

    /// Returns the class names as of the last transition.
    #[must_use]
    pub fn class_names(&self) -> &ClassNameMap {
        &self.class_names
    }

    /// Returns the merged class string of the first declared rule.
    ///
    /// See [`ClassNameMap::primary`].
    #[must_use]
    pub fn primary_class_name(&self) -> Option<&str> {
        self.class_names.primary()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Returns the cache key, once initialized.
    #[must_use]
    pub fn cache_key(&self) -> Option<&CacheKey> {
        self.key.as_ref()
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &E::Config {
        &self.config
    }

    /// Returns the shared static sheet, if any.
    #[must_use]
    pub fn static_sheet(&self) -> Option<&SharedSheet<E::Sheet>> {
        self.static_sheet.as_ref()
    }

    /// Returns the instance-owned dynamic sheet, if any.
    #[must_use]
    pub fn dynamic_sheet(&self) -> Option<&E::Sheet> {
        self.dynamic_sheet.as_ref()
    }

    /// Returns `true` while this instance holds a registry reference.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

impl<E: StyleEngine> fmt::Debug for InstanceStyles<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceStyles")
            .field("state", &self.state)
            .field("key", &self.key)
            .field("static_sheet", &self.static_sheet.is_some())
            .field("dynamic_sheet", &self.dynamic_sheet.is_some())
            .field("registered", &self.registered)
            .field("class_names", &self.class_names)
            .finish()
    }
}
