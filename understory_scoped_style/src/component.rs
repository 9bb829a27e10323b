// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle composition for styled components.
//!
//! [`Styled`] wraps a [`StyledComponent`] and drives its [`InstanceStyles`]
//! and [`ConfigBridge`] from four host-facing entry points. Each entry point
//! runs the wrapped component's hook first and then the style work:
//!
//! | entry point  | host moment               | style work                        |
//! |--------------|---------------------------|-----------------------------------|
//! | `initialize` | before first render       | compile sheets, connect bridge    |
//! | `mounted`    | first render complete     | attach sheets                     |
//! | `attached`   | rendered tree in document | publish class names               |
//! | `destroy`    | unmount                   | release sheets, disconnect bridge |

use core::fmt;

use crate::bridge::{ConfigBridge, ConfigEnvironment, ConfigMessage, InstanceId};
use crate::classes::ClassNameMap;
use crate::engine::StyleEngine;
use crate::identity::{ComponentKey, StyleSet, UidSource};
use crate::lifecycle::{InstanceStyles, LifecycleError};
use crate::registry::SheetRegistry;
use crate::runtime::StyleRuntime;

/// A component that carries a style set.
///
/// All hooks default to doing nothing.
pub trait StyledComponent<C> {
    /// Returns the component's identity. Defaults to the Rust type.
    fn component_key(&self) -> ComponentKey
    where
        Self: Sized + 'static,
    {
        ComponentKey::of::<Self>()
    }

    /// Returns the component's style set.
    ///
    /// Return the same identity every time (clone a handle stored once per
    /// component type); a fresh [`StyleSet`] per call defeats sharing.
    fn style_set(&self) -> StyleSet<C>;

    /// Called before the first render.
    fn initialize(&mut self) {}

    /// Called after the first render.
    fn mounted(&mut self) {}

    /// Called once the rendered tree is in the document.
    fn attached(&mut self) {}

    /// Called on unmount.
    fn destroyed(&mut self) {}

    /// Called whenever the merged class names may have changed.
    fn class_names_changed(&mut self, classes: &ClassNameMap) {
        let _ = classes;
    }
}

/// A component wrapped with scoped stylesheet management.
pub struct Styled<T, E: StyleEngine> {
    component: T,
    styles: InstanceStyles<E>,
    bridge: ConfigBridge,
}

impl<T, E> Styled<T, E>
where
    T: StyledComponent<E::Config> + 'static,
    E: StyleEngine,
    E::Config: Default,
{
    /// Wraps `component` as instance `instance`.
    #[must_use]
    pub fn new(component: T, instance: InstanceId) -> Self {
        Self {
            component,
            styles: InstanceStyles::new(),
            bridge: ConfigBridge::new(instance),
        }
    }

    /// Initializes the component, compiles its sheets, and requests
    /// configuration from `env`.
    pub fn initialize<R, U: UidSource>(
        &mut self,
        runtime: &mut StyleRuntime<E, R, U>,
        env: &mut impl ConfigEnvironment,
    ) -> Result<(), LifecycleError<E::Error>> {
        self.component.initialize();
        let style_set = self.component.style_set();
        self.styles
            .initialize(runtime, self.component.component_key(), &style_set)?;
        self.bridge.connect(env);
        Ok(())
    }

    /// Finishes the first render and attaches the sheets.
    pub fn mounted<R: SheetRegistry<E::Sheet>, U>(
        &mut self,
        runtime: &mut StyleRuntime<E, R, U>,
    ) -> Result<(), LifecycleError<E::Error>> {
        self.component.mounted();
        self.styles.attach(runtime)?;
        self.publish();
        Ok(())
    }

    /// Publishes the current class names once the tree is in the document.
    pub fn attached(&mut self) {
        self.component.attached();
        self.publish();
    }

    /// Routes a configuration message from the environment.
    pub fn on_config(
        &mut self,
        message: ConfigMessage<E::Config>,
        env: &mut impl ConfigEnvironment,
    ) -> Result<(), LifecycleError<E::Error>> {
        if let Some(config) = self.bridge.receive(message, env) {
            self.styles.update_config(config)?;
            self.publish();
        }
        Ok(())
    }

    /// Tears down the component, its sheets, and its bridge.
    pub fn destroy<R: SheetRegistry<E::Sheet>, U>(
        &mut self,
        runtime: &mut StyleRuntime<E, R, U>,
        env: &mut impl ConfigEnvironment,
    ) {
        self.component.destroyed();
        self.styles.destroy(runtime);
        self.bridge.disconnect(env);
    }

    fn publish(&mut self) {
        self.component
            .class_names_changed(self.styles.class_names());
    }
}

impl<T, E: StyleEngine> Styled<T, E> {
    /// Returns the wrapped component.
    #[must_use]
    pub fn component(&self) -> &T {
        &self.component
    }

    /// Returns the wrapped component mutably.
    pub fn component_mut(&mut self) -> &mut T {
        &mut self.component
    }

    /// Returns the instance's stylesheet state.
    #[must_use]
    pub fn styles(&self) -> &InstanceStyles<E> {
        &self.styles
    }

    /// Returns the configuration bridge.
    #[must_use]
    pub fn bridge(&self) -> &ConfigBridge {
        &self.bridge
    }

    /// Returns the instance id.
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        self.bridge.instance()
    }

    /// Returns the merged class names.
    #[must_use]
    pub fn class_names(&self) -> &ClassNameMap {
        self.styles.class_names()
    }
}

impl<T: fmt::Debug, E: StyleEngine> fmt::Debug for Styled<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Styled")
            .field("component", &self.component)
            .field("styles", &self.styles)
            .field("bridge", &self.bridge)
            .finish()
    }
}
