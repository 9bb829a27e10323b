// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory configuration provider.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;

use understory_scoped_style::{ConfigEnvironment, ConfigEvent, ConfigMessage, InstanceId};

/// Answers configuration requests from registered instances.
///
/// Replies are queued rather than delivered, since the hub cannot reach into
/// instances. The host drains the queue with [`pop`](Self::pop) and routes
/// each message to its instance.
pub struct ConfigHub<C> {
    config: Option<C>,
    registered: Vec<InstanceId>,
    outbox: VecDeque<(InstanceId, ConfigMessage<C>)>,
}

impl<C: Clone> ConfigHub<C> {
    /// Creates a hub with no configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            registered: Vec::new(),
            outbox: VecDeque::new(),
        }
    }

    /// Creates a hub holding `config`.
    #[must_use]
    pub fn with_config(config: C) -> Self {
        Self {
            config: Some(config),
            ..Self::new()
        }
    }

    /// Replaces the configuration and tells every registered instance.
    pub fn set_config(&mut self, config: C) {
        self.config = Some(config);
        self.broadcast_refresh();
    }

    /// Clears the configuration; later deliveries carry nothing.
    pub fn clear_config(&mut self) {
        self.config = None;
        self.broadcast_refresh();
    }

    fn broadcast_refresh(&mut self) {
        tracing::trace!(instances = self.registered.len(), "broadcasting refresh");
        for &id in &self.registered {
            self.outbox.push_back((id, ConfigMessage::Refresh));
        }
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> Option<&C> {
        self.config.as_ref()
    }

    /// Returns the registered instances in registration order.
    #[must_use]
    pub fn registered(&self) -> &[InstanceId] {
        &self.registered
    }

    /// Returns the number of queued messages.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Takes the oldest queued message.
    pub fn pop(&mut self) -> Option<(InstanceId, ConfigMessage<C>)> {
        self.outbox.pop_front()
    }
}

impl<C: Clone> Default for ConfigHub<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clone> ConfigEnvironment for ConfigHub<C> {
    fn notify(&mut self, from: InstanceId, event: ConfigEvent) {
        match event {
            ConfigEvent::Registered => {
                if !self.registered.contains(&from) {
                    self.registered.push(from);
                }
            }
            ConfigEvent::Deregistered => {
                self.registered.retain(|id| *id != from);
                self.outbox.retain(|(id, _)| *id != from);
            }
            ConfigEvent::Request => {
                if self.registered.contains(&from) {
                    self.outbox
                        .push_back((from, ConfigMessage::Deliver(self.config.clone())));
                } else {
                    tracing::debug!(instance = %from, "request from unregistered instance");
                }
            }
            ConfigEvent::Deliver | ConfigEvent::Refresh => {
                tracing::debug!(instance = %from, %event, "ignoring provider-side event");
            }
        }
    }
}

impl<C> fmt::Debug for ConfigHub<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigHub")
            .field("has_config", &self.config.is_some())
            .field("registered", &self.registered)
            .field("pending", &self.outbox.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_answered_with_the_current_configuration() {
        let mut hub = ConfigHub::with_config(3_u32);
        let id = InstanceId::new(1);

        hub.notify(id, ConfigEvent::Request);
        assert_eq!(hub.pending(), 0, "unregistered requests are ignored");

        hub.notify(id, ConfigEvent::Registered);
        hub.notify(id, ConfigEvent::Request);
        assert_eq!(hub.pop(), Some((id, ConfigMessage::Deliver(Some(3)))));
    }

    #[test]
    fn set_config_refreshes_every_registered_instance() {
        let mut hub = ConfigHub::new();
        let (a, b) = (InstanceId::new(1), InstanceId::new(2));
        hub.notify(a, ConfigEvent::Registered);
        hub.notify(b, ConfigEvent::Registered);
        hub.notify(a, ConfigEvent::Registered);

        hub.set_config("dark");
        assert_eq!(hub.registered(), [a, b]);
        assert_eq!(hub.pop(), Some((a, ConfigMessage::Refresh)));
        assert_eq!(hub.pop(), Some((b, ConfigMessage::Refresh)));
        assert_eq!(hub.pop(), None);
    }

    #[test]
    fn deregistering_drops_queued_messages() {
        let mut hub = ConfigHub::<u8>::new();
        let (a, b) = (InstanceId::new(1), InstanceId::new(2));
        hub.notify(a, ConfigEvent::Registered);
        hub.notify(b, ConfigEvent::Registered);
        hub.clear_config();

        hub.notify(a, ConfigEvent::Deregistered);
        assert_eq!(hub.registered(), [b]);
        assert_eq!(hub.pop(), Some((b, ConfigMessage::Refresh)));
        assert_eq!(hub.pending(), 0);
    }
}
