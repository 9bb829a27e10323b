// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration handshake between an instance and its environment.
//!
//! The host's event layer is modeled by [`ConfigEnvironment`], which receives
//! the notifications an instance fires, and [`ConfigMessage`], which the host
//! routes back to the instance. The protocol:
//!
//! 1. On initialization the instance fires [`ConfigEvent::Registered`] and
//!    then [`ConfigEvent::Request`].
//! 2. The environment answers with [`ConfigMessage::Deliver`].
//! 3. Whenever configuration changes, the environment sends
//!    [`ConfigMessage::Refresh`]; the instance re-requests.
//! 4. On teardown the instance fires [`ConfigEvent::Deregistered`].
//!
//! Every delivery becomes one configuration update for the instance's
//! [`InstanceStyles`](crate::InstanceStyles).

use core::fmt;

/// Identifies one component instance within its environment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Creates an instance id.
    #[must_use]
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The notifications of the configuration protocol.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConfigEvent {
    /// An instance asks for the current configuration.
    Request,
    /// The environment hands configuration to an instance.
    Deliver,
    /// The environment announces that configuration changed.
    Refresh,
    /// An instance joined the environment.
    Registered,
    /// An instance left the environment.
    Deregistered,
}

impl ConfigEvent {
    /// Returns the wire name of this notification.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Request => "config-request",
            Self::Deliver => "config-deliver",
            Self::Refresh => "config-refresh",
            Self::Registered => "component-registered",
            Self::Deregistered => "component-deregistered",
        }
    }
}

impl fmt::Display for ConfigEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A notification from the environment to one instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigMessage<C> {
    /// The current configuration; `None` when the environment has none.
    Deliver(Option<C>),
    /// Configuration changed; the instance should request it again.
    Refresh,
}

impl<C> ConfigMessage<C> {
    /// Returns the notification kind.
    #[must_use]
    pub fn event(&self) -> ConfigEvent {
        match self {
            Self::Deliver(_) => ConfigEvent::Deliver,
            Self::Refresh => ConfigEvent::Refresh,
        }
    }
}

/// The instance-facing side of the host's event layer.
pub trait ConfigEnvironment {
    /// Receives a notification fired by instance `from`.
    ///
    /// Only [`ConfigEvent::Request`], [`ConfigEvent::Registered`] and
    /// [`ConfigEvent::Deregistered`] flow in this direction.
    fn notify(&mut self, from: InstanceId, event: ConfigEvent);
}

/// Per-instance protocol state.
#[derive(Clone, Debug)]
pub struct ConfigBridge {
    instance: InstanceId,
    connected: bool,
    deliveries: u64,
}

impl ConfigBridge {
    /// Creates a disconnected bridge for `instance`.
    #[must_use]
    pub fn new(instance: InstanceId) -> Self {
        Self {
            instance,
            connected: false,
            deliveries: 0,
        }
    }

    /// Returns the instance this bridge speaks for.
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Returns `true` between [`connect`](Self::connect) and
    /// [`disconnect`](Self::disconnect).
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Returns how many deliveries have been accepted.
    #[must_use]
    pub fn deliveries(&self) -> u64 {
        self.deliveries
    }

    /// Registers with `env` and requests the current configuration.
    pub fn connect(&mut self, env: &mut impl ConfigEnvironment) {
        if self.connected {
            return;
        }
        self.connected = true;
        env.notify(self.instance, ConfigEvent::Registered);
        env.notify(self.instance, ConfigEvent::Request);
    }

    /// Requests the current configuration again.
    pub fn request(&mut self, env: &mut impl ConfigEnvironment) {
        if self.connected {
            env.notify(self.instance, ConfigEvent::Request);
        }
    }

    /// Handles a message from the environment.
    ///
    /// Returns the configuration to apply for a delivery: the payload, or
    /// `C::default()` if the delivery carried nothing. A refresh triggers a
    /// new request and returns `None`. Messages arriving while disconnected
    /// are dropped.
    pub fn receive<C: Default>(
        &mut self,
        message: ConfigMessage<C>,
        env: &mut impl ConfigEnvironment,
    ) -> Option<C> {
        if !self.connected {
            tracing::debug!(
                instance = %self.instance,
                event = %message.event(),
                "dropping configuration message for disconnected instance"
            );
            return None;
        }
        match message {
            ConfigMessage::Deliver(config) => {
                self.deliveries += 1;
                Some(config.unwrap_or_default())
            }
            ConfigMessage::Refresh => {
                self.request(env);
                None
            }
        }
    }

    /// Deregisters from `env`. Later messages are ignored.
    pub fn disconnect(&mut self, env: &mut impl ConfigEnvironment) {
        if !self.connected {
            return;
        }
        self.connected = false;
        env.notify(self.instance, ConfigEvent::Deregistered);
    }
}
