//! Builder for wiring a [`MessageBus`](super::bus::MessageBus) up front.

use crate::error::SubscribeError;
use crate::handlers::{Handle, Receive};
use crate::messages::{Message, Token};

use super::bus::MessageBus;
use super::config::BusConfig;

type Registration = Box<dyn FnOnce(&MessageBus) -> Result<(), SubscribeError> + Send>;

/// Builder collecting handlers/receivers to register at build time.
///
/// Registrations are applied in the order they were added; the first
/// duplicate identity fails the whole build.
pub struct BusBuilder {
    config: BusConfig,
    registrations: Vec<Registration>,
}

impl BusBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(config: BusConfig) -> Self {
        Self {
            config,
            registrations: Vec::new(),
        }
    }

    /// Adds a handler to register under `token` at build time.
    pub fn with_handler<M, H>(mut self, handler: H, token: Token) -> Self
    where
        M: Message,
        H: Handle<M>,
    {
        self.registrations
            .push(Box::new(move |bus| bus.subscribe(handler, token)));
        self
    }

    /// Adds a receiver to register (under its own token) at build time.
    pub fn with_receiver<M, R>(mut self, receiver: R) -> Self
    where
        M: Message,
        R: Receive<M>,
    {
        self.registrations
            .push(Box::new(move |bus| bus.subscribe_receiver(receiver)));
        self
    }

    /// Builds the bus and applies every pending registration.
    ///
    /// # Errors
    /// [`SubscribeError::AlreadySubscribed`] if two registrations share an
    /// identity.
    pub fn build(self) -> Result<MessageBus, SubscribeError> {
        let bus = MessageBus::with_config(self.config);
        for register in self.registrations {
            register(&bus)?;
        }
        Ok(bus)
    }
}
