//! # Receiver-style handler trait
//!
//! `Receive<M>` mirrors [`Handle`](crate::Handle) for subscribers that own
//! their delivery group: the receiver declares its [`Token`] itself instead
//! of having the caller pick one at subscribe time. Register with
//! [`MessageBus::subscribe_receiver`](crate::MessageBus::subscribe_receiver).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::messages::{Message, Token};

use super::HandlerKind;

/// Shared reference to a receiver (`Arc<dyn Receive<M>>`).
pub type ReceiverRef<M> = Arc<dyn Receive<M>>;

/// Contract for receiver-style subscribers of type `M`.
///
/// Same identity and failure rules as [`Handle`](crate::Handle); the only
/// difference is that the delivery group comes from [`Receive::token`]
/// (default group unless overridden).
#[async_trait]
pub trait Receive<M: Message>: Send + Sync + 'static {
    /// Receives a single message.
    async fn receive(&self, message: Arc<M>) -> Result<(), HandlerError>;

    /// Delivery group this receiver listens on.
    fn token(&self) -> Token {
        Token::Default
    }

    /// Identity of this receiver (unique across the bus).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether this receiver is asynchronous or synchronous (diagnostics).
    fn kind(&self) -> HandlerKind {
        HandlerKind::Async
    }
}

#[async_trait]
impl<M: Message, T: Receive<M> + ?Sized> Receive<M> for Arc<T> {
    async fn receive(&self, message: Arc<M>) -> Result<(), HandlerError> {
        (**self).receive(message).await
    }

    fn token(&self) -> Token {
        (**self).token()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn kind(&self) -> HandlerKind {
        (**self).kind()
    }
}
