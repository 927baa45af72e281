//! # Core handler trait
//!
//! `Handle<M>` is the extension point for plugging message handlers into the
//! bus. The message type is the trait's generic parameter: the subscriber
//! states it explicitly at registration, and the compiler enforces the
//! one-typed-parameter contract; there is no signature inspection at
//! runtime.
//!
//! ## Contract
//! - `on_message` is awaited to completion by
//!   [`MessageBus::publish`](crate::MessageBus::publish); a slow handler
//!   delays the publisher (see [`BusConfig::slow_handler`](crate::BusConfig)).
//! - The handler's [`name`](Handle::name) is its identity: it may be
//!   subscribed at most once across the whole bus, regardless of type or
//!   token.
//! - Returning an error does not stop dispatch to the other handlers in the
//!   snapshot; the failure lands in the publisher's
//!   [`DispatchReport`](crate::DispatchReport).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::messages::Message;

use super::HandlerKind;

/// Shared reference to a handler (`Arc<dyn Handle<M>>`).
pub type HandlerRef<M> = Arc<dyn Handle<M>>;

/// Contract for message handlers of type `M`.
///
/// Implementations should avoid blocking the async runtime (prefer async
/// I/O and cooperative waits); use [`BlockingFn`](crate::BlockingFn) for
/// genuinely synchronous work.
#[async_trait]
pub trait Handle<M: Message>: Send + Sync + 'static {
    /// Handles a single message.
    ///
    /// The value is shared across the whole dispatch snapshot; handlers
    /// receive it as `Arc<M>` and must not assume exclusive access.
    async fn on_message(&self, message: Arc<M>) -> Result<(), HandlerError>;

    /// Identity of this handler (unique across the bus).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether this handler is asynchronous or synchronous (diagnostics).
    fn kind(&self) -> HandlerKind {
        HandlerKind::Async
    }
}

#[async_trait]
impl<M: Message, T: Handle<M> + ?Sized> Handle<M> for Arc<T> {
    async fn on_message(&self, message: Arc<M>) -> Result<(), HandlerError> {
        (**self).on_message(message).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn kind(&self) -> HandlerKind {
        (**self).kind()
    }
}
