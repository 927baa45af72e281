//! # Handler descriptor - the erased routing-table entry.
//!
//! A [`HandlerDescriptor`] pairs a type-erased invoker with the metadata the
//! store and dispatcher need: the handler's identity, its declared message
//! `TypeId`, and its sync/async flag. Descriptors are built once at
//! subscribe time ([`HandlerDescriptor::describe`] /
//! [`HandlerDescriptor::describe_receiver`]) and cloned cheaply into
//! dispatch snapshots.

use std::any::TypeId;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::messages::{AnyMessage, Message};

use super::{Handle, Receive};

/// Sync/async flag of a subscribed handler.
///
/// Dispatch does not branch on this (every handler is awaited the same
/// way); the flag is kept for logs and reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerKind {
    /// Handler performs (or may perform) async work.
    Async,
    /// Handler finishes synchronously, without awaiting.
    Blocking,
}

impl HandlerKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerKind::Async => "async",
            HandlerKind::Blocking => "blocking",
        }
    }
}

/// Object-safe invoker hiding the concrete message type.
#[async_trait]
pub(crate) trait ErasedHandler: Send + Sync {
    async fn call(&self, message: &AnyMessage) -> Result<(), HandlerError>;
}

/// Routing-table entry: identity + declared type + erased invoker.
#[derive(Clone)]
pub(crate) struct HandlerDescriptor {
    name: Arc<str>,
    kind: HandlerKind,
    message_type: TypeId,
    message_type_name: &'static str,
    invoker: Arc<dyn ErasedHandler>,
}

impl HandlerDescriptor {
    /// Builds the descriptor for a plain handler.
    pub fn describe<M: Message>(handler: Arc<dyn Handle<M>>) -> Self {
        Self {
            name: Arc::from(handler.name()),
            kind: handler.kind(),
            message_type: TypeId::of::<M>(),
            message_type_name: std::any::type_name::<M>(),
            invoker: Arc::new(TypedHandler { inner: handler }),
        }
    }

    /// Builds the descriptor for a receiver-style subscriber.
    pub fn describe_receiver<M: Message>(receiver: Arc<dyn Receive<M>>) -> Self {
        Self {
            name: Arc::from(receiver.name()),
            kind: receiver.kind(),
            message_type: TypeId::of::<M>(),
            message_type_name: std::any::type_name::<M>(),
            invoker: Arc::new(TypedReceiver { inner: receiver }),
        }
    }

    /// Handler identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared copy of the identity (for reports).
    pub fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Sync/async flag (diagnostics).
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Declared message type this descriptor routes on.
    pub fn message_type(&self) -> TypeId {
        self.message_type
    }

    /// Declared message type name (diagnostics).
    pub fn message_type_name(&self) -> &'static str {
        self.message_type_name
    }

    /// Invokes the handler with an erased message.
    pub async fn invoke(&self, message: &AnyMessage) -> Result<(), HandlerError> {
        self.invoker.call(message).await
    }
}

struct TypedHandler<M: Message> {
    inner: Arc<dyn Handle<M>>,
}

#[async_trait]
impl<M: Message> ErasedHandler for TypedHandler<M> {
    async fn call(&self, message: &AnyMessage) -> Result<(), HandlerError> {
        match message.downcast::<M>() {
            Some(message) => self.inner.on_message(message).await,
            None => {
                // the store keys this entry by M's TypeId, so routing can
                // never hand us a foreign type; skip rather than poison
                tracing::error!(
                    handler = self.inner.name(),
                    expected = std::any::type_name::<M>(),
                    got = message.type_name(),
                    "message type mismatch in dispatch, skipped"
                );
                Ok(())
            }
        }
    }
}

struct TypedReceiver<M: Message> {
    inner: Arc<dyn Receive<M>>,
}

#[async_trait]
impl<M: Message> ErasedHandler for TypedReceiver<M> {
    async fn call(&self, message: &AnyMessage) -> Result<(), HandlerError> {
        match message.downcast::<M>() {
            Some(message) => self.inner.receive(message).await,
            None => {
                tracing::error!(
                    receiver = self.inner.name(),
                    expected = std::any::type_name::<M>(),
                    got = message.type_name(),
                    "message type mismatch in dispatch, skipped"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::BlockingFn;

    struct Note(&'static str);

    #[tokio::test]
    async fn test_describe_captures_identity_and_type() {
        let handler: Arc<dyn Handle<Note>> =
            Arc::new(BlockingFn::new("note-sink", |_: Arc<Note>| Ok(())));
        let descriptor = HandlerDescriptor::describe(handler);

        assert_eq!(descriptor.name(), "note-sink");
        assert_eq!(descriptor.kind(), HandlerKind::Blocking);
        assert_eq!(descriptor.message_type(), TypeId::of::<Note>());
        assert!(descriptor.message_type_name().contains("Note"));
    }

    #[tokio::test]
    async fn test_invoke_downcasts_and_calls() {
        let handler: Arc<dyn Handle<Note>> = Arc::new(BlockingFn::new("checker", |n: Arc<Note>| {
            assert_eq!(n.0, "hello");
            Ok(())
        }));
        let descriptor = HandlerDescriptor::describe(handler);

        descriptor
            .invoke(&AnyMessage::new(Note("hello")))
            .await
            .expect("invoke failed");
    }

    #[tokio::test]
    async fn test_invoke_skips_foreign_type() {
        let handler: Arc<dyn Handle<Note>> = Arc::new(BlockingFn::new("never", |_: Arc<Note>| {
            panic!("must not be called for a foreign message type")
        }));
        let descriptor = HandlerDescriptor::describe(handler);

        // not reachable through the routing table; exercised directly
        descriptor
            .invoke(&AnyMessage::new(42u32))
            .await
            .expect("mismatch must be a silent skip");
    }
}
