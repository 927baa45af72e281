//! # Message values and the erased envelope.
//!
//! Anything `Send + Sync + 'static` can travel through the bus; the
//! [`Message`] marker trait is blanket-implemented. Handlers receive the
//! value as `Arc<M>`, so one publish shares a single allocation across the
//! whole snapshot.
//!
//! [`AnyMessage`] is the type-erased envelope used by the dispatch engine
//! and by [`MessageBus::publish_batch`](crate::MessageBus::publish_batch),
//! which accepts mixed-type batches. The envelope captures the value's
//! `TypeId` exactly once at construction; routing never re-inspects the
//! value afterwards.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Marker for values that can be published through the bus.
///
/// Blanket-implemented for every `Send + Sync + 'static` type; you never
/// implement it by hand.
pub trait Message: Any + Send + Sync + 'static {}

impl<T: Any + Send + Sync + 'static> Message for T {}

/// Type-erased message envelope.
///
/// Carries the shared value together with the `TypeId` and type name read
/// at construction. Cloning is cheap (one `Arc` bump).
#[derive(Clone)]
pub struct AnyMessage {
    value: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl AnyMessage {
    /// Wraps a typed message value.
    ///
    /// # Example
    /// ```
    /// use typebus::AnyMessage;
    ///
    /// let env = AnyMessage::new(42u32);
    /// assert_eq!(env.downcast::<u32>().as_deref(), Some(&42));
    /// assert!(env.downcast::<i64>().is_none());
    /// ```
    pub fn new<M: Message>(message: M) -> Self {
        Self {
            value: Arc::new(message),
            type_id: TypeId::of::<M>(),
            type_name: std::any::type_name::<M>(),
        }
    }

    /// The routing key: the concrete type of the wrapped value.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The wrapped value's type name (diagnostics only).
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the shared value as `Arc<M>`, or `None` on a type mismatch.
    pub fn downcast<M: Message>(&self) -> Option<Arc<M>> {
        Arc::clone(&self.value).downcast::<M>().ok()
    }
}

impl fmt::Debug for AnyMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyMessage")
            .field("type", &self.type_name)
            .finish()
    }
}
