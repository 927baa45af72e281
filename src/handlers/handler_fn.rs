//! # Function-backed handlers (`HandlerFn`, `BlockingFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(Arc<M>) -> Fut`, producing a fresh
//! future per delivered message. This avoids shared mutable state; if the
//! handler needs state across messages, capture an `Arc<...>` explicitly
//! inside the closure.
//!
//! [`BlockingFn`] is the synchronous counterpart for handlers that finish
//! without awaiting; it reports [`HandlerKind::Blocking`] in its descriptor.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use typebus::{HandlerError, HandlerFn, Handle};
//!
//! struct Tick(u64);
//!
//! let h = HandlerFn::new("ticker", |tick: Arc<Tick>| async move {
//!     let _ = tick.0;
//!     Ok::<_, HandlerError>(())
//! });
//!
//! assert_eq!(Handle::<Tick>::name(&h), "ticker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::messages::Message;

use super::{Handle, HandlerKind};

/// Asynchronous function-backed handler.
///
/// Wraps a closure that *creates* a new future per message.
#[derive(Debug)]
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a shared handle.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<M, F, Fut> Handle<M> for HandlerFn<F>
where
    M: Message,
    F: Fn(Arc<M>) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn on_message(&self, message: Arc<M>) -> Result<(), HandlerError> {
        (self.f)(message).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Synchronous function-backed handler.
///
/// The closure runs to completion inline within the dispatch loop, so keep
/// it short; long work belongs in a [`HandlerFn`] with async I/O.
#[derive(Debug)]
pub struct BlockingFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> BlockingFn<F> {
    /// Creates a new synchronous handler.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<M, F> Handle<M> for BlockingFn<F>
where
    M: Message,
    F: Fn(Arc<M>) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    async fn on_message(&self, message: Arc<M>) -> Result<(), HandlerError> {
        (self.f)(message)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Blocking
    }
}
