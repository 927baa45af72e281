//! # MessageBus: the typed publish/subscribe facade.
//!
//! [`MessageBus`] owns the subscription store and the dispatch
//! configuration. Publishers and subscribers share it by reference
//! (`Arc<MessageBus>` or [`MessageBus::global`]).
//!
//! ## High-level architecture
//! ```text
//! subscribe::<M>(handler, token)          publish::<M>(message, token).await
//!        │                                        │
//!        ▼                                        ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  MessageBus                                                  │
//! │  ┌────────────────────────────────────────────┐              │
//! │  │ SubscriptionStore (one mutex)              │  snapshot    │
//! │  │   TypeId → Token → [HandlerDescriptor]     ├─────────────►│
//! │  │   identity index (global duplicate check)  │  (lock held  │
//! │  └────────────────────────────────────────────┘   here only) │
//! │                                                              │
//! │  dispatch loop (lock released):                              │
//! │    for descriptor in snapshot { descriptor.invoke(msg).await }│
//! │    failures → DispatchReport                                 │
//! └──────────────────────────────────────────────────────────────┘
//!
//! publish_batch(messages, token)
//!   ├─ partition by runtime type (order kept per type)
//!   ├─ one snapshot per type, all before delivery starts
//!   └─ tokio::spawn(delivery) ──► BatchDispatch handle (join or drop)
//! ```
//!
//! ## Delivery rules
//! - Routing is exact `TypeId` equality under the chosen [`Token`]; no
//!   structural or supertype matching, no cross-token delivery.
//! - `publish` awaits **every** matching handler, sync or async, and
//!   returns the aggregate [`DispatchReport`].
//! - `publish_batch` snapshots synchronously and delivers on one spawned
//!   task tracked by the returned [`BatchDispatch`].
//! - The store mutex is never held while a handler runs. Consequence: a
//!   handler may still receive a message from a publish whose snapshot was
//!   taken just before the handler was unsubscribed ("at most the set
//!   visible at snapshot time").

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::SubscribeError;
use crate::handlers::{Handle, HandlerDescriptor, Receive};
use crate::messages::{AnyMessage, Message, Token};

use super::builder::BusBuilder;
use super::config::BusConfig;
use super::dispatch::{self, BatchDispatch, DispatchReport};
use super::store::SubscriptionStore;

/// Typed in-process publish/subscribe bus.
///
/// See the [module docs](self) for the delivery rules.
pub struct MessageBus {
    store: SubscriptionStore,
    config: BusConfig,
}

impl MessageBus {
    /// Creates a bus with the default [`BusConfig`].
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Creates a bus with the given configuration.
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            store: SubscriptionStore::new(),
            config,
        }
    }

    /// Returns a builder that can pre-register handlers and receivers.
    pub fn builder(config: BusConfig) -> BusBuilder {
        BusBuilder::new(config)
    }

    /// The process-wide default bus.
    ///
    /// Initialized exactly once on first access (concurrent first calls
    /// still observe a single instance); later calls return the same
    /// instance without re-initializing its state. There is no teardown:
    /// the instance lives until process exit.
    ///
    /// Prefer passing an explicitly constructed bus where practical; this
    /// accessor exists for wiring at a distance.
    pub fn global() -> &'static MessageBus {
        static GLOBAL: OnceCell<MessageBus> = OnceCell::new();
        GLOBAL.get_or_init(MessageBus::new)
    }

    /// The bus configuration.
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Number of identities currently subscribed (all types, all tokens).
    pub fn handler_count(&self) -> usize {
        self.store.handler_count()
    }

    // ---------------------------
    // Subscription surface
    // ---------------------------

    /// Registers a handler for messages of type `M` under `token`.
    ///
    /// The message type is stated explicitly by the subscriber: it is the
    /// generic parameter, usually inferred from the handler's signature.
    ///
    /// # Errors
    /// [`SubscribeError::AlreadySubscribed`] if the handler's identity is
    /// registered anywhere in the bus (any type, any token).
    pub fn subscribe<M, H>(&self, handler: H, token: Token) -> Result<(), SubscribeError>
    where
        M: Message,
        H: Handle<M>,
    {
        let handler: Arc<dyn Handle<M>> = Arc::new(handler);
        let descriptor = HandlerDescriptor::describe(handler);
        debug!(
            handler = descriptor.name(),
            message_type = descriptor.message_type_name(),
            token = %token,
            "subscribe"
        );
        self.store.add(token, descriptor)
    }

    /// Registers a receiver-style subscriber under its own token
    /// ([`Receive::token`], default group unless overridden).
    ///
    /// # Errors
    /// Same as [`MessageBus::subscribe`].
    pub fn subscribe_receiver<M, R>(&self, receiver: R) -> Result<(), SubscribeError>
    where
        M: Message,
        R: Receive<M>,
    {
        let receiver: Arc<dyn Receive<M>> = Arc::new(receiver);
        let token = receiver.token();
        let descriptor = HandlerDescriptor::describe_receiver(receiver);
        debug!(
            receiver = descriptor.name(),
            message_type = descriptor.message_type_name(),
            token = %token,
            "subscribe receiver"
        );
        self.store.add(token, descriptor)
    }

    /// Removes a handler by identity from every token bucket under its
    /// declared type. Silent no-op if the identity was never subscribed.
    pub fn unsubscribe(&self, name: &str) {
        let removed = self.store.remove(name);
        debug!(handler = name, removed, "unsubscribe");
    }

    /// Removes a receiver (by its identity). Silent no-op if absent.
    pub fn unsubscribe_receiver<M, R>(&self, receiver: &R)
    where
        M: Message,
        R: Receive<M> + ?Sized,
    {
        self.unsubscribe(receiver.name());
    }

    // ---------------------------
    // Publish surface
    // ---------------------------

    /// Delivers one message to every handler subscribed for its type under
    /// `token`, awaiting each in registration order.
    ///
    /// Completes only when every matching handler (sync or async) has
    /// finished. Per-handler failures never abort delivery to the rest of
    /// the snapshot; they are aggregated in the returned
    /// [`DispatchReport`]. No matching handler is not an error: the report
    /// is simply empty.
    pub async fn publish<M: Message>(&self, message: M, token: Token) -> DispatchReport {
        self.publish_any(AnyMessage::new(message), token).await
    }

    /// [`publish`](MessageBus::publish) for an already-erased message.
    pub async fn publish_any(&self, message: AnyMessage, token: Token) -> DispatchReport {
        let snapshot = self.store.snapshot(message.type_id(), &token);
        debug!(
            message_type = message.type_name(),
            token = %token,
            matched = snapshot.len(),
            "publish"
        );

        let mut report = DispatchReport::default();
        dispatch::deliver(&snapshot, &message, &self.config, &mut report).await;
        report
    }

    /// Publishes a mixed-type batch and returns a completion handle.
    ///
    /// Messages are partitioned by runtime type, preserving their original
    /// relative order within each group; for each distinct type one
    /// snapshot is taken, and all snapshots precede any delivery. Delivery
    /// then runs on a single spawned task: each descriptor receives its
    /// group's messages in original order.
    ///
    /// The returned [`BatchDispatch`] may be `join().await`ed for the
    /// aggregate [`DispatchReport`] or dropped to fire-and-forget; the
    /// delivery task runs either way.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn publish_batch(&self, messages: Vec<AnyMessage>, token: Token) -> BatchDispatch {
        let groups = dispatch::partition_by_type(messages);

        // one snapshot per distinct type, all taken before delivery starts
        let work: Vec<_> = groups
            .into_iter()
            .map(|group| (self.store.snapshot(group.type_id, &token), group))
            .collect();
        debug!(
            groups = work.len(),
            token = %token,
            "publish batch"
        );

        let config = self.config.clone();
        let join = tokio::spawn(async move {
            let mut report = DispatchReport::default();
            for (snapshot, group) in &work {
                for descriptor in snapshot {
                    for message in &group.messages {
                        dispatch::deliver_one(descriptor, message, &config, &mut report).await;
                    }
                }
            }
            report
        });
        BatchDispatch::new(join)
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
