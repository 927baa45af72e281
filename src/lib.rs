//! # typebus
//!
//! **Typebus** is a typed in-process publish/subscribe message bus for Rust.
//!
//! It routes message values to handlers by the message's concrete type:
//! a handler declares the one type it accepts, publishers pick a delivery
//! group ([`Token`]), and the bus delivers each published value to every
//! matching handler. The crate is designed as a building block for wiring
//! independent components without direct references between them.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌─────────────┐    ┌─────────────┐    ┌──────────────┐
//!  │  Publisher  │    │  Publisher  │    │  Subscriber  │
//!  │ publish(m)  │    │publish_batch│    │ subscribe(h) │
//!  └──────┬──────┘    └──────┬──────┘    └──────┬───────┘
//!         ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  MessageBus                                               │
//! │  - SubscriptionStore (TypeId → Token → descriptors,       │
//! │    global identity index; one mutex)                      │
//! │  - Dispatcher (snapshot outside the lock, per-handler     │
//! │    failure isolation, DispatchReport)                     │
//! └──────┬──────────────────────────────┬─────────────────────┘
//!        ▼                              ▼
//!   awaited inline                tokio::spawn (batch)
//!   DispatchReport                BatchDispatch handle
//! ```
//!
//! ### Delivery lifecycle
//! ```text
//! publish(message, token)
//!   ├─► TypeId read once (AnyMessage envelope)
//!   ├─► lock store → snapshot(type, token) → unlock
//!   └─► for each descriptor, in registration order:
//!         ├─ invoke handler with Arc<message>
//!         ├─ Err / caught panic → recorded, delivery continues
//!         └─ slow invocation → tracing warn
//!   returns DispatchReport { delivered, failures }
//!
//! publish_batch(messages, token)
//!   ├─► partition by runtime type (original order kept per type)
//!   ├─► one snapshot per type (all before delivery starts)
//!   └─► spawned task delivers group-by-group,
//!       descriptor-by-descriptor, messages in original order
//!   returns BatchDispatch (join for the report, or drop)
//! ```
//!
//! ## Features
//! | Area              | Description                                                         | Key types / traits                  |
//! |-------------------|----------------------------------------------------------------------|-------------------------------------|
//! | **Handlers**      | Typed subscriber contracts and closure adapters.                     | [`Handle`], [`Receive`], [`HandlerFn`], [`BlockingFn`] |
//! | **Routing**       | Exact-type matching with token-scoped delivery groups.               | [`Token`], [`AnyMessage`]           |
//! | **Dispatch**      | Awaited publish, handle-backed batch publish, failure aggregation.   | [`DispatchReport`], [`BatchDispatch`] |
//! | **Errors**        | Typed errors for subscription and handler failures.                  | [`SubscribeError`], [`HandlerError`] |
//! | **Configuration** | Slow-handler warnings, panic containment.                            | [`BusConfig`]                       |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogReceiver`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use typebus::{HandlerError, HandlerFn, MessageBus, Token};
//!
//! struct OrderPlaced {
//!     id: u64,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = MessageBus::new();
//!     let seen = Arc::new(AtomicUsize::new(0));
//!
//!     let counter = Arc::clone(&seen);
//!     bus.subscribe(
//!         HandlerFn::new("order-counter", move |order: Arc<OrderPlaced>| {
//!             let counter = Arc::clone(&counter);
//!             async move {
//!                 let _ = order.id;
//!                 counter.fetch_add(1, Ordering::Relaxed);
//!                 Ok::<_, HandlerError>(())
//!             }
//!         }),
//!         Token::Default,
//!     )?;
//!
//!     let report = bus.publish(OrderPlaced { id: 7 }, Token::Default).await;
//!     assert!(report.is_ok());
//!     assert_eq!(seen.load(Ordering::Relaxed), 1);
//!
//!     bus.unsubscribe("order-counter");
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod handlers;
mod messages;

// ---- Public re-exports ----

pub use crate::core::{
    BatchDispatch, BusBuilder, BusConfig, DispatchReport, HandlerFailure, MessageBus,
};
pub use crate::error::{HandlerError, SubscribeError};
pub use crate::handlers::{BlockingFn, Handle, HandlerFn, HandlerKind, HandlerRef, Receive, ReceiverRef};
pub use crate::messages::{AnyMessage, Message, Token};

// Optional: expose a simple built-in logging receiver (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use crate::handlers::LogReceiver;
