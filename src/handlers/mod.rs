//! # Message handlers for the bus.
//!
//! This module provides the two subscriber contracts and their adapters:
//! - [`Handle`] — a plain handler; its delivery group is chosen by the
//!   caller of [`MessageBus::subscribe`](crate::MessageBus::subscribe)
//! - [`Receive`] — a receiver-style handler that carries its own
//!   [`Token`](crate::Token)
//! - [`HandlerFn`] / [`BlockingFn`] — closure-backed handlers (async and
//!   synchronous)
//! - [`HandlerKind`] — the descriptor's sync/async flag (diagnostics)
//!
//! ## Implementing a custom handler
//! ```no_run
//! use std::sync::Arc;
//! use typebus::{Handle, HandlerError};
//! use async_trait::async_trait;
//!
//! struct Metric(u64);
//! struct MetricsHandler;
//!
//! #[async_trait]
//! impl Handle<Metric> for MetricsHandler {
//!     async fn on_message(&self, metric: Arc<Metric>) -> Result<(), HandlerError> {
//!         // export metric.0 ...
//!         let _ = metric.0;
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "metrics"
//!     }
//! }
//! ```

mod descriptor;
mod handle;
mod handler_fn;
mod receive;

#[cfg(feature = "logging")]
mod embedded;

pub(crate) use descriptor::HandlerDescriptor;
pub use descriptor::HandlerKind;
pub use handle::{Handle, HandlerRef};
pub use handler_fn::{BlockingFn, HandlerFn};
pub use receive::{Receive, ReceiverRef};

#[cfg(feature = "logging")]
pub use embedded::LogReceiver;
