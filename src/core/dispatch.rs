//! # Dispatch engine: snapshot delivery, failure aggregation, batch handle.
//!
//! The dispatcher never holds the store lock: it works on owned snapshots
//! produced by [`SubscriptionStore`](super::store::SubscriptionStore).
//! Handlers in a snapshot are invoked one at a time, in registration order.
//!
//! ## What it guarantees
//! - Per-handler isolation: an error return (or, with
//!   [`BusConfig::catch_panics`], a caught panic) is recorded in the
//!   [`DispatchReport`] and delivery continues with the rest of the
//!   snapshot.
//! - Batch delivery preserves original message order within each type
//!   group, per descriptor.
//! - A [`BatchDispatch`] handle always exists for batch work; nothing runs
//!   unobserved.
//!
//! ## What it does **not** guarantee
//! - No ordering across different message types in a batch.
//! - No delivery to handlers registered after the snapshot was taken, and
//!   no un-delivery for handlers removed after it ("at most the set visible
//!   at snapshot time").

use std::any::TypeId;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::HandlerError;
use crate::handlers::HandlerDescriptor;
use crate::messages::AnyMessage;

use super::config::BusConfig;

/// One failed handler invocation within a dispatch.
#[derive(Debug)]
pub struct HandlerFailure {
    /// Identity of the failing handler.
    pub handler: Arc<str>,
    /// Type name of the message being delivered.
    pub message_type: &'static str,
    /// What went wrong.
    pub error: HandlerError,
}

/// Aggregate outcome of one publish call (or one joined batch).
///
/// A failing handler never aborts delivery to the rest of the snapshot;
/// every failure is collected here instead.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Number of successful handler invocations.
    pub delivered: usize,
    /// Failed invocations, in delivery order.
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    /// True when every invocation succeeded (including the zero-match case).
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of handler invocations attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.delivered + self.failures.len()
    }
}

/// Delivers one message to every descriptor in the snapshot, in order.
pub(crate) async fn deliver(
    snapshot: &[HandlerDescriptor],
    message: &AnyMessage,
    config: &BusConfig,
    report: &mut DispatchReport,
) {
    for descriptor in snapshot {
        deliver_one(descriptor, message, config, report).await;
    }
}

/// Invokes a single descriptor, recording the outcome and timing.
pub(crate) async fn deliver_one(
    descriptor: &HandlerDescriptor,
    message: &AnyMessage,
    config: &BusConfig,
    report: &mut DispatchReport,
) {
    let started = Instant::now();
    let result = invoke(descriptor, message, config.catch_panics).await;

    if let Some(threshold) = config.slow_handler_threshold() {
        let elapsed = started.elapsed();
        if elapsed > threshold {
            warn!(
                handler = descriptor.name(),
                kind = descriptor.kind().as_label(),
                message_type = message.type_name(),
                elapsed_ms = elapsed.as_millis() as u64,
                "slow handler"
            );
        }
    }

    match result {
        Ok(()) => report.delivered += 1,
        Err(err) => {
            if err.is_panic() {
                error!(
                    handler = descriptor.name(),
                    message_type = message.type_name(),
                    error = %err,
                    "handler panicked, continuing with remaining handlers"
                );
            } else {
                debug!(
                    handler = descriptor.name(),
                    message_type = message.type_name(),
                    error = %err,
                    "handler failed"
                );
            }
            report.failures.push(HandlerFailure {
                handler: descriptor.name_arc(),
                message_type: message.type_name(),
                error: err,
            });
        }
    }
}

async fn invoke(
    descriptor: &HandlerDescriptor,
    message: &AnyMessage,
    catch_panics: bool,
) -> Result<(), HandlerError> {
    if !catch_panics {
        return descriptor.invoke(message).await;
    }
    match AssertUnwindSafe(descriptor.invoke(message))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => Err(HandlerError::Panicked {
            info: panic_message(panic.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// One type group of a batch: messages in original relative order.
pub(crate) struct TypeGroup {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub messages: Vec<AnyMessage>,
}

/// Partitions a mixed batch by runtime type.
///
/// Relative message order is preserved within each group; group order
/// follows first appearance in the input.
pub(crate) fn partition_by_type(messages: Vec<AnyMessage>) -> Vec<TypeGroup> {
    let mut slots: HashMap<TypeId, usize> = HashMap::new();
    let mut groups: Vec<TypeGroup> = Vec::new();

    for message in messages {
        let type_id = message.type_id();
        let type_name = message.type_name();
        let slot = *slots.entry(type_id).or_insert_with(|| {
            groups.push(TypeGroup {
                type_id,
                type_name,
                messages: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].messages.push(message);
    }
    groups
}

/// Completion handle for a batch publish.
///
/// The delivery task is already running on the runtime when this handle is
/// returned. [`join`](BatchDispatch::join) awaits completion and yields the
/// aggregate [`DispatchReport`]; dropping (or [`detach`](BatchDispatch::detach))
/// leaves the task running fire-and-forget.
#[derive(Debug)]
pub struct BatchDispatch {
    join: JoinHandle<DispatchReport>,
}

impl BatchDispatch {
    pub(crate) fn new(join: JoinHandle<DispatchReport>) -> Self {
        Self { join }
    }

    /// Waits for every handler invocation of the batch to finish.
    pub async fn join(self) -> DispatchReport {
        match self.join.await {
            Ok(report) => report,
            Err(err) => {
                // handler panics are caught inside the task, so this only
                // fires if the runtime tears the task down
                error!(error = %err, "batch delivery task did not complete");
                DispatchReport {
                    delivered: 0,
                    failures: vec![HandlerFailure {
                        handler: Arc::from("batch"),
                        message_type: "<batch>",
                        error: HandlerError::Panicked {
                            info: err.to_string(),
                        },
                    }],
                }
            }
        }
    }

    /// True once the delivery task has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Explicitly lets the batch finish in the background.
    ///
    /// Equivalent to dropping the handle; the task keeps running either way.
    pub fn detach(self) {
        drop(self.join);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{BlockingFn, Handle};

    struct Evt(&'static str);

    fn descriptor(name: &'static str) -> HandlerDescriptor {
        let handler: Arc<dyn Handle<Evt>> = Arc::new(BlockingFn::new(name, |_: Arc<Evt>| Ok(())));
        HandlerDescriptor::describe(handler)
    }

    fn failing_descriptor(name: &'static str) -> HandlerDescriptor {
        let handler: Arc<dyn Handle<Evt>> = Arc::new(BlockingFn::new(name, |_: Arc<Evt>| {
            Err(HandlerError::fail("nope"))
        }));
        HandlerDescriptor::describe(handler)
    }

    fn panicking_descriptor(name: &'static str) -> HandlerDescriptor {
        let handler: Arc<dyn Handle<Evt>> =
            Arc::new(BlockingFn::new(name, |_: Arc<Evt>| -> Result<(), HandlerError> {
                panic!("kaboom")
            }));
        HandlerDescriptor::describe(handler)
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_handlers() {
        let snapshot = vec![failing_descriptor("bad"), descriptor("good")];
        let config = BusConfig::default();
        let mut report = DispatchReport::default();

        deliver(&snapshot, &AnyMessage::new(Evt("x")), &config, &mut report).await;

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(&*report.failures[0].handler, "bad");
        assert_eq!(report.total(), 2);
        assert!(!report.is_ok());
    }

    #[tokio::test]
    async fn test_panic_is_caught_and_recorded() {
        let snapshot = vec![panicking_descriptor("boomer"), descriptor("survivor")];
        let config = BusConfig::default();
        let mut report = DispatchReport::default();

        deliver(&snapshot, &AnyMessage::new(Evt("x")), &config, &mut report).await;

        assert_eq!(report.delivered, 1, "handler after the panic must run");
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].error.is_panic());
        assert!(report.failures[0].error.as_message().contains("kaboom"));
    }

    #[test]
    fn test_partition_preserves_per_type_order() {
        let batch = vec![
            AnyMessage::new(1u32),
            AnyMessage::new("a"),
            AnyMessage::new(2u32),
            AnyMessage::new("b"),
            AnyMessage::new(3u32),
        ];
        let groups = partition_by_type(batch);

        assert_eq!(groups.len(), 2);
        // group order follows first appearance
        assert_eq!(groups[0].type_id, TypeId::of::<u32>());
        let ints: Vec<u32> = groups[0]
            .messages
            .iter()
            .map(|m| *m.downcast::<u32>().unwrap())
            .collect();
        assert_eq!(ints, vec![1, 2, 3]);

        let strs: Vec<&str> = groups[1]
            .messages
            .iter()
            .map(|m| *m.downcast::<&str>().unwrap())
            .collect();
        assert_eq!(strs, vec!["a", "b"]);
    }

    #[test]
    fn test_partition_of_empty_batch() {
        assert!(partition_by_type(Vec::new()).is_empty());
    }
}
