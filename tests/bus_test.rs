//! End-to-end tests for the bus facade: routing, tokens, batches, and the
//! process-wide default instance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use typebus::{
    AnyMessage, BlockingFn, HandlerError, HandlerFn, MessageBus, Receive, SubscribeError, Token,
};

/// Records delivered payloads in order.
fn recording_handler(
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
) -> BlockingFn<impl Fn(Arc<String>) -> Result<(), HandlerError> + Send + Sync + 'static> {
    BlockingFn::new(name, move |message: Arc<String>| {
        log.lock().push((*message).clone());
        Ok(())
    })
}

#[tokio::test]
async fn test_double_subscribe_is_rejected() {
    let bus = MessageBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    bus.subscribe(recording_handler("twice", Arc::clone(&log)), Token::Default)
        .expect("first subscribe must succeed");
    let err = bus
        .subscribe(recording_handler("twice", Arc::clone(&log)), Token::Default)
        .unwrap_err();

    assert!(matches!(err, SubscribeError::AlreadySubscribed { .. }));
    assert_eq!(bus.handler_count(), 1);
}

#[tokio::test]
async fn test_publish_delivers_exactly_once_with_payload() {
    let bus = MessageBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    bus.subscribe(recording_handler("sink", Arc::clone(&log)), Token::Default)
        .unwrap();

    let report = bus.publish(String::from("hello"), Token::Default).await;

    assert!(report.is_ok());
    assert_eq!(report.delivered, 1);
    assert_eq!(*log.lock(), vec!["hello"]);
}

#[tokio::test]
async fn test_token_partitions_delivery() {
    let bus = MessageBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    bus.subscribe(
        recording_handler("grouped", Arc::clone(&log)),
        Token::named("grp1"),
    )
    .unwrap();

    let report = bus
        .publish(String::from("hi"), Token::named("grp2"))
        .await;
    assert_eq!(report.total(), 0, "different token must not match");
    assert!(log.lock().is_empty());

    let report = bus
        .publish(String::from("hi"), Token::named("grp1"))
        .await;
    assert_eq!(report.delivered, 1);
    assert_eq!(*log.lock(), vec!["hi"]);
}

#[tokio::test]
async fn test_exact_type_matching_only() {
    struct Celsius(f64);
    struct Fahrenheit(f64);

    let bus = MessageBus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    bus.subscribe(
        BlockingFn::new("celsius-only", move |_: Arc<Celsius>| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }),
        Token::Default,
    )
    .unwrap();

    bus.publish(Fahrenheit(98.6), Token::Default).await;
    assert_eq!(hits.load(Ordering::Relaxed), 0, "no structural matching");

    bus.publish(Celsius(37.0), Token::Default).await;
    assert_eq!(hits.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_subscribe_publish_unsubscribe_scenario() {
    let bus = MessageBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    bus.subscribe(
        recording_handler("scenario", Arc::clone(&log)),
        Token::named("grp1"),
    )
    .unwrap();

    bus.publish(String::from("hi"), Token::named("grp1")).await;
    assert_eq!(log.lock().len(), 1, "matching token: delivered once");

    bus.publish(String::from("hi"), Token::named("grp2")).await;
    assert_eq!(log.lock().len(), 1, "foreign token: not delivered");

    bus.unsubscribe("scenario");
    bus.publish(String::from("hi"), Token::named("grp1")).await;
    assert_eq!(log.lock().len(), 1, "after unsubscribe: not delivered");
}

#[tokio::test]
async fn test_unsubscribe_unknown_is_silent() {
    let bus = MessageBus::new();
    bus.unsubscribe("never-registered");
    assert_eq!(bus.handler_count(), 0);
}

#[tokio::test]
async fn test_publish_awaits_async_handlers() {
    let bus = MessageBus::new();
    let done = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&done);
    bus.subscribe(
        HandlerFn::new("slowpoke", move |_: Arc<String>| {
            let flag = Arc::clone(&flag);
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                flag.fetch_add(1, Ordering::Relaxed);
                Ok::<_, HandlerError>(())
            }
        }),
        Token::Default,
    )
    .unwrap();

    let report = bus.publish(String::from("wait for me"), Token::Default).await;

    assert_eq!(report.delivered, 1);
    assert_eq!(
        done.load(Ordering::Relaxed),
        1,
        "publish must block until async handlers finish"
    );
}

#[tokio::test]
async fn test_failure_is_isolated_and_aggregated() {
    let bus = MessageBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    bus.subscribe(
        BlockingFn::new("broken", |_: Arc<String>| {
            Err(HandlerError::fail("out of ink"))
        }),
        Token::Default,
    )
    .unwrap();
    bus.subscribe(recording_handler("working", Arc::clone(&log)), Token::Default)
        .unwrap();

    let report = bus.publish(String::from("msg"), Token::Default).await;

    assert_eq!(report.delivered, 1, "later handler must still run");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(&*report.failures[0].handler, "broken");
    assert_eq!(*log.lock(), vec!["msg"]);
}

#[tokio::test]
async fn test_panicking_handler_is_contained() {
    let bus = MessageBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    bus.subscribe(
        BlockingFn::new("bomb", |_: Arc<String>| -> Result<(), HandlerError> {
            panic!("tripped a wire")
        }),
        Token::Default,
    )
    .unwrap();
    bus.subscribe(recording_handler("steady", Arc::clone(&log)), Token::Default)
        .unwrap();

    let report = bus.publish(String::from("msg"), Token::Default).await;

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.is_panic());
    assert_eq!(*log.lock(), vec!["msg"]);
}

#[tokio::test]
async fn test_batch_preserves_order_for_one_subscriber() {
    let bus = MessageBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    bus.subscribe(recording_handler("ordered", Arc::clone(&log)), Token::Default)
        .unwrap();

    let batch = vec![
        AnyMessage::new(String::from("a")),
        AnyMessage::new(String::from("b")),
        AnyMessage::new(String::from("c")),
    ];
    let report = bus.publish_batch(batch, Token::Default).join().await;

    assert_eq!(report.delivered, 3);
    assert_eq!(*log.lock(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_batch_partitions_mixed_types() {
    struct Tick(u32);

    let bus = MessageBus::new();
    let strings = Arc::new(Mutex::new(Vec::new()));
    let ticks = Arc::new(Mutex::new(Vec::new()));

    bus.subscribe(recording_handler("strings", Arc::clone(&strings)), Token::Default)
        .unwrap();
    let tick_log = Arc::clone(&ticks);
    bus.subscribe(
        BlockingFn::new("ticks", move |t: Arc<Tick>| {
            tick_log.lock().push(t.0);
            Ok(())
        }),
        Token::Default,
    )
    .unwrap();

    let batch = vec![
        AnyMessage::new(Tick(1)),
        AnyMessage::new(String::from("x")),
        AnyMessage::new(Tick(2)),
        AnyMessage::new(String::from("y")),
    ];
    let report = bus.publish_batch(batch, Token::Default).join().await;

    assert_eq!(report.delivered, 4);
    assert_eq!(*ticks.lock(), vec![1, 2]);
    assert_eq!(*strings.lock(), vec!["x", "y"]);
}

#[tokio::test]
async fn test_batch_runs_even_when_handle_is_dropped() {
    let bus = MessageBus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    bus.subscribe(
        BlockingFn::new("detached", move |_: Arc<String>| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }),
        Token::Default,
    )
    .unwrap();

    bus.publish_batch(
        vec![AnyMessage::new(String::from("fire and forget"))],
        Token::Default,
    )
    .detach();

    // delivery is spawned, not dropped; give the runtime a moment
    for _ in 0..100 {
        if hits.load(Ordering::Relaxed) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(hits.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_receiver_listens_on_its_own_token() {
    struct GroupReceiver {
        seen: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Receive<String> for GroupReceiver {
        async fn receive(&self, _message: Arc<String>) -> Result<(), HandlerError> {
            self.seen.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn token(&self) -> Token {
            Token::named("audit")
        }

        fn name(&self) -> &str {
            "group-receiver"
        }
    }

    let bus = MessageBus::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let receiver = Arc::new(GroupReceiver {
        seen: Arc::clone(&seen),
    });
    bus.subscribe_receiver(Arc::clone(&receiver)).unwrap();

    bus.publish(String::from("plain"), Token::Default).await;
    assert_eq!(seen.load(Ordering::Relaxed), 0, "wrong group");

    bus.publish(String::from("audited"), Token::named("audit")).await;
    assert_eq!(seen.load(Ordering::Relaxed), 1);

    bus.unsubscribe_receiver(&*receiver);
    bus.publish(String::from("audited"), Token::named("audit")).await;
    assert_eq!(seen.load(Ordering::Relaxed), 1, "removed receiver stays silent");
}

#[tokio::test]
async fn test_global_bus_is_a_single_instance() {
    let first = MessageBus::global();
    let second = MessageBus::global();
    assert!(std::ptr::eq(first, second));

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    first
        .subscribe(
            BlockingFn::new("global-probe", move |_: Arc<u128>| {
                counter.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }),
            Token::Default,
        )
        .expect("unique name on the shared instance");

    // a subscription made through one reference is visible through the other
    second.publish(42u128, Token::Default).await;
    assert_eq!(hits.load(Ordering::Relaxed), 1);

    first.unsubscribe("global-probe");
}
