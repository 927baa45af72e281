//! # Demo: batch_publish
//!
//! Demonstrates mixed-type batch publishing with a completion handle.
//!
//! Shows how to:
//! - Build a heterogeneous batch of [`AnyMessage`] envelopes.
//! - Observe per-type grouping with original per-type order.
//! - Join the [`BatchDispatch`] handle for the aggregate report.
//!
//! ## Run
//! ```bash
//! cargo run --example batch_publish
//! ```

use std::sync::Arc;

use typebus::{AnyMessage, BlockingFn, MessageBus, Token};

struct SensorReading {
    celsius: f64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = MessageBus::new();

    bus.subscribe(
        BlockingFn::new("reading-log", |r: Arc<SensorReading>| {
            println!("reading: {:.1}°C", r.celsius);
            Ok(())
        }),
        Token::Default,
    )?;
    bus.subscribe(
        BlockingFn::new("note-log", |note: Arc<String>| {
            println!("note: {note}");
            Ok(())
        }),
        Token::Default,
    )?;

    let batch = vec![
        AnyMessage::new(SensorReading { celsius: 21.4 }),
        AnyMessage::new(String::from("calibration started")),
        AnyMessage::new(SensorReading { celsius: 22.0 }),
        AnyMessage::new(String::from("calibration finished")),
    ];

    // the handle is the only way to observe completion; dropping it would
    // leave the batch running fire-and-forget
    let report = bus.publish_batch(batch, Token::Default).join().await;
    println!(
        "batch done: delivered={} failures={}",
        report.delivered,
        report.failures.len()
    );
    Ok(())
}
