//! # Demo: basic_publish
//!
//! Demonstrates the smallest useful wiring: one typed handler, one publish.
//!
//! Shows how to:
//! - Register a closure handler with [`HandlerFn`].
//! - Publish a typed message and inspect the [`DispatchReport`].
//! - Unsubscribe by identity.
//!
//! ## Run
//! ```bash
//! cargo run --example basic_publish
//! ```

use std::sync::Arc;

use typebus::{HandlerError, HandlerFn, MessageBus, Token};

struct OrderPlaced {
    id: u64,
    amount_cents: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "typebus=debug".into()),
        )
        .init();

    let bus = MessageBus::new();

    bus.subscribe(
        HandlerFn::new("invoice-printer", |order: Arc<OrderPlaced>| async move {
            println!(
                "invoice for order #{}: {}.{:02} EUR",
                order.id,
                order.amount_cents / 100,
                order.amount_cents % 100
            );
            Ok::<_, HandlerError>(())
        }),
        Token::Default,
    )?;

    let report = bus
        .publish(
            OrderPlaced {
                id: 1042,
                amount_cents: 15_99,
            },
            Token::Default,
        )
        .await;
    println!(
        "delivered={} failures={}",
        report.delivered,
        report.failures.len()
    );

    bus.unsubscribe("invoice-printer");
    Ok(())
}
