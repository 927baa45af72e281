//! # Demo: delivery_groups
//!
//! Demonstrates token-scoped delivery groups and the built-in
//! [`LogReceiver`] (requires the `logging` feature).
//!
//! Shows how to:
//! - Register receivers on named tokens.
//! - Publish the same message type to different groups.
//!
//! ## Run
//! ```bash
//! cargo run --example delivery_groups --features logging
//! ```

use typebus::{LogReceiver, MessageBus, Token};

#[derive(Debug)]
struct Alert {
    severity: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = MessageBus::new();

    bus.subscribe_receiver(LogReceiver::<Alert>::with_token(Token::named("ops")))?;

    // default-group alerts go nowhere: only the "ops" group is wired
    bus.publish(Alert { severity: 1 }, Token::Default).await;
    let report = bus.publish(Alert { severity: 3 }, Token::named("ops")).await;
    println!("ops group delivered={}", report.delivered);

    Ok(())
}
