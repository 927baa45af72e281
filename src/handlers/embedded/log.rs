//! # Simple logging receiver for debugging and demos.
//!
//! [`LogReceiver`] prints every delivered message of its type to stdout in a
//! human-readable format. This is primarily useful for development,
//! debugging, and examples.
//!
//! ## Output format
//! ```text
//! [message] type=demo::Tick token=<default> payload=Tick(3)
//! [message] type=alloc::string::String token=grp1 payload="hi"
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::messages::{Message, Token};

use crate::handlers::Receive;

/// Simple stdout logging receiver.
///
/// Enabled via the `logging` feature. Not intended for production use -
/// implement a custom [`Receive`](crate::Receive) for structured logging or
/// metrics collection.
pub struct LogReceiver<M> {
    token: Token,
    _marker: PhantomData<fn(M)>,
}

impl<M: Message + fmt::Debug> LogReceiver<M> {
    /// Creates a receiver listening on the default delivery group.
    pub fn new() -> Self {
        Self::with_token(Token::Default)
    }

    /// Creates a receiver listening on the given delivery group.
    pub fn with_token(token: Token) -> Self {
        Self {
            token,
            _marker: PhantomData,
        }
    }
}

impl<M: Message + fmt::Debug> Default for LogReceiver<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M: Message + fmt::Debug> Receive<M> for LogReceiver<M> {
    async fn receive(&self, message: Arc<M>) -> Result<(), HandlerError> {
        println!(
            "[message] type={} token={} payload={:?}",
            std::any::type_name::<M>(),
            self.token,
            message
        );
        Ok(())
    }

    fn token(&self) -> Token {
        self.token.clone()
    }
}
