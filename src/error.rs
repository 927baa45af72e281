//! Error types used by the bus and by handlers.
//!
//! This module defines two main error enums:
//!
//! - [`SubscribeError`] — contract violations raised at subscribe time.
//! - [`HandlerError`] — failures raised by individual handler invocations.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Handler failures never abort a dispatch: they are collected per publish call
//! into a [`DispatchReport`](crate::DispatchReport).

use thiserror::Error;

/// # Errors produced at subscribe time.
///
/// These represent violations of the subscription contract. The declared
/// message type and handler signature are checked by the compiler (the type
/// is the generic parameter of [`Handle`](crate::Handle) /
/// [`Receive`](crate::Receive)), so the only runtime violation left is a
/// duplicate identity.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SubscribeError {
    /// The handler's identity is already registered somewhere in the bus.
    ///
    /// Identities are unique across the whole bus, not per type or token.
    /// Unsubscribe the existing handler before registering it again.
    #[error("handler '{handler}' is already subscribed; unsubscribe it first")]
    AlreadySubscribed {
        /// The conflicting handler identity.
        handler: String,
    },
}

impl SubscribeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use typebus::SubscribeError;
    ///
    /// let err = SubscribeError::AlreadySubscribed { handler: "audit".into() };
    /// assert_eq!(err.as_label(), "already_subscribed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SubscribeError::AlreadySubscribed { .. } => "already_subscribed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SubscribeError::AlreadySubscribed { handler } => {
                format!("duplicate subscription for handler={handler}")
            }
        }
    }
}

/// # Failures produced by handler invocations.
///
/// A handler either returns [`HandlerError::Fail`] itself, or panics and
/// (with [`BusConfig::catch_panics`](crate::BusConfig) enabled) is recorded
/// as [`HandlerError::Panicked`]. Either way dispatch continues with the
/// remaining handlers in the snapshot.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The handler reported a failure for this message.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The handler panicked while processing the message.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Formatted panic payload.
        info: String,
    },
}

impl HandlerError {
    /// Shorthand constructor for [`HandlerError::Fail`].
    ///
    /// # Example
    /// ```
    /// use typebus::HandlerError;
    ///
    /// let err = HandlerError::fail("connection refused");
    /// assert_eq!(err.as_label(), "handler_failed");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the failure.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => format!("error: {error}"),
            HandlerError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// True if this failure came from a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panicked { .. })
    }
}
