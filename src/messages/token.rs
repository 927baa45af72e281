//! # Delivery-group token.
//!
//! A [`Token`] partitions subscribers of the same message type into
//! independent delivery groups. A publish call targets exactly one group:
//! handlers registered under a different token never see the message, even
//! when their declared type matches.
//!
//! [`Token::Default`] is the distinguished "no token" group used when the
//! caller does not care about grouping.

use std::fmt;
use std::sync::Arc;

/// Opaque key selecting a delivery group under one message type.
///
/// Tokens are cheap to clone (`Arc`-backed names) and are compared by value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Token {
    /// The distinguished "no token" group.
    #[default]
    Default,
    /// A named delivery group.
    Named(Arc<str>),
}

impl Token {
    /// Creates a named token.
    ///
    /// # Example
    /// ```
    /// use typebus::Token;
    ///
    /// let t = Token::named("billing");
    /// assert_ne!(t, Token::Default);
    /// assert_eq!(t, Token::named("billing"));
    /// ```
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Token::Named(name.into())
    }

    /// True for the distinguished default group.
    #[inline]
    pub fn is_default(&self) -> bool {
        matches!(self, Token::Default)
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Token::named(name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Default => f.write_str("<default>"),
            Token::Named(name) => f.write_str(name),
        }
    }
}
