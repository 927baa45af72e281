//! # Bus configuration.
//!
//! Provides [`BusConfig`] centralized settings for the dispatch engine.
//!
//! ## Sentinel values
//! - `slow_handler = 0s` → slow-handler warnings disabled (treated as `None`
//!   by [`BusConfig::slow_handler_threshold`])

use std::time::Duration;

/// Configuration for a [`MessageBus`](crate::MessageBus).
///
/// Defines:
/// - **Observability**: warn threshold for slow handler invocations
/// - **Failure containment**: whether handler panics are caught
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks (`0s`) across the codebase.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Warn (via `tracing`) when a single handler invocation takes longer
    /// than this.
    ///
    /// - `Duration::ZERO` = disabled
    /// - `> 0` = applied per handler invocation, in both publish paths
    ///
    /// Handler execution time is otherwise unbounded; this is observability,
    /// not a limit.
    pub slow_handler: Duration,

    /// Catch panics inside handlers and record them as
    /// [`HandlerError::Panicked`](crate::HandlerError) in the
    /// [`DispatchReport`](crate::DispatchReport).
    ///
    /// When `false`, a panicking handler unwinds into the publisher and
    /// aborts delivery to the rest of the snapshot.
    pub catch_panics: bool,
}

impl BusConfig {
    /// Returns the slow-handler warn threshold as an `Option`.
    ///
    /// - `None` → warnings disabled
    /// - `Some(d)` → warn when an invocation exceeds `d`
    #[inline]
    pub fn slow_handler_threshold(&self) -> Option<Duration> {
        if self.slow_handler == Duration::ZERO {
            None
        } else {
            Some(self.slow_handler)
        }
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `slow_handler = 1s` (publish awaits every handler, so anything
    ///   slower than this is worth a warning)
    /// - `catch_panics = true` (one panicking handler must not take down
    ///   the publisher or the rest of the snapshot)
    fn default() -> Self {
        Self {
            slow_handler: Duration::from_secs(1),
            catch_panics: true,
        }
    }
}
