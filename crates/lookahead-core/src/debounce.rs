//! Debounce stage: hold the latest value until the input has been quiet for
//! a full period.
//!
//! The stage is a plain state machine over [`tokio::time::Instant`]; the
//! pipeline driver owns the timer and calls [`Debouncer::take_due`] when the
//! [`deadline`](Debouncer::deadline) passes. Keeping time external makes the
//! stage trivially testable and lets the paused tokio clock drive it.

use std::time::Duration;
use tokio::time::Instant;

/// Quiet period used when the caller does not pick one.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug)]
pub struct Debouncer<T> {
    period: Duration,
    held: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(period: Duration) -> Self {
        Self { period, held: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Hold `value` and restart the timer from `now`.
    ///
    /// Returns the previously held value, which is now discarded.
    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        let deadline = now + self.period;
        self.held.replace((value, deadline)).map(|(old, _)| old)
    }

    /// When the held value becomes due, if one is held.
    pub fn deadline(&self) -> Option<Instant> {
        self.held.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Release the held value if its quiet period has fully elapsed at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.held {
            Some((_, deadline)) if deadline <= now => self.held.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Drop the held value without forwarding it. Used when the source ends.
    pub fn discard(&mut self) -> Option<T> {
        self.held.take().map(|(value, _)| value)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
