//! Trailing-edge debouncer on tokio timers.
//!
//! A [`Debouncer`] holds at most one pending payload. Scheduling a new
//! payload replaces the old one and restarts the quiet period, so a
//! burst of calls collapses into a single delivery of the last payload.
//! There is no cap on how often the deadline can be pushed back: input
//! that never pauses never fires.

use std::future;
use std::time::Duration;

use tokio::time::{self, Instant};

/// Cancellable trailing-edge delay.
///
/// The payload is typically the request to run once input settles, but
/// any type works, including a boxed callback.
#[derive(Debug)]
pub struct Debouncer<T> {
    interval: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    /// Schedule `payload` for delivery after the quiet period.
    ///
    /// Any previously scheduled payload is dropped without being
    /// delivered.
    pub fn schedule(&mut self, payload: T) {
        let deadline = Instant::now() + self.interval;
        if self.pending.replace((deadline, payload)).is_some() {
            tracing::trace!(interval = ?self.interval, "debounce restarted");
        }
    }

    /// Drop the pending payload, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the pending payload's deadline and take it.
    ///
    /// Never resolves while idle. Cancel-safe: dropping the future
    /// before it resolves leaves the pending payload in place, so this
    /// can be polled from a `tokio::select!` loop that also reschedules.
    pub async fn fired(&mut self) -> T {
        loop {
            let Some((deadline, _)) = self.pending.as_ref() else {
                return future::pending().await;
            };
            time::sleep_until(*deadline).await;
            if let Some((_, payload)) = self.pending.take() {
                return payload;
            }
        }
    }
}
