//! Concurrency primitives shared by the units of one run.
//!
//! - [`RateLimiter`]: a single periodic ticker capping fetch *starts*.
//! - [`SeenSet`]: the run-wide deduplication set with publish-if-new.
//!
//! The in-flight cap is a plain `tokio::sync::Semaphore`.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Start-rate limiter shared by every unit of a run.
///
/// Each call to [`RateLimiter::until_ready`] consumes one tick. Ticks fire at a
/// fixed period and are never bunched up after a stall, so at most
/// `1s / period` waiters are released per second.
pub struct RateLimiter {
    ticker: tokio::sync::Mutex<Interval>,
}

impl RateLimiter {
    /// Create a limiter releasing one waiter per `period`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut ticker = interval(period.max(Duration::from_nanos(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticker: tokio::sync::Mutex::new(ticker),
        }
    }

    /// Create a limiter allowing `per_second` starts per second.
    pub fn per_second(per_second: u32) -> Self {
        Self::new(Duration::from_secs(1) / per_second.max(1))
    }

    /// Wait for the next tick.
    pub async fn until_ready(&self) {
        self.ticker.lock().await.tick().await;
    }
}

/// Run-wide set of subdomains already published.
#[derive(Debug, Default)]
pub struct SeenSet {
    seen: Mutex<HashSet<String>>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish every match not seen before and return how many were sent.
    ///
    /// The whole batch is checked, inserted and sent under one lock, so two
    /// units can never both publish the same new subdomain. A closed receiver
    /// does not stop the bookkeeping.
    pub fn publish_new<I>(&self, matches: I, sink: &UnboundedSender<String>) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut published = 0;

        for m in matches {
            if seen.contains(&m) {
                continue;
            }
            seen.insert(m.clone());
            tracing::trace!(subdomain = %m, "publishing");
            // Send fails only once the receiver is gone.
            let _ = sink.send(m);
            published += 1;
        }

        published
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, subdomain: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(subdomain)
    }
}
