//! Core data types for subdomain extraction.
//!
//! Run configuration and the live counters shared by every unit of a run.

use crate::error::ExtractorError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Default maximum number of fetches in flight.
pub const DEFAULT_MAX_THREADS: usize = 10;

/// Default maximum number of fetch starts per second.
pub const DEFAULT_MAX_RPS: u32 = 20;

/// Configuration options for an extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractConfig {
    /// Maximum number of concurrent fetches
    /// Default: 10
    pub max_threads: usize,

    /// Maximum number of fetches started per second, across all units
    /// Default: 20
    pub max_rps: u32,

    /// Accept any server certificate (expired, self-signed, wrong host)
    /// Default: true
    pub insecure: bool,

    /// Per-request timeout. `None` lets a hung connection hold its slot forever.
    /// Default: None
    pub timeout: Option<Duration>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_threads: DEFAULT_MAX_THREADS,
            max_rps: DEFAULT_MAX_RPS,
            insecure: true,
            timeout: None,
        }
    }
}

impl ExtractConfig {
    /// Set the concurrency cap.
    pub fn with_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the start-rate cap.
    pub fn with_rps(mut self, max_rps: u32) -> Self {
        self.max_rps = max_rps;
        self
    }

    /// Enable or disable certificate validation skipping.
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Period between two rate-limiter ticks.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(1) / self.max_rps.max(1)
    }

    /// Reject settings that would stall or panic the dispatcher.
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_threads == 0 {
            return Err(ExtractorError::config(
                "Maximum threads must be at least 1",
            ));
        }
        if self.max_rps == 0 {
            return Err(ExtractorError::config(
                "Maximum requests per second must be at least 1",
            ));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ExtractorError::config("Timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Live counters for a run, shared by every unit.
#[derive(Debug, Default)]
pub struct RunStats {
    dispatched: AtomicUsize,
    fetched: AtomicUsize,
    failed: AtomicUsize,
    emitted: AtomicUsize,
}

/// Point-in-time copy of [`RunStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// URLs handed to the dispatcher
    pub dispatched: usize,
    /// Fetches that returned a body
    pub fetched: usize,
    /// Fetches that failed for any reason
    pub failed: usize,
    /// Unique subdomains published
    pub emitted: usize,
}

impl StatsSnapshot {
    /// Units that finished their fetch, successfully or not.
    pub fn completed(&self) -> usize {
        self.fetched + self.failed
    }
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_dispatched(&self, count: usize) {
        self.dispatched.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch(&self, ok: bool) {
        if ok {
            self.fetched.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_emitted(&self, count: usize) {
        self.emitted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            fetched: self.fetched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            emitted: self.emitted.load(Ordering::Relaxed),
        }
    }
}
