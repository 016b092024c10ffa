//! Time source for record timestamps.
//!
//! Records store epoch milliseconds, so every clock hands out instants
//! already truncated to millisecond precision. A value read back from either
//! backend therefore compares equal to the one that was written.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        from_millis(Utc::now().timestamp_millis())
    }
}

/// Hand-driven clock. Each call to [`Clock::now`] returns the current value
/// and then advances it by `step_ms`, so consecutive writes get distinct,
/// increasing timestamps.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
    step_ms: i64,
}

impl ManualClock {
    pub fn new(start_ms: i64, step_ms: i64) -> Self {
        Self {
            millis: AtomicI64::new(start_ms),
            step_ms,
        }
    }

    /// Frozen clock: every call returns `at_ms`.
    pub fn frozen(at_ms: i64) -> Self {
        Self::new(at_ms, 0)
    }

    pub fn set(&self, ms: i64) {
        self.millis.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: i64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        from_millis(self.millis.fetch_add(self.step_ms, Ordering::SeqCst))
    }
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
}
