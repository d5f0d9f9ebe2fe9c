//! Per-request timers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::tracer::key::ContextKey;

/// Source of monotonic time.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

/// Start time of one in-flight request.
///
/// Not `Clone`: the exit hook consumes it, so a timer is read exactly once
/// and only by the task that created it.
#[derive(Debug)]
pub struct PendingTimer {
    key: ContextKey,
    started: Instant,
}

impl PendingTimer {
    pub(crate) fn start(key: ContextKey, started: Instant) -> Self {
        Self { key, started }
    }

    pub fn key(&self) -> &ContextKey {
        &self.key
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    /// Nanoseconds between start and `now`, never negative.
    pub fn elapsed_nanos(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.started);
        u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
    }
}
