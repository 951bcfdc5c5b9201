use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Per-instance call counters
#[derive(Debug, Default)]
pub(crate) struct ThrottleStats {
    passed_through: AtomicU64,
    immediate: AtomicU64,
    scheduled: AtomicU64,
    fired: AtomicU64,
    dropped: AtomicU64,
    cancelled: AtomicU64,
}

impl ThrottleStats {
    #[inline]
    pub fn record_passed_through(&self) {
        self.passed_through.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_immediate(&self) {
        self.immediate.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_scheduled(&self) {
        self.scheduled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_fired(&self) {
        self.fired.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ThrottleStatsSnapshot {
        ThrottleStatsSnapshot {
            passed_through: self.passed_through.load(Ordering::Relaxed),
            immediate: self.immediate.load(Ordering::Relaxed),
            scheduled: self.scheduled.load(Ordering::Relaxed),
            fired: self.fired.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a wrapper's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThrottleStatsSnapshot {
    /// Calls forwarded synchronously because the wrapper was closed or destroyed
    pub passed_through: u64,

    /// Calls forwarded synchronously by the one-shot immediate flag
    pub immediate: u64,

    /// Calls that opened a window and were deferred
    pub scheduled: u64,

    /// Deferred calls that actually ran
    pub fired: u64,

    /// Calls discarded because a deferred call was already pending
    pub dropped: u64,

    /// Deferred calls cancelled before they ran
    pub cancelled: u64,
}

impl ThrottleStatsSnapshot {
    /// Number of times the wrapped callback has run
    pub fn invocations(&self) -> u64 {
        self.passed_through + self.immediate + self.fired
    }
}
