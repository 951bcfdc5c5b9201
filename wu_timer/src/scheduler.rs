use std::fmt;
use std::time::Duration;

/// Unit of deferred work handed to a scheduler
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Opaque identifier of a scheduled task, unique per scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wrap a raw scheduler-assigned id
    #[inline]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Raw scheduler-assigned id
    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Core trait for deferred-execution facilities
///
/// A scheduler runs each task at most once, no earlier than the requested
/// delay. Exact timing is not guaranteed and depends on the host's timer
/// granularity.
pub trait Scheduler: Send + Sync {
    /// Queue `task` to run once after `delay`
    ///
    /// Implementations must never run the task inline inside this call.
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;

    /// Cancel a queued task
    ///
    /// Returns `true` if the task was still pending. A cancelled task never runs.
    fn cancel(&self, handle: TimerHandle) -> bool;

    /// Time elapsed since the scheduler was created
    fn now(&self) -> Duration;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_raw_roundtrip() {
        let handle = TimerHandle::from_raw(42);
        assert_eq!(handle.as_raw(), 42);
        assert_eq!(handle.to_string(), "timer#42");
    }

    #[test]
    fn test_handle_ordering() {
        assert!(TimerHandle::from_raw(1) < TimerHandle::from_raw(2));
    }
}
