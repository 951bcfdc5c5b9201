use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rapidhash::RapidHashMap;

use crate::scheduler::Scheduler;
use crate::scheduler::Task;
use crate::scheduler::TimerHandle;

/// Scheduler driven by a virtual clock
///
/// Time only moves when [`advance`](Self::advance) or
/// [`run_until_idle`](Self::run_until_idle) is called, which makes timing
/// behavior fully deterministic. Due tasks run in deadline order; tasks with
/// equal deadlines run in the order they were scheduled.
///
/// Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    /// Current virtual time
    now: Duration,

    /// Next sequence number, doubles as the timer id
    next_seq: u64,

    /// Pending tasks keyed by (deadline, sequence)
    queue: BTreeMap<(Duration, u64), Task>,

    /// Deadline lookup for cancellation
    deadlines: RapidHashMap<u64, Duration>,
}

impl ManualScheduler {
    /// Create a scheduler with its clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `by`, running every task that falls due
    ///
    /// Tasks scheduled while advancing run too if their deadline lies inside
    /// the window. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.inner.lock().now.saturating_add(by);
        self.run_until(target)
    }

    /// Run queued tasks until none remain, moving the clock to each deadline
    ///
    /// Does not return while tasks keep rescheduling themselves.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(deadline) = self.next_deadline() {
            ran += self.run_until(deadline);
        }
        ran
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Deadline of the earliest pending task
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner.lock().queue.keys().next().map(|(deadline, _)| *deadline)
    }

    fn run_until(&self, target: Duration) -> usize {
        let mut ran = 0;

        loop {
            // The lock is released before the task runs so it can schedule or cancel
            let task = {
                let mut state = self.inner.lock();
                let Some(entry) = state.queue.first_entry() else {
                    break;
                };
                if entry.key().0 > target {
                    break;
                }

                let ((deadline, seq), task) = entry.remove_entry();
                state.deadlines.remove(&seq);
                state.now = state.now.max(deadline);
                task
            };

            task();
            ran += 1;
        }

        let mut state = self.inner.lock();
        state.now = state.now.max(target);
        ran
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let mut state = self.inner.lock();
        let seq = state.next_seq;
        state.next_seq += 1;

        let deadline = state.now.saturating_add(delay);
        state.queue.insert((deadline, seq), task);
        state.deadlines.insert(seq, deadline);

        TimerHandle::from_raw(seq)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let mut state = self.inner.lock();
        match state.deadlines.remove(&handle.as_raw()) {
            Some(deadline) => state.queue.remove(&(deadline, handle.as_raw())).is_some(),
            None => false,
        }
    }

    fn now(&self) -> Duration {
        self.inner.lock().now
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("ManualScheduler").field("now", &state.now).field("pending", &state.queue.len()).finish()
    }
}
