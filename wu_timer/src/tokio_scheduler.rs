use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::trace;

use crate::error::Result;
use crate::error::SchedulerError;
use crate::scheduler::Scheduler;
use crate::scheduler::Task;
use crate::scheduler::TimerHandle;

/// Scheduler backed by tokio timers
///
/// Every scheduled task is a spawned tokio task sleeping for its delay.
/// Whoever removes a timer's slot from the table first owns it: the timer
/// runs its task, or `cancel` aborts it. Clones share the same table.
#[derive(Clone)]
pub struct TokioScheduler {
    runtime: Handle,

    /// Live timers; the abort handle is filled in right after spawning
    timers: Arc<DashMap<TimerHandle, Option<AbortHandle>>>,

    next_id: Arc<AtomicU64>,

    epoch: Instant,
}

impl TokioScheduler {
    /// Create a scheduler on the runtime the caller is running inside
    pub fn current() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        Ok(Self::with_handle(runtime))
    }

    /// Create a scheduler that spawns its timers onto `runtime`
    pub fn with_handle(runtime: Handle) -> Self {
        let epoch = {
            let _guard = runtime.enter();
            Instant::now()
        };

        Self { runtime, timers: Arc::new(DashMap::new()), next_id: Arc::new(AtomicU64::new(0)), epoch }
    }

    /// Number of timers that have neither fired nor been cancelled
    pub fn active(&self) -> usize {
        self.timers.len()
    }

    /// Cancel every live timer, returning how many were cancelled
    pub fn cancel_all(&self) -> usize {
        let handles: Vec<TimerHandle> = self.timers.iter().map(|entry| *entry.key()).collect();
        handles.into_iter().filter(|handle| self.cancel(*handle)).count()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let handle = TimerHandle::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));

        // Slot goes in before the spawn so a zero-delay timer always finds it
        self.timers.insert(handle, None);

        let timers = Arc::clone(&self.timers);
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if timers.remove(&handle).is_none() {
                return;
            }
            trace!(%handle, "timer fired");
            task();
        });

        if let Some(mut slot) = self.timers.get_mut(&handle) {
            *slot = Some(join.abort_handle());
        }

        trace!(%handle, ?delay, "timer scheduled");
        handle
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        match self.timers.remove(&handle) {
            Some((_, slot)) => {
                if let Some(abort) = slot {
                    abort.abort();
                }
                trace!(%handle, "timer cancelled");
                true
            }
            None => false,
        }
    }

    fn now(&self) -> Duration {
        let _guard = self.runtime.enter();
        Instant::now().saturating_duration_since(self.epoch)
    }
}

impl fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioScheduler").field("active", &self.timers.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counting_task(counter: &Arc<AtomicUsize>) -> Task {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_requires_runtime() {
        assert!(matches!(TokioScheduler::current(), Err(SchedulerError::NoRuntime)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let scheduler = TokioScheduler::current().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(Duration::from_millis(100), counting_task(&counter));
        assert_eq!(scheduler.active(), 1);

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_run() {
        let scheduler = TokioScheduler::current().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.schedule(Duration::from_millis(50), counting_task(&counter));
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_fire_reports_false() {
        let scheduler = TokioScheduler::current().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.schedule(Duration::from_millis(10), counting_task(&counter));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!scheduler.cancel(handle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let scheduler = TokioScheduler::current().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for delay in [10, 20, 30] {
            scheduler.schedule(Duration::from_millis(delay), counting_task(&counter));
        }

        assert_eq!(scheduler.cancel_all(), 3);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_now_tracks_runtime_clock() {
        let scheduler = TokioScheduler::current().unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(scheduler.now() >= Duration::from_secs(5));
    }
}
