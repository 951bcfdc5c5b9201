use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;
use tracing::trace;
use wu_timer::Scheduler;
use wu_timer::TimerHandle;

use crate::error::Result;
use crate::error::ThrottleError;
use crate::stats::ThrottleStats;
use crate::stats::ThrottleStatsSnapshot;

/// What a throttled call did with its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// Callback ran synchronously because the throttle is closed or destroyed
    PassedThrough,

    /// Callback ran synchronously, consuming the one-shot immediate flag
    Immediate,

    /// Callback will run after the delay with these arguments
    Scheduled,

    /// A call is already pending in this window; arguments were discarded
    Dropped,
}

impl CallOutcome {
    /// Whether the callback ran before `call` returned
    pub fn ran_now(self) -> bool {
        matches!(self, CallOutcome::PassedThrough | CallOutcome::Immediate)
    }
}

/// Throttle wrapper allowing at most one callback execution per window
///
/// The first call in a window is deferred by the configured delay and runs
/// with its own arguments; calls arriving while it is pending are dropped.
/// Once the deferred call has run the next call opens a new window.
///
/// [`close`](Self::close) suspends throttling so every call runs
/// synchronously, [`open`](Self::open) restores it, and
/// [`destroy`](Self::destroy) cancels any pending call and turns the
/// wrapper into a permanent pass-through.
///
/// Clones share one instance. A pending call keeps the instance alive, so
/// dropping every clone does not cancel it.
pub struct Throttle<A> {
    inner: Arc<ThrottleInner<A>>,
}

struct ThrottleInner<A> {
    func: Box<dyn Fn(A) + Send + Sync>,
    delay: Duration,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<ThrottleState>,
    stats: ThrottleStats,
}

#[derive(Debug)]
struct ThrottleState {
    /// Deferred call in flight, if any
    pending: Option<TimerHandle>,

    /// False from scheduling until the deferred call has finished
    ready: bool,

    /// One-shot synchronous first call
    immediate: bool,

    /// Throttling paused; calls pass straight through
    suspended: bool,

    /// Permanent pass-through; implies `suspended`
    terminated: bool,
}

impl<A: Send + 'static> Throttle<A> {
    /// Route a call through the throttle
    ///
    /// The callback runs without any internal lock held, so it may call back
    /// into this throttle.
    pub fn call(&self, args: A) -> CallOutcome {
        let mut state = self.inner.state.lock();

        if state.terminated || state.suspended {
            drop(state);
            self.inner.stats.record_passed_through();
            (self.inner.func)(args);
            return CallOutcome::PassedThrough;
        }

        if state.immediate {
            state.immediate = false;
            drop(state);
            self.inner.stats.record_immediate();
            (self.inner.func)(args);
            return CallOutcome::Immediate;
        }

        if !state.ready {
            drop(state);
            self.inner.stats.record_dropped();
            trace!("throttled call dropped");
            return CallOutcome::Dropped;
        }

        // State stays locked until the handle is stored; the timer takes the
        // same lock before it runs, so it cannot observe a half-open window.
        state.ready = false;
        let inner = Arc::clone(&self.inner);
        let handle = self.inner.scheduler.schedule(self.inner.delay, Box::new(move || inner.fire(args)));
        state.pending = Some(handle);
        drop(state);

        self.inner.stats.record_scheduled();
        trace!(%handle, delay = ?self.inner.delay, "throttled call scheduled");
        CallOutcome::Scheduled
    }

    /// Plain closure forwarding to [`call`](Self::call)
    pub fn as_fn(&self) -> impl Fn(A) + Send + Sync + Clone + 'static {
        let throttle = self.clone();
        move |args| {
            throttle.call(args);
        }
    }
}

impl<A> Throttle<A> {
    /// Resume throttling after [`close`](Self::close); no effect once destroyed
    pub fn open(&self) {
        let mut state = self.inner.state.lock();
        if state.terminated {
            return;
        }
        if state.suspended {
            state.suspended = false;
            debug!("throttle opened");
        }
    }

    /// Suspend throttling; calls run synchronously until reopened
    ///
    /// A call that is already scheduled is left alone and still runs.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        if !state.suspended {
            state.suspended = true;
            debug!("throttle closed");
        }
    }

    /// Permanently disable throttling and cancel any pending call
    ///
    /// Idempotent. Every later call runs synchronously.
    pub fn destroy(&self) {
        let mut state = self.inner.state.lock();
        if state.terminated {
            return;
        }

        state.terminated = true;
        state.suspended = true;
        if let Some(handle) = state.pending.take() {
            if self.inner.scheduler.cancel(handle) {
                self.inner.stats.record_cancelled();
                debug!(%handle, "pending throttled call cancelled");
            }
        }
        debug!("throttle destroyed");
    }

    /// Whether calls currently bypass throttling
    pub fn is_suspended(&self) -> bool {
        self.inner.state.lock().suspended
    }

    /// Whether [`destroy`](Self::destroy) has been called
    pub fn is_terminated(&self) -> bool {
        self.inner.state.lock().terminated
    }

    /// Whether a deferred call is waiting to run
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    /// Window length
    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Counters for this instance
    pub fn stats(&self) -> ThrottleStatsSnapshot {
        self.inner.stats.snapshot()
    }
}

impl<A> ThrottleInner<A> {
    fn fire(&self, args: A) {
        {
            let mut state = self.state.lock();
            // Lost a race with destroy()
            if state.terminated {
                return;
            }
            state.pending = None;
        }

        self.stats.record_fired();
        (self.func)(args);

        self.state.lock().ready = true;
    }
}

impl<A> Clone for Throttle<A> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<A> fmt::Debug for Throttle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Throttle")
            .field("delay", &self.inner.delay)
            .field("pending", &state.pending)
            .field("ready", &state.ready)
            .field("immediate", &state.immediate)
            .field("suspended", &state.suspended)
            .field("terminated", &state.terminated)
            .finish()
    }
}

/// Wrap `func` in a throttle with the given window
///
/// Shorthand for [`ThrottleBuilder`] when every setting is known up front.
pub fn wrap<A, F>(scheduler: Arc<dyn Scheduler>, func: F, delay: Duration, immediate: bool) -> Throttle<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Throttle {
        inner: Arc::new(ThrottleInner {
            func: Box::new(func),
            delay,
            scheduler,
            state: Mutex::new(ThrottleState { pending: None, ready: true, immediate, suspended: false, terminated: false }),
            stats: ThrottleStats::default(),
        }),
    }
}

/// Builder for configuring a throttle
#[derive(Default)]
pub struct ThrottleBuilder {
    delay: Option<Duration>,
    immediate: bool,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl ThrottleBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window length
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Run the first call synchronously instead of deferring it
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Set the scheduler that runs deferred calls
    pub fn scheduler<S: Scheduler + 'static>(mut self, scheduler: S) -> Self {
        self.scheduler = Some(Arc::new(scheduler));
        self
    }

    /// Set an already shared scheduler
    pub fn scheduler_arc(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Build the throttle around `func`
    pub fn build<A, F>(self, func: F) -> Result<Throttle<A>>
    where
        A: Send + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        let scheduler = self.scheduler.ok_or(ThrottleError::MissingScheduler)?;
        let delay = self.delay.ok_or(ThrottleError::InvalidConfig("delay must be set"))?;
        Ok(wrap(scheduler, func, delay, self.immediate))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use wu_timer::ManualScheduler;

    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    fn recording(scheduler: &ManualScheduler, immediate: bool) -> (Throttle<u32>, Arc<Mutex<Vec<u32>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let throttle = ThrottleBuilder::new()
            .delay(WINDOW)
            .immediate(immediate)
            .scheduler(scheduler.clone())
            .build(move |value: u32| sink.lock().push(value))
            .unwrap();
        (throttle, calls)
    }

    #[test]
    fn test_builder_requires_scheduler() {
        let result = ThrottleBuilder::new().delay(WINDOW).build(|_: ()| {});
        assert!(matches!(result, Err(ThrottleError::MissingScheduler)));
    }

    #[test]
    fn test_builder_requires_delay() {
        let result = ThrottleBuilder::new().scheduler(ManualScheduler::new()).build(|_: ()| {});
        assert!(matches!(result, Err(ThrottleError::InvalidConfig(_))));
    }

    #[test]
    fn test_first_call_is_deferred() {
        let scheduler = ManualScheduler::new();
        let (throttle, calls) = recording(&scheduler, false);

        assert_eq!(throttle.call(1), CallOutcome::Scheduled);
        assert!(calls.lock().is_empty());
        assert!(throttle.is_pending());

        scheduler.advance(WINDOW);
        assert_eq!(*calls.lock(), vec![1]);
        assert!(!throttle.is_pending());
    }

    #[test]
    fn test_calls_within_window_are_dropped() {
        let scheduler = ManualScheduler::new();
        let (throttle, calls) = recording(&scheduler, false);

        assert_eq!(throttle.call(1), CallOutcome::Scheduled);
        scheduler.advance(Duration::from_millis(30));
        assert_eq!(throttle.call(2), CallOutcome::Dropped);
        scheduler.advance(Duration::from_millis(60));
        assert_eq!(throttle.call(3), CallOutcome::Dropped);

        scheduler.advance(Duration::from_millis(10));
        assert_eq!(*calls.lock(), vec![1]);
        assert_eq!(throttle.stats().dropped, 2);
    }

    #[test]
    fn test_next_call_after_fire_opens_new_window() {
        let scheduler = ManualScheduler::new();
        let (throttle, calls) = recording(&scheduler, false);

        throttle.call(1);
        scheduler.advance(WINDOW);
        assert_eq!(throttle.call(2), CallOutcome::Scheduled);

        scheduler.advance(Duration::from_millis(99));
        assert_eq!(*calls.lock(), vec![1]);
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(*calls.lock(), vec![1, 2]);
    }

    #[test]
    fn test_immediate_flag_is_one_shot() {
        let scheduler = ManualScheduler::new();
        let (throttle, calls) = recording(&scheduler, true);

        assert_eq!(throttle.call(1), CallOutcome::Immediate);
        assert_eq!(*calls.lock(), vec![1]);

        assert_eq!(throttle.call(2), CallOutcome::Scheduled);
        assert_eq!(throttle.call(3), CallOutcome::Dropped);
        scheduler.advance(WINDOW);
        assert_eq!(*calls.lock(), vec![1, 2]);
    }

    #[test]
    fn test_close_passes_calls_through() {
        let scheduler = ManualScheduler::new();
        let (throttle, calls) = recording(&scheduler, false);

        throttle.call(1);
        throttle.close();
        assert!(throttle.is_suspended());

        assert_eq!(throttle.call(2), CallOutcome::PassedThrough);
        assert_eq!(throttle.call(3), CallOutcome::PassedThrough);
        assert_eq!(*calls.lock(), vec![2, 3]);

        // Call scheduled before close still runs
        scheduler.advance(WINDOW);
        assert_eq!(*calls.lock(), vec![2, 3, 1]);
    }

    #[test]
    fn test_open_restores_throttling() {
        let scheduler = ManualScheduler::new();
        let (throttle, calls) = recording(&scheduler, false);

        throttle.close();
        throttle.call(1);
        throttle.open();
        assert!(!throttle.is_suspended());

        assert_eq!(throttle.call(2), CallOutcome::Scheduled);
        assert_eq!(throttle.call(3), CallOutcome::Dropped);
        scheduler.advance(WINDOW);
        assert_eq!(*calls.lock(), vec![1, 2]);
    }

    #[test]
    fn test_close_does_not_consume_immediate() {
        let scheduler = ManualScheduler::new();
        let (throttle, _calls) = recording(&scheduler, true);

        throttle.close();
        assert_eq!(throttle.call(1), CallOutcome::PassedThrough);
        throttle.open();
        assert_eq!(throttle.call(2), CallOutcome::Immediate);
    }

    #[test]
    fn test_destroy_cancels_pending_call() {
        let scheduler = ManualScheduler::new();
        let (throttle, calls) = recording(&scheduler, false);

        throttle.call(1);
        throttle.destroy();
        assert!(!throttle.is_pending());
        assert_eq!(scheduler.pending(), 0);

        scheduler.advance(WINDOW * 10);
        assert!(calls.lock().is_empty());
        assert_eq!(throttle.stats().cancelled, 1);
    }

    #[test]
    fn test_destroy_is_permanent_pass_through() {
        let scheduler = ManualScheduler::new();
        let (throttle, calls) = recording(&scheduler, false);

        throttle.destroy();
        throttle.destroy();
        throttle.open();

        assert!(throttle.is_terminated());
        assert!(throttle.is_suspended());
        assert_eq!(throttle.call(1), CallOutcome::PassedThrough);
        assert_eq!(throttle.call(2), CallOutcome::PassedThrough);
        assert_eq!(*calls.lock(), vec![1, 2]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_callback_may_reenter() {
        let scheduler = ManualScheduler::new();
        let slot: Arc<Mutex<Option<Throttle<u32>>>> = Arc::new(Mutex::new(None));
        let outcomes = Arc::new(Mutex::new(Vec::new()));

        let reentry = Arc::clone(&slot);
        let seen = Arc::clone(&outcomes);
        let throttle = ThrottleBuilder::new()
            .delay(WINDOW)
            .immediate(true)
            .scheduler(scheduler.clone())
            .build(move |depth: u32| {
                if depth == 0 {
                    let throttle = reentry.lock().clone();
                    if let Some(throttle) = throttle {
                        seen.lock().push(throttle.call(depth + 1));
                    }
                }
            })
            .unwrap();
        *slot.lock() = Some(throttle.clone());

        assert_eq!(throttle.call(0), CallOutcome::Immediate);
        assert_eq!(*outcomes.lock(), vec![CallOutcome::Scheduled]);
    }

    #[test]
    fn test_dropping_handles_keeps_scheduled_call() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&counter);

        let throttle = wrap(
            Arc::new(scheduler.clone()),
            move |_: ()| {
                hits.fetch_add(1, Ordering::SeqCst);
            },
            WINDOW,
            false,
        );
        throttle.call(());
        drop(throttle);

        scheduler.advance(WINDOW);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_as_fn() {
        let scheduler = ManualScheduler::new();
        let (throttle, calls) = recording(&scheduler, false);
        let throttled = throttle.as_fn();

        throttled(7);
        throttled(8);
        scheduler.advance(WINDOW);
        assert_eq!(*calls.lock(), vec![7]);
    }

    #[test]
    fn test_ran_now() {
        assert!(CallOutcome::PassedThrough.ran_now());
        assert!(CallOutcome::Immediate.ran_now());
        assert!(!CallOutcome::Scheduled.ran_now());
        assert!(!CallOutcome::Dropped.ran_now());
    }
}
