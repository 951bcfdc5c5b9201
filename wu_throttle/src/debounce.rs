use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;
use wu_timer::Scheduler;
use wu_timer::TimerHandle;

use crate::error::Result;
use crate::error::ThrottleError;
use crate::stats::ThrottleStats;
use crate::stats::ThrottleStatsSnapshot;

/// What a debounced call did with its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceOutcome {
    /// Callback ran synchronously, consuming the one-shot immediate flag
    Immediate,

    /// Nothing was pending; callback will run after the quiet period
    Scheduled,

    /// A pending call was cancelled and replaced by this one
    Rescheduled,
}

/// Debounce wrapper running the callback once calls stop arriving
///
/// Each call cancels the pending one and restarts the quiet period, so a
/// burst of calls results in a single execution with the last arguments,
/// one delay after the last call.
///
/// Clones share one instance.
pub struct Debounce<A> {
    inner: Arc<DebounceInner<A>>,
}

struct DebounceInner<A> {
    func: Box<dyn Fn(A) + Send + Sync>,
    delay: Duration,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<DebounceState>,
    stats: ThrottleStats,
}

#[derive(Debug)]
struct DebounceState {
    pending: Option<TimerHandle>,
    immediate: bool,

    /// Bumped on every reschedule; a timer carrying an older value is stale
    generation: u64,
}

impl<A: Send + 'static> Debounce<A> {
    /// Route a call through the debouncer
    pub fn call(&self, args: A) -> DebounceOutcome {
        let mut state = self.inner.state.lock();

        if state.immediate {
            state.immediate = false;
            drop(state);
            self.inner.stats.record_immediate();
            (self.inner.func)(args);
            return DebounceOutcome::Immediate;
        }

        let outcome = match state.pending.take() {
            Some(previous) => {
                if self.inner.scheduler.cancel(previous) {
                    self.inner.stats.record_cancelled();
                }
                DebounceOutcome::Rescheduled
            }
            None => DebounceOutcome::Scheduled,
        };

        state.generation += 1;
        let generation = state.generation;
        let inner = Arc::clone(&self.inner);
        let handle = self.inner.scheduler.schedule(self.inner.delay, Box::new(move || inner.fire(generation, args)));
        state.pending = Some(handle);
        drop(state);

        self.inner.stats.record_scheduled();
        trace!(%handle, ?outcome, "debounced call scheduled");
        outcome
    }

    /// Plain closure forwarding to [`call`](Self::call)
    pub fn as_fn(&self) -> impl Fn(A) + Send + Sync + Clone + 'static {
        let debounce = self.clone();
        move |args| {
            debounce.call(args);
        }
    }
}

impl<A> Debounce<A> {
    /// Drop the pending call, if any; returns whether one was pending
    pub fn cancel(&self) -> bool {
        let mut state = self.inner.state.lock();
        state.generation += 1;
        match state.pending.take() {
            Some(handle) => {
                if self.inner.scheduler.cancel(handle) {
                    self.inner.stats.record_cancelled();
                }
                true
            }
            None => false,
        }
    }

    /// Whether a call is waiting for the quiet period to end
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    /// Quiet period length
    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Counters for this instance
    pub fn stats(&self) -> ThrottleStatsSnapshot {
        self.inner.stats.snapshot()
    }
}

impl<A> DebounceInner<A> {
    fn fire(&self, generation: u64, args: A) {
        {
            let mut state = self.state.lock();
            if state.generation != generation {
                return;
            }
            state.pending = None;
        }

        self.stats.record_fired();
        (self.func)(args);
    }
}

impl<A> Clone for Debounce<A> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<A> fmt::Debug for Debounce<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Debounce")
            .field("delay", &self.inner.delay)
            .field("pending", &state.pending)
            .field("immediate", &state.immediate)
            .finish()
    }
}

/// Builder for configuring a debouncer
#[derive(Default)]
pub struct DebounceBuilder {
    delay: Option<Duration>,
    immediate: bool,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl DebounceBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quiet period
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

    /// Build the debouncer around `func`
    pub fn build<A, F>(self, func: F) -> Result<Debounce<A>>
    where
        A: Send + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        let scheduler = self.scheduler.ok_or(ThrottleError::MissingScheduler)?;
        let delay = self.delay.ok_or(ThrottleError::InvalidConfig("delay must be set"))?;

        Ok(Debounce {
            inner: Arc::new(DebounceInner {
                func: Box::new(func),
                delay,
                scheduler,
                state: Mutex::new(DebounceState { pending: None, immediate: self.immediate, generation: 0 }),
                stats: ThrottleStats::default(),
            }),
        })
    }
}
