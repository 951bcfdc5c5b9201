//! # wu_timer
//!
//! Deferred-execution scheduling used by the throttle and debounce wrappers.
//!
//! Callers never reach for a process-wide timer: every wrapper is handed a
//! [`Scheduler`]. [`TokioScheduler`] drives real timers on a tokio runtime and
//! [`ManualScheduler`] runs on a virtual clock advanced by hand.

pub mod error;
pub mod manual;
pub mod scheduler;
pub mod time;
pub mod tokio_scheduler;

pub use error::Result;
pub use error::SchedulerError;
pub use manual::ManualScheduler;
pub use scheduler::Scheduler;
pub use scheduler::Task;
pub use scheduler::TimerHandle;
pub use time::delay_from_millis;
pub use time::duration_as_millis;
pub use tokio_scheduler::TokioScheduler;
