//! # wu_throttle
//!
//! Throttle and debounce wrappers around a single callback, driven by an
//! injected [`wu_timer::Scheduler`].

pub mod config;
pub mod debounce;
pub mod error;
mod stats;
pub mod throttle;

pub use config::DebounceConfig;
pub use config::ThrottleConfig;
pub use debounce::Debounce;
pub use debounce::DebounceBuilder;
pub use debounce::DebounceOutcome;
pub use error::Result;
pub use error::ThrottleError;
pub use stats::ThrottleStatsSnapshot;
pub use throttle::CallOutcome;
pub use throttle::Throttle;
pub use throttle::ThrottleBuilder;
pub use throttle::wrap;
