use thiserror::Error;
use wu_timer::SchedulerError;

/// Result type for building rate-limiting wrappers
pub type Result<T> = std::result::Result<T, ThrottleError>;

/// Errors raised while constructing a throttle or debounce wrapper
///
/// Calling a built wrapper never fails.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ThrottleError {
    /// No scheduler was supplied to the builder
    #[error("No scheduler configured")]
    MissingScheduler,

    /// Delay could not be converted
    #[error("Invalid delay: {0}")]
    InvalidDelay(#[from] SchedulerError),

    /// Any other invalid setting
    #[error("Invalid rate limiter configuration: {0}")]
    InvalidConfig(&'static str),
}
