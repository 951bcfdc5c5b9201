use thiserror::Error;

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors that can occur while setting up deferred execution
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SchedulerError {
    /// No tokio runtime is reachable from the calling thread
    #[error("No tokio runtime available on the current thread")]
    NoRuntime,

    /// Delay is negative, NaN, infinite or too large to represent
    #[error("Invalid delay: {0} ms")]
    InvalidDelay(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(SchedulerError::NoRuntime.to_string(), "No tokio runtime available on the current thread");
        assert_eq!(SchedulerError::InvalidDelay(-5.0).to_string(), "Invalid delay: -5 ms");
    }
}
