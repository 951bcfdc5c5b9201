use std::time::Duration;

use crate::error::Result;
use crate::error::SchedulerError;

/// Convert a millisecond count, as written in configuration files, into a delay
///
/// Fractional milliseconds are kept. Negative, NaN and infinite values are
/// rejected, as are values too large for a `Duration`.
pub fn delay_from_millis(millis: f64) -> Result<Duration> {
    if !millis.is_finite() || millis < 0.0 {
        return Err(SchedulerError::InvalidDelay(millis));
    }

    Duration::try_from_secs_f64(millis / 1000.0).map_err(|_| SchedulerError::InvalidDelay(millis))
}

/// Convert a delay into fractional milliseconds
#[inline(always)]
pub fn duration_as_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
