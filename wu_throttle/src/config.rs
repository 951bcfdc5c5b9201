use serde::Deserialize;
use serde::Serialize;
use wu_timer::delay_from_millis;

use crate::debounce::DebounceBuilder;
use crate::error::Result;
use crate::throttle::ThrottleBuilder;

/// Throttle settings as read from a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Window length in milliseconds
    pub delay_ms: f64,

    /// Run the first call synchronously
    #[serde(default)]
    pub immediate: bool,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { delay_ms: 1000.0, immediate: false }
    }
}

impl ThrottleConfig {
    /// Validate the settings and seed a builder with them
    ///
    /// The scheduler still has to be supplied before building.
    pub fn to_builder(&self) -> Result<ThrottleBuilder> {
        let delay = delay_from_millis(self.delay_ms)?;
        Ok(ThrottleBuilder::new().delay(delay).immediate(self.immediate))
    }
}

/// Debounce settings as read from a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Quiet period in milliseconds
    pub delay_ms: f64,

    /// Run the first call synchronously
    #[serde(default)]
    pub immediate: bool,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { delay_ms: 1000.0, immediate: false }
    }
}

impl DebounceConfig {
    /// Validate the settings and seed a builder with them
    pub fn to_builder(&self) -> Result<DebounceBuilder> {
        let delay = delay_from_millis(self.delay_ms)?;
        Ok(DebounceBuilder::new().delay(delay).immediate(self.immediate))
    }
}
