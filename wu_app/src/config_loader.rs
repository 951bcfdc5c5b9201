use std::path::Path;

use config::Config;
use config::ConfigError;
use config::File;
use serde::Deserialize;
use wu_throttle::DebounceConfig;
use wu_throttle::ThrottleConfig;

/// Settings for the demo binary
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfigFile {
    #[serde(default)]
    pub throttle: ThrottleConfig,

    #[serde(default)]
    pub debounce: DebounceConfig,

    /// Number of calls fired at each wrapper
    #[serde(default = "default_burst_calls")]
    pub burst_calls: u32,

    /// Gap between consecutive calls
    #[serde(default = "default_call_interval_ms")]
    pub call_interval_ms: u64,
}

fn default_burst_calls() -> u32 {
    20
}

fn default_call_interval_ms() -> u64 {
    25
}

impl Default for DemoConfigFile {
    fn default() -> Self {
        Self {
            throttle: ThrottleConfig::default(),
            debounce: DebounceConfig::default(),
            burst_calls: default_burst_calls(),
            call_interval_ms: default_call_interval_ms(),
        }
    }
}

pub fn load_demo_config<P: AsRef<Path>>(path: P) -> Result<DemoConfigFile, ConfigError> {
    let config = Config::builder().add_source(File::from(path.as_ref())).build()?;

    config.try_deserialize()
}

/// Load demo config with fallback to default
pub fn load_demo_config_or_default(path: &str) -> DemoConfigFile {
    match load_demo_config(path) {
        Ok(config) => {
            tracing::info!("Loaded demo config from {path}");
            config
        }
        Err(err) => {
            tracing::warn!("Failed to load demo config from {}: {}. Using defaults.", path, err);
            DemoConfigFile::default()
        }
    }
}
