//! Global configuration settings

use serde::Deserialize;
use std::time::Duration;

/// Default metric name prefix
pub const DEFAULT_PREFIX: &str = "sroute";

/// Settings that apply across all components
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Prefix for every exported metric name
    /// Default: "sroute"
    pub prefix: String,

    /// How long shutdown waits for in-flight dispatches
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.into(),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}
