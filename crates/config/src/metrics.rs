//! Metrics reporting configuration
//!
//! Counters are always exposed on `GET /metrics`; this section only controls
//! the periodic summary written to the log.

use serde::Deserialize;
use std::time::Duration;

/// Format of the periodic log report
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricsFormat {
    /// One readable line per component (default)
    #[default]
    Human,
    /// Structured JSON fields
    Json,
}

/// Metrics configuration
///
/// ```toml
/// [metrics]
/// enabled = true
/// interval = "60s"
/// format = "human"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the periodic log report
    /// Default: true
    pub enabled: bool,

    /// Report interval
    /// Default: 60s
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Default: human
    pub format: MetricsFormat,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            format: MetricsFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.format, MetricsFormat::Human);
    }

    #[test]
    fn test_deserialize_disabled() {
        let config: MetricsConfig = toml::from_str("enabled = false").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.interval, Duration::from_secs(60));
    }

    #[test]
    fn test_deserialize_interval_variants() {
        for (s, expected) in [
            ("100ms", Duration::from_millis(100)),
            ("30s", Duration::from_secs(30)),
            ("5m", Duration::from_secs(300)),
        ] {
            let toml = format!("interval = \"{}\"", s);
            let config: MetricsConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config.interval, expected, "Failed for {}", s);
        }
    }

    #[test]
    fn test_format_json() {
        let config: MetricsConfig = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(config.format, MetricsFormat::Json);
    }
}
