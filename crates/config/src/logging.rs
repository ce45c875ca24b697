//! Logging configuration
//!
//! Controls how the relay writes its own log lines.

use serde::Deserialize;

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Very verbose, per-request detail
    Trace,
    /// Per-batch detail
    Debug,
    /// Normal operation (default)
    #[default]
    Info,
    /// Warnings only
    Warn,
    /// Errors only
    Error,
}

impl LogLevel {
    /// Directive string for `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output (default)
    #[default]
    Console,
    /// One JSON object per line
    Json,
}

/// Log destination
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output (default)
    #[default]
    Stdout,
    /// Standard error
    Stderr,
}

/// Logging configuration
///
/// ```toml
/// [log]
/// level = "info"
/// format = "console"
/// output = "stdout"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default: info
    pub level: LogLevel,
    /// Default: console
    pub format: LogFormat,
    /// Default: stdout
    pub output: LogOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Console);
        assert_eq!(config.output, LogOutput::Stdout);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
level = "debug"
format = "json"
output = "stderr"
"#;
        let config: LogConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stderr);
    }

    #[test]
    fn test_level_round_trips_through_as_str() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            let toml = format!("level = \"{}\"", level.as_str());
            let config: LogConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config.level, level);
        }
    }

    #[test]
    fn test_unknown_output_rejected() {
        assert!(toml::from_str::<LogConfig>("output = \"/var/log/x\"").is_err());
    }
}
