//! sroute Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! A file with only `[[routes]]` is enough; every other section is optional.
//!
//! # Parsing
//!
//! ```
//! use sroute_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(r#"
//! [[routes]]
//! name = "local"
//! [routes.upstream]
//! type = "remote_write"
//! urls = ["http://127.0.0.1:9090/api/v1/write"]
//! "#).unwrap();
//! assert_eq!(config.routes.len(), 1);
//! ```
//!
//! See `configs/sroute.toml` for all available options.

mod error;
mod global;
mod logging;
mod metrics;
mod routes;
mod serialization;
mod server;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use global::{DEFAULT_PREFIX, GlobalConfig};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use metrics::{MetricsConfig, MetricsFormat};
pub use routes::{
    ClusterConfig, KNOWN_BALANCERS, KafkaCompression, KafkaConfig, KafkaSaslConfig,
    KafkaSslConfig, RelabelAction, RelabelRuleConfig, RetryConfig, RouteConfig,
    SecurityProtocol, UpstreamConfig,
};
pub use serialization::{SERIALIZATION_FORMAT_ENV, SerializationConfig, SerializationFormat};
pub use server::{DEFAULT_LISTEN, DEFAULT_MAX_BODY_SIZE, ServerConfig};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metric prefix, shutdown window
    pub global: GlobalConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Periodic metrics report
    pub metrics: MetricsConfig,

    /// Front door HTTP server
    pub server: ServerConfig,

    /// Queue record encoding
    pub serialization: SerializationConfig,

    /// Named routes, in dispatch order
    pub routes: Vec<RouteConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Apply `SERIALIZATION_FORMAT` from the environment, if set
    ///
    /// Returns the rejected value when the variable holds an unknown format,
    /// so the caller can warn about it.
    pub fn apply_env_overrides(&mut self) -> Option<String> {
        let value = std::env::var(SERIALIZATION_FORMAT_ENV).ok()?;
        if self.serialization.apply_override(&value) {
            None
        } else {
            Some(value)
        }
    }

    /// Route names in configured order
    pub fn route_names(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.name.as_str()).collect()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.global.prefix, "sroute");
        assert_eq!(config.server.listen, DEFAULT_LISTEN);
        assert_eq!(config.serialization.format, SerializationFormat::Json);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[global]
prefix = "relay"
shutdown_timeout = "10s"

[log]
level = "debug"

[server]
listen = "127.0.0.1:9201"

[serialization]
format = "avro-json"
schema_path = "/etc/sroute/metric.avsc"

[[routes]]
name = "cluster-a"
[routes.upstream]
type = "remote_write"
urls = ["http://a:9090/api/v1/write", "http://b:9090/api/v1/write"]
dimension = 4
[[routes.relabel]]
source_labels = ["__name__"]
regex = "up|node_.*"
action = "keep"

[[routes]]
name = "to-kafka"
[routes.upstream]
type = "kafka"
brokers = "k1:9092"
topic = "metrics-{{ job }}"
"#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.global.prefix, "relay");
        assert_eq!(config.global.shutdown_timeout, Duration::from_secs(10));
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.serialization.format, SerializationFormat::AvroJson);
        assert_eq!(config.route_names(), vec!["cluster-a", "to-kafka"]);
        assert_eq!(config.routes[0].relabel.len(), 1);
        assert_eq!(config.routes[0].relabel[0].action, RelabelAction::Keep);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_str("[[routes]\nname=").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[global]\nprefix = \"from_file\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.global.prefix, "from_file");
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }
}
