//! Queue record serialization configuration
//!
//! The format is chosen once for the whole process. `SERIALIZATION_FORMAT`
//! in the environment overrides the file.

use serde::Deserialize;

/// Environment variable that overrides `[serialization] format`
pub const SERIALIZATION_FORMAT_ENV: &str = "SERIALIZATION_FORMAT";

/// Record encoding for queue sinks
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub enum SerializationFormat {
    /// Plain JSON object per sample (default)
    #[default]
    #[serde(rename = "json")]
    Json,
    /// Avro JSON encoding validated against a schema file
    #[serde(rename = "avro-json")]
    AvroJson,
}

impl SerializationFormat {
    /// Parse the names accepted in config and the environment
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "json" => Some(Self::Json),
            "avro-json" => Some(Self::AvroJson),
            _ => None,
        }
    }

    /// Config name of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::AvroJson => "avro-json",
        }
    }
}

/// Serialization configuration
///
/// ```toml
/// [serialization]
/// format = "avro-json"
/// schema_path = "schemas/metric.avsc"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerializationConfig {
    /// Default: json
    pub format: SerializationFormat,

    /// Avro schema file, read only for `avro-json`
    /// Default: "schemas/metric.avsc"
    pub schema_path: String,
}

impl Default for SerializationConfig {
    fn default() -> Self {
        Self {
            format: SerializationFormat::Json,
            schema_path: "schemas/metric.avsc".into(),
        }
    }
}

impl SerializationConfig {
    /// Apply an override value, ignoring unknown names
    ///
    /// Returns `false` when `value` is not a known format.
    pub fn apply_override(&mut self, value: &str) -> bool {
        match SerializationFormat::parse(value) {
            Some(format) => {
                self.format = format;
                true
            }
            None => false,
        }
    }
}
