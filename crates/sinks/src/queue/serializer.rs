//! Record serializers
//!
//! The format is a process-wide choice made once at startup and shared by
//! every queue sink, including those built on reload.

use std::path::Path;
use std::sync::Arc;

use sroute_config::{SerializationConfig, SerializationFormat};

use super::avro::AvroSchema;
use super::record::MetricRecord;
use crate::{Result, SinkError};

/// Encodes one record into a message payload
pub trait Serializer: Send + Sync {
    /// Format implemented by this serializer
    fn format(&self) -> SerializationFormat;

    /// Encode `record`
    fn serialize(&self, record: &MetricRecord) -> Result<Vec<u8>>;
}

/// Plain JSON object per record
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn format(&self) -> SerializationFormat {
        SerializationFormat::Json
    }

    fn serialize(&self, record: &MetricRecord) -> Result<Vec<u8>> {
        serde_json::to_vec(record).map_err(|e| SinkError::Serialize(e.to_string()))
    }
}

/// Avro JSON encoding validated against a schema
#[derive(Debug, Clone)]
pub struct AvroJsonSerializer {
    schema: AvroSchema,
}

impl AvroJsonSerializer {
    /// Use an already parsed schema
    pub fn new(schema: AvroSchema) -> Self {
        Self { schema }
    }

    /// Load the schema from an `.avsc` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SinkError::Serialize(format!("failed to read schema {}: {}", path.display(), e))
        })?;
        Ok(Self::new(AvroSchema::parse_str(&text)?))
    }

    /// Parsed schema
    pub fn schema(&self) -> &AvroSchema {
        &self.schema
    }
}

impl Serializer for AvroJsonSerializer {
    fn format(&self) -> SerializationFormat {
        SerializationFormat::AvroJson
    }

    fn serialize(&self, record: &MetricRecord) -> Result<Vec<u8>> {
        let value = serde_json::to_value(record).map_err(|e| SinkError::Serialize(e.to_string()))?;
        let encoded = self.schema.encode(&value)?;
        serde_json::to_vec(&encoded).map_err(|e| SinkError::Serialize(e.to_string()))
    }
}

/// Build the process-wide serializer
///
/// Only `avro-json` touches the filesystem, to read the schema.
pub fn from_config(config: &SerializationConfig) -> Result<Arc<dyn Serializer>> {
    let serializer: Arc<dyn Serializer> = match config.format {
        SerializationFormat::Json => Arc::new(JsonSerializer),
        SerializationFormat::AvroJson => Arc::new(AvroJsonSerializer::from_file(&config.schema_path)?),
    };
    Ok(serializer)
}
