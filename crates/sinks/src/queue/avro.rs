//! Avro JSON encoding
//!
//! Schemas are parsed and records resolved by `apache-avro`, which covers the
//! whole type system including named references and logical types. The
//! resolved value is then written out in the Avro JSON encoding: a non-null
//! union branch is wrapped as `{"<type name>": value}` and bytes become a
//! string of code points 0-255.

use std::collections::HashMap;

use apache_avro::Schema;
use apache_avro::schema::ResolvedSchema;
use apache_avro::types::Value as AvroValue;
use serde_json::{Map, Number, Value};

use crate::{Result, SinkError};

/// Parsed Avro schema with its named types
#[derive(Debug, Clone)]
pub struct AvroSchema {
    schema: Schema,
    names: HashMap<String, Schema>,
}

impl AvroSchema {
    /// Parse a `.avsc` document
    pub fn parse_str(text: &str) -> Result<Self> {
        let schema = Schema::parse_str(text).map_err(schema_error)?;
        let names = ResolvedSchema::try_from(&schema)
            .map_err(schema_error)?
            .get_names()
            .iter()
            .map(|(name, named)| (name.fullname(None), (*named).clone()))
            .collect();
        Ok(Self { schema, names })
    }

    /// Underlying schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Full name of a named top-level schema
    pub fn name(&self) -> Option<String> {
        self.schema.name().map(|name| name.fullname(None))
    }

    /// Validate `value` and return its Avro JSON encoding
    ///
    /// Missing record fields take their schema default.
    pub fn encode(&self, value: &Value) -> Result<Value> {
        let resolved = AvroValue::from(value.clone())
            .resolve(&self.schema)
            .map_err(|e| SinkError::Serialize(format!("record does not match schema: {}", e)))?;
        self.to_json(&self.schema, resolved)
    }

    fn to_json(&self, schema: &Schema, value: AvroValue) -> Result<Value> {
        let schema = self.deref(schema)?;
        match (schema, value) {
            (_, AvroValue::Union(_, inner)) if matches!(*inner, AvroValue::Null) => Ok(Value::Null),
            (Schema::Union(union), AvroValue::Union(index, inner)) => {
                let branch = union
                    .variants()
                    .get(index as usize)
                    .ok_or_else(|| encode_error(format!("union branch {} out of range", index)))?;
                let mut wrapped = Map::new();
                wrapped.insert(self.branch_name(branch), self.to_json(branch, *inner)?);
                Ok(Value::Object(wrapped))
            }
            (Schema::Record(record), AvroValue::Record(fields)) => {
                let mut out = Map::new();
                for (field, (name, value)) in record.fields.iter().zip(fields) {
                    out.insert(name, self.to_json(&field.schema, value)?);
                }
                Ok(Value::Object(out))
            }
            (Schema::Array(array), AvroValue::Array(items)) => items
                .into_iter()
                .map(|item| self.to_json(&array.items, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            (Schema::Map(map), AvroValue::Map(entries)) => {
                let mut out = Map::new();
                for (key, value) in entries {
                    let encoded = self.to_json(&map.types, value)?;
                    out.insert(key, encoded);
                }
                Ok(Value::Object(out))
            }
            (_, AvroValue::Enum(_, symbol)) => Ok(Value::String(symbol)),
            (_, AvroValue::Bytes(bytes) | AvroValue::Fixed(_, bytes)) => {
                Ok(Value::String(bytes.iter().map(|&b| char::from(b)).collect()))
            }
            (_, AvroValue::Float(f)) => finite(f64::from(f)),
            (_, AvroValue::Double(f)) => finite(f),
            (_, other) => Value::try_from(other).map_err(|e| encode_error(e.to_string())),
        }
    }

    /// Follow a reference to its named definition
    fn deref<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema> {
        match schema {
            Schema::Ref { name } => {
                let full = name.fullname(None);
                self.names
                    .get(&full)
                    .ok_or_else(|| encode_error(format!("unknown named type {}", full)))
            }
            other => Ok(other),
        }
    }

    /// Tag for a union branch: full name for named types, type name otherwise
    fn branch_name(&self, schema: &Schema) -> String {
        if let Schema::Ref { name } = schema {
            return name.fullname(None);
        }
        if let Some(name) = schema.name() {
            return name.fullname(None);
        }
        let kind = match schema {
            Schema::Null => "null",
            Schema::Boolean => "boolean",
            Schema::Int | Schema::Date | Schema::TimeMillis => "int",
            Schema::Long | Schema::TimeMicros | Schema::TimestampMillis | Schema::TimestampMicros => {
                "long"
            }
            Schema::Float => "float",
            Schema::Double => "double",
            Schema::String | Schema::Uuid => "string",
            Schema::Array(_) => "array",
            Schema::Map(_) => "map",
            _ => "bytes",
        };
        kind.to_string()
    }
}

fn finite(f: f64) -> Result<Value> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| encode_error(format!("{} has no JSON encoding", f)))
}

fn schema_error(error: apache_avro::Error) -> SinkError {
    SinkError::Serialize(format!("invalid avro schema: {}", error))
}

fn encode_error(message: impl Into<String>) -> SinkError {
    SinkError::Serialize(format!("avro json encoding failed: {}", message.into()))
}

#[cfg(test)]
#[path = "avro_test.rs"]
mod tests;
