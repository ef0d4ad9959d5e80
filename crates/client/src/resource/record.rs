//! [`ResourceRecord`], an opaque JSON object returned by the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ClientError, ClientResult};

/// One backend entity: a staff member, patient, medical record or vitals
/// reading.
///
/// The client does not impose a schema; a record is the JSON object the
/// backend sent, with a few typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRecord(Map<String, Value>);

impl ResourceRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the record for chaining.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Returns a field's raw value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns a field if it holds a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Sets a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns the record's identifier from `id` or `_id`, rendered as a
    /// string whether the backend sent a string or a number.
    pub fn id(&self) -> Option<String> {
        ["id", "_id"]
            .iter()
            .filter_map(|k| self.0.get(*k))
            .find_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts the record into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Interprets a single-record response body.
    ///
    /// An object becomes the record; an empty body becomes an empty record.
    pub fn from_response(value: Value) -> ClientResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(ClientError::invalid_shape(format!(
                "expected a record object, found {}",
                super::normalize::json_type_name(&other)
            ))),
        }
    }
}

impl From<Map<String, Value>> for ResourceRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for ResourceRecord {
    type Error = ClientError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ClientError::invalid_shape(format!(
                "expected a record object, found {}",
                super::normalize::json_type_name(&other)
            ))),
        }
    }
}
