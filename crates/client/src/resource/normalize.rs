//! Response-shape normalization for list payloads.
//!
//! The backend's list envelope differs between deployments and endpoints.
//! [`normalize_list`] accepts, in order of preference:
//!
//! 1. a bare array: `[{...}, {...}]`
//! 2. an object whose `data` field is an array: `{"data": [...]}`
//! 3. an object with any other array-valued field; the first one in document
//!    order wins: `{"count": 2, "staffs": [...]}`
//!
//! Anything else is [`ClientError::InvalidResponseShape`].

use serde_json::Value;

use super::record::ResourceRecord;
use crate::error::{ClientError, ClientResult};

/// Field preferred over every other array-valued field.
pub const DATA_FIELD: &str = "data";

/// Extracts the list of records from a payload of unknown shape.
///
/// # Errors
///
/// Returns [`ClientError::InvalidResponseShape`] if no array is found, or if
/// the array holds something other than objects.
pub fn normalize_list(payload: Value) -> ClientResult<Vec<ResourceRecord>> {
    extract_array(payload)?
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(ResourceRecord::from(map)),
            other => Err(ClientError::invalid_shape(format!(
                "list element {} is {}, expected an object",
                index,
                json_type_name(&other)
            ))),
        })
        .collect()
}

fn extract_array(payload: Value) -> ClientResult<Vec<Value>> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            let mut first = None;
            for (key, value) in map {
                if let Value::Array(items) = value {
                    if key == DATA_FIELD {
                        return Ok(items);
                    }
                    if first.is_none() {
                        first = Some(items);
                    }
                }
            }
            first.ok_or_else(|| ClientError::invalid_shape("object contains no array field"))
        }
        other => Err(ClientError::invalid_shape(format!(
            "expected an array or object, found {}",
            json_type_name(&other)
        ))),
    }
}

/// Reads a count from `field`, accepting a number or a numeric string.
pub fn extract_count(payload: &Value, field: &str) -> ClientResult<u64> {
    let value = payload
        .get(field)
        .ok_or_else(|| ClientError::invalid_shape(format!("missing count field '{}'", field)))?;

    let count = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    count.ok_or_else(|| {
        ClientError::invalid_shape(format!(
            "count field '{}' is {}, expected a non-negative integer",
            field,
            json_type_name(value)
        ))
    })
}

/// Short name of a JSON value's type, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
