//! Client-side required-field checks.

use serde_json::Value;

use super::record::ResourceRecord;
use crate::error::{ClientError, ClientResult};

/// Returns every field in `required` that is absent, null, or a blank string,
/// in the order given.
pub fn missing_fields(record: &ResourceRecord, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|field| is_blank(record.get(field)))
        .map(|field| field.to_string())
        .collect()
}

/// Fails with [`ClientError::MissingFields`] listing every missing field.
pub fn require_fields(record: &ResourceRecord, required: &[&str]) -> ClientResult<()> {
    let fields = missing_fields(record, required);
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ClientError::MissingFields { fields })
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}
