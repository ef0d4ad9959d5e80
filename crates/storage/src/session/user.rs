//! Cached profile of the authenticated staff member.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The signed-in user's profile, as cached alongside the token.
///
/// Persisted with the field names the backend and earlier client versions
/// use: `{ "id", "name", "role", "staff_name" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Staff identifier. The backend sends it as a string or a number.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,

    /// Name shown in the interface.
    #[serde(rename = "name")]
    pub display_name: String,

    /// Role such as `admin`, `doctor` or `nurse`.
    #[serde(default)]
    pub role: String,

    /// The staff name exactly as typed at login.
    #[serde(rename = "staff_name", default)]
    pub raw_staff_name: String,
}

impl UserRecord {
    /// Creates a user record.
    pub fn new(
        id: Option<String>,
        display_name: impl Into<String>,
        role: impl Into<String>,
        raw_staff_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role: role.into(),
            raw_staff_name: raw_staff_name.into(),
        }
    }
}

/// Deserializes an identifier that may arrive as a JSON string or number.
///
/// `null` and a missing field both yield `None`; empty strings are treated
/// as missing.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, found {}",
            other
        ))),
    }
}
