//! Error types for the client layer.
//!
//! # Taxonomy
//!
//! | Error | Raised when |
//! |-------|-------------|
//! | Network | No response was received |
//! | Timeout | The request exceeded the configured deadline |
//! | Http | The backend answered with a non-2xx status |
//! | InvalidResponseShape | A list payload had no recognizable record array |
//! | MissingFields | Client-side validation rejected a payload before sending |
//! | Storage | The session store could not be written |
//! | Unsupported | The resource has no such endpoint |
//! | InvalidPathSegment | A record id cannot be used as a single URL path segment |
//!
//! Corrupt persisted session data never reaches this type: the session store
//! recovers from it by treating the session as absent.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use hospitex_storage::StorageError;
use serde_json::Value;
use thiserror::Error;

/// The primary error type for client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was received (connection refused, DNS failure, reset).
    #[error("network error: {message}")]
    Network { message: String },

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: Value },

    /// A list payload contained no recognizable array of records.
    #[error("invalid response shape: {message}")]
    InvalidResponseShape { message: String },

    /// Required fields were absent or empty; nothing was sent.
    #[error("missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// The session store could not be updated.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A request or response body could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation does not exist for this resource.
    #[error("{operation} is not available for {resource}")]
    Unsupported { operation: String, resource: String },

    /// The client configuration is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An id was empty or a dot segment; nothing was sent.
    #[error("invalid path segment: '{segment}'")]
    InvalidPathSegment { segment: String },
}

impl ClientError {
    /// Builds an [`ClientError::InvalidResponseShape`].
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        ClientError::InvalidResponseShape {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for [`ClientError::Http`].
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for a 401 response.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Returns a short message suitable for showing to an end user.
    ///
    /// The full error (with status codes and backend bodies) belongs in logs.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network { .. } => {
                "Unable to reach the server. Check your connection.".to_string()
            }
            ClientError::Timeout { .. } => "The server took too long to respond.".to_string(),
            ClientError::Http { status: 401, .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ClientError::Http { status: 403, .. } => {
                "You do not have permission to do that.".to_string()
            }
            ClientError::Http { status: 404, .. } => "The requested item was not found.".to_string(),
            ClientError::Http { status, .. } if *status >= 500 => {
                "The server encountered an error.".to_string()
            }
            ClientError::Http { body, .. } => backend_message(body)
                .unwrap_or_else(|| "The request was rejected by the server.".to_string()),
            ClientError::InvalidResponseShape { .. } => {
                "Invalid data format from server.".to_string()
            }
            ClientError::MissingFields { fields } => {
                format!("Missing required fields: {}", fields.join(", "))
            }
            ClientError::Storage(_) => "Unable to save your session.".to_string(),
            ClientError::Serialization(_) => "Server returned invalid data.".to_string(),
            ClientError::Unsupported { .. } => "That action is not available here.".to_string(),
            ClientError::InvalidConfig { .. } => "The client is misconfigured.".to_string(),
            ClientError::InvalidPathSegment { .. } => "That identifier is not valid.".to_string(),
        }
    }
}

/// Pulls a human-readable `message`/`error` string out of a backend error body.
fn backend_message(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => ["message", "error"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ClientError::InvalidResponseShape {
                message: err.to_string(),
            };
        }
        ClientError::Network {
            message: err.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
