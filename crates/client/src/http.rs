//! Generic request executor.
//!
//! [`HttpClient`] is the only component that talks to the network. It joins
//! paths onto the configured base URL, attaches the bearer token from the
//! [`SessionStore`], enforces the request timeout, and maps every failure to
//! a [`ClientError`]. It never retries.

use std::time::Duration;

use hospitex_storage::SessionStore;
pub use reqwest::Method;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

const JSON: &str = "application/json";

/// HTTP client bound to one backend and one session.
///
/// Cloning is cheap: clones share the connection pool and session store.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: Url,
    session: SessionStore,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a client for the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if the base URL does not parse or
    /// the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: SessionStore) -> ClientResult<Self> {
        let base_url = normalize_base(&config.api_base_url)?;
        let timeout = config.timeout();

        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::InvalidConfig {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            inner,
            base_url,
            session,
            timeout,
        })
    }

    /// Returns the session store whose token is attached to requests.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Returns the base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves a fixed backend path such as `/patients/total` against the base URL.
    pub fn url_for(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidConfig {
                message: format!("cannot build URL for '{}': {}", path, e),
            })
    }

    /// Appends `segments` to the base URL, each as a single percent-encoded
    /// path segment.
    ///
    /// Unlike [`url_for`](Self::url_for), a `/`, `?` or `#` inside a segment
    /// stays part of that segment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidPathSegment`] for an empty, `.` or `..`
    /// segment.
    pub fn url_for_segments(&self, segments: &[&str]) -> ClientResult<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ClientError::InvalidPathSegment {
                segment: bad.to_string(),
            });
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidConfig {
                message: format!("API base URL '{}' cannot be a base", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and returns the decoded JSON body.
    ///
    /// An empty 2xx body decodes as [`Value::Null`]; a non-JSON body is
    /// returned as [`Value::String`].
    ///
    /// # Errors
    ///
    /// * [`ClientError::Timeout`] - the request exceeded the timeout
    /// * [`ClientError::Network`] - no response was received
    /// * [`ClientError::Http`] - the backend returned a non-2xx status. A 401
    ///   on a request that carried a token also clears the session.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ClientResult<Value> {
        let url = self.url_for(path)?;
        self.send(method, url, body).await
    }

    /// Sends a request to an already resolved URL, such as one built by
    /// [`url_for_segments`](Self::url_for_segments).
    ///
    /// Behaves exactly like [`request`](Self::request) otherwise.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> ClientResult<Value> {
        let token = self.session.token();

        let mut builder = self
            .inner
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON);
        if let Some(token) = &token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(
            method = %method,
            url = %url,
            authenticated = token.is_some(),
            "Sending request"
        );

        let response = builder
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        debug!(method = %method, url = %url, status = status.as_u16(), "Response received");

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED && token.is_some() {
                warn!(url = %url, "Token rejected by backend, clearing session");
                if let Err(e) = self.session.clear_session() {
                    warn!(error = %e, "Failed to clear rejected session");
                }
            }
            return Err(ClientError::Http {
                status: status.as_u16(),
                body: decode_body(&bytes),
            });
        }

        Ok(decode_body(&bytes))
    }

    /// Sends a `GET` request.
    pub async fn get(&self, path: &str) -> ClientResult<Value> {
        self.request(Method::GET, path, None).await
    }

    /// Sends a `POST` request with a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> ClientResult<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Sends a `PUT` request with a JSON body.
    pub async fn put(&self, path: &str, body: &Value) -> ClientResult<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Sends a `DELETE` request.
    pub async fn delete(&self, path: &str) -> ClientResult<Value> {
        self.request(Method::DELETE, path, None).await
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ClientError::from(err)
        }
    }
}

/// Parses the base URL and makes sure relative joins append to its path.
fn normalize_base(raw: &str) -> ClientResult<Url> {
    let mut url = Url::parse(raw).map_err(|e| ClientError::InvalidConfig {
        message: format!("invalid API base URL '{}': {}", raw, e),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidConfig {
            message: format!("API base URL '{}' cannot be a base", raw),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str) -> HttpClient {
        let config = ClientConfig::for_testing(base);
        HttpClient::new(&config, SessionStore::in_memory()).unwrap()
    }

    #[test]
    fn test_url_for_plain_host() {
        let client = client("http://localhost:3001");
        assert_eq!(
            client.url_for("/staffs/7").unwrap().as_str(),
            "http://localhost:3001/staffs/7"
        );
    }

    #[test]
    fn test_url_for_keeps_base_path() {
        let client = client("https://hms.example.org/api/v1");
        assert_eq!(
            client.url_for("/medic-records").unwrap().as_str(),
            "https://hms.example.org/api/v1/medic-records"
        );
        assert_eq!(
            client.url_for("vitals/patient/4").unwrap().as_str(),
            "https://hms.example.org/api/v1/vitals/patient/4"
        );
    }

    #[test]
    fn test_url_for_segments_encodes_each_segment() {
        let client = client("https://hms.example.org/api/v1");
        assert_eq!(
            client.url_for_segments(&["staffs", "../patients/1"]).unwrap().as_str(),
            "https://hms.example.org/api/v1/staffs/..%2Fpatients%2F1"
        );
        assert_eq!(
            client.url_for_segments(&["staffs", "7?admin=true#x"]).unwrap().as_str(),
            "https://hms.example.org/api/v1/staffs/7%3Fadmin=true%23x"
        );
        assert_eq!(
            client.url_for_segments(&["vitals", "patient", "p-1"]).unwrap().as_str(),
            "https://hms.example.org/api/v1/vitals/patient/p-1"
        );
    }

    #[test]
    fn test_url_for_segments_rejects_dot_segments() {
        let client = client("http://localhost:3001");
        for bad in ["", ".", ".."] {
            let err = client.url_for_segments(&["staffs", bad]).unwrap_err();
            assert!(
                matches!(&err, ClientError::InvalidPathSegment { segment } if segment == bad),
                "{:?} gave {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig::for_testing("mailto:someone@example.org");
        let err = HttpClient::new(&config, SessionStore::in_memory()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig { .. }));
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"  \n"), Value::Null);
        assert_eq!(decode_body(br#"{"ok":true}"#), json!({"ok": true}));
        assert_eq!(decode_body(b"Deleted"), json!("Deleted"));
    }
}
