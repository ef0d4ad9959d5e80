//! Mock backend test harness.
//!
//! Serves scripted responses on an ephemeral localhost port and records
//! every request it receives, so tests can assert on headers, bodies and
//! request counts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use hospitex_client::{ClientConfig, HttpClient, ResourceClient, ResourceKind};
use hospitex_storage::SessionStore;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A canned response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: StatusCode,
    body: String,
    content_type: &'static str,
    delay: Option<Duration>,
}

impl MockResponse {
    /// A JSON response.
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            content_type: "application/json",
            delay: None,
        }
    }

    /// A `200 OK` JSON response.
    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    /// A plain-text response.
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            content_type: "text/plain",
            delay: None,
        }
    }

    /// Delays the response.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(String, String), MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Scripted HTTP backend.
///
/// # Example
///
/// ```rust,ignore
/// let backend = MockBackend::start().await;
/// backend.on("GET", "/staffs", MockResponse::ok(json!([])));
///
/// let staff = backend.resource(ResourceKind::Staff, SessionStore::in_memory());
/// assert!(staff.list().await.unwrap().is_empty());
/// assert_eq!(backend.requests().len(), 1);
/// ```
pub struct MockBackend {
    /// Base URL of the running server, e.g. `http://127.0.0.1:40321`.
    pub base_url: String,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Starts a backend with no routes; every request gets a 404.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("No local address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock backend failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            server,
        }
    }

    /// Scripts the response for `method path`, replacing any earlier one.
    pub fn on(&self, method: &str, path: &str, response: MockResponse) {
        self.state
            .routes
            .lock()
            .insert((method.to_uppercase(), path.to_string()), response);
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Requests received for `method path`.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method.eq_ignore_ascii_case(method) && r.path == path)
            .collect()
    }

    /// A configuration pointing at this backend.
    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_testing(self.base_url.clone())
    }

    /// An HTTP client for this backend using `session`.
    pub fn http(&self, session: SessionStore) -> HttpClient {
        HttpClient::new(&self.config(), session).expect("Failed to build client")
    }

    /// A resource client for `kind` on this backend.
    pub fn resource(&self, kind: ResourceKind, session: SessionStore) -> ResourceClient {
        ResourceClient::new(self.http(session), kind)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    state.requests.lock().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        body,
    });

    let scripted = state
        .routes
        .lock()
        .get(&(method.to_string(), uri.path().to_string()))
        .cloned();
    let Some(response) = scripted else {
        return (
            StatusCode::NOT_FOUND,
            [(CONTENT_TYPE, "application/json")],
            json!({"message": "Not found"}).to_string(),
        )
            .into_response();
    };

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }
    (
        response.status,
        [(CONTENT_TYPE, response.content_type)],
        response.body,
    )
        .into_response()
}
