//! Request executor behavior against a live mock backend.

mod common;

use std::time::Duration;

use common::harness::{MockBackend, MockResponse};
use hospitex_client::{ClientConfig, ClientError, HttpClient};
use hospitex_storage::{SessionStore, UserRecord};
use serde_json::{Value, json};

fn signed_in(token: &str) -> SessionStore {
    let session = SessionStore::in_memory();
    session
        .set_session(token, &UserRecord::new(Some("1".into()), "Meredith Grey", "doctor", "mgrey"))
        .unwrap();
    session
}

#[tokio::test]
async fn test_bearer_token_attached_when_signed_in() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/staffs", MockResponse::ok(json!([])));

    let http = backend.http(signed_in("tok-123"));
    http.get("/staffs").await.unwrap();

    let requests = backend.requests_to("GET", "/staffs");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer tok-123"));
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/staffs", MockResponse::ok(json!([])));

    backend.http(SessionStore::in_memory()).get("/staffs").await.unwrap();

    assert!(backend.requests()[0].authorization.is_none());
}

#[tokio::test]
async fn test_json_body_is_sent() {
    let backend = MockBackend::start().await;
    backend.on("PUT", "/patients/p-1", MockResponse::ok(json!({"id": "p-1"})));

    let body = json!({"ward": "icu"});
    let echoed = backend
        .http(SessionStore::in_memory())
        .put("/patients/p-1", &body)
        .await
        .unwrap();

    assert_eq!(echoed, json!({"id": "p-1"}));
    assert_eq!(backend.requests()[0].body, body);
}

#[tokio::test]
async fn test_non_2xx_is_http_error_with_body() {
    let backend = MockBackend::start().await;
    backend.on(
        "GET",
        "/staffs/99",
        MockResponse::json(404, json!({"message": "Staff not found"})),
    );

    let err = backend
        .http(SessionStore::in_memory())
        .get("/staffs/99")
        .await
        .unwrap_err();

    match err {
        ClientError::Http { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body["message"], "Staff not found");
        }
        other => panic!("expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_plain_text_error_body_is_kept() {
    let backend = MockBackend::start().await;
    backend.on("DELETE", "/staffs/1", MockResponse::text(500, "boom"));

    let err = backend
        .http(SessionStore::in_memory())
        .delete("/staffs/1")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, ClientError::Http { body: Value::String(ref s), .. } if s == "boom"));
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let backend = MockBackend::start().await;
    backend.on("DELETE", "/staffs/1", MockResponse::text(200, ""));

    let value = backend
        .http(SessionStore::in_memory())
        .delete("/staffs/1")
        .await
        .unwrap();
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let backend = MockBackend::start().await;
    backend.on(
        "GET",
        "/patients",
        MockResponse::json(401, json!({"message": "jwt expired"})),
    );

    let session = signed_in("stale");
    let err = backend.http(session.clone()).get("/patients").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(session.token().is_none());
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_unauthorized_without_token_leaves_session_alone() {
    let backend = MockBackend::start().await;
    backend.on("POST", "/login", MockResponse::json(401, json!({"message": "bad password"})));

    let session = SessionStore::in_memory();
    let err = backend
        .http(session.clone())
        .post("/login", &json!({}))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_forbidden_keeps_session() {
    let backend = MockBackend::start().await;
    backend.on("DELETE", "/staffs/2", MockResponse::json(403, json!({})));

    let session = signed_in("tok");
    let err = backend.http(session.clone()).delete("/staffs/2").await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert_eq!(session.token().as_deref(), Some("tok"));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let backend = MockBackend::start().await;
    backend.on(
        "GET",
        "/staffs",
        MockResponse::ok(json!([])).delayed(Duration::from_secs(2)),
    );

    let config = ClientConfig {
        api_timeout_ms: 100,
        ..backend.config()
    };
    let http = HttpClient::new(&config, SessionStore::in_memory()).unwrap();

    let err = http.get("/staffs").await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout { timeout_ms: 100 }));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let backend = MockBackend::start().await;
    let config = backend.config();
    drop(backend);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let http = HttpClient::new(&config, SessionStore::in_memory()).unwrap();
    let err = http.get("/staffs").await.unwrap_err();
    assert!(matches!(err, ClientError::Network { .. }), "got {:?}", err);
}
