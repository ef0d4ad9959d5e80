//! Login, signup and logout.
//!
//! A successful login is the only way a session is created: the token and
//! the user profile from the response are stored together through the
//! [`SessionStore`].

use hospitex_storage::session::{SessionStore, UserRecord, deserialize_id};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Staff name used as the login identifier.
    pub staff_name: &'a str,
    /// Plain-text password; sent only over the configured transport.
    pub password: &'a str,
}

/// Response of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    #[serde(default)]
    pub token: String,
    /// Role of the authenticated staff member.
    #[serde(default)]
    pub role: String,
    /// Staff identifier.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub staff_id: Option<String>,
    /// Display name; some backends omit it.
    #[serde(default)]
    pub staff_name: Option<String>,
}

/// Authentication endpoints plus the session they populate.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: HttpClient,
}

impl AuthClient {
    /// Creates an auth client. The session store is the one `http` attaches
    /// tokens from.
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn session(&self) -> &SessionStore {
        self.http.session()
    }

    /// Signs in and stores the resulting session.
    ///
    /// The stored display name falls back to `staff_name` when the backend
    /// does not return one.
    ///
    /// # Errors
    ///
    /// Whatever the HTTP call fails with, [`ClientError::InvalidResponseShape`]
    /// if the response carries no token, or [`ClientError::Storage`] if the
    /// session cannot be persisted.
    pub async fn login(&self, staff_name: &str, password: &str) -> ClientResult<LoginResponse> {
        info!(staff_name = %staff_name, "Starting login");

        let body = serde_json::to_value(LoginRequest {
            staff_name,
            password,
        })?;
        let value = self.http.post("/login", &body).await.inspect_err(|e| {
            error!(staff_name = %staff_name, error = %e, "Login failed");
        })?;

        let mut response: LoginResponse = serde_json::from_value(value)
            .map_err(|e| ClientError::invalid_shape(format!("unexpected login response: {}", e)))?;
        if response.token.trim().is_empty() {
            return Err(ClientError::invalid_shape("login response carries no token"));
        }

        let display_name = response
            .staff_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| staff_name.to_string());
        let user = UserRecord::new(
            response.staff_id.clone(),
            display_name.clone(),
            response.role.clone(),
            staff_name,
        );
        self.session().set_session(&response.token, &user)?;

        response.staff_name = Some(display_name);
        info!(role = %response.role, "Login succeeded");
        Ok(response)
    }

    /// Registers a new staff account. Does not sign in.
    pub async fn signup(&self, form: &Value) -> ClientResult<Value> {
        self.http.post("/signup", form).await.inspect_err(|e| {
            error!(error = %e, "Signup failed");
        })
    }

    /// Signs out by clearing the stored session.
    pub fn logout(&self) -> ClientResult<()> {
        info!("Logging out");
        self.session().clear_session()?;
        Ok(())
    }

    /// The cached profile of the signed-in user.
    pub fn current_user(&self) -> Option<UserRecord> {
        self.session().current_user()
    }

    /// Whether a complete, unexpired session is stored.
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    /// Role of the signed-in user, or `"guest"`.
    pub fn user_role(&self) -> String {
        self.session().user_role()
    }
}
