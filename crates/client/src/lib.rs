//! # hospitex-client - Hospital Management API Client
//!
//! This crate is the client layer of the Hospitex hospital-management system.
//! It talks to the Hospitex REST backend, keeps the signed-in session, and
//! exposes the view-state controllers the user interfaces are built on.
//!
//! ## Features
//!
//! - **Session-aware HTTP**: Bearer token attached from the session store, a
//!   single timeout, and one error taxonomy for every failure
//! - **Resource CRUD**: Staff, patients, medical records and vitals through one
//!   [`ResourceClient`], with list payloads normalized whatever the envelope
//! - **Vitals validation**: Incomplete vitals readings are rejected before any
//!   request is sent
//! - **Controllers**: List loading state, debounced search filtering, and
//!   create/update/delete outcomes as observable state
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hospitex_client::{AuthClient, ClientConfig, HttpClient, ResourceClient, ResourceKind};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::from_env();
//!     let http = HttpClient::new(&config, config.file_session_store())?;
//!
//!     AuthClient::new(http.clone()).login("mgrey", "s3cret").await?;
//!
//!     let staff = ResourceClient::new(http, ResourceKind::Staff);
//!     for member in staff.list().await? {
//!         println!("{:?}", member.get_str("name"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Backend Endpoints
//!
//! | Operation | HTTP Method | URL Pattern |
//! |-----------|-------------|-------------|
//! | login | POST | `/login` |
//! | signup | POST | `/signup` |
//! | list | GET | `/[collection]` |
//! | read | GET | `/[collection]/[id]` |
//! | create | POST | `/[collection]` |
//! | update | PUT | `/[collection]/[id]` |
//! | delete | DELETE | `/[collection]/[id]` |
//! | my patients | GET | `/patients/my-patients` |
//! | patient vitals | GET | `/vitals/patient/[id]` |
//! | totals | GET | `/patients/total`, `/medic-records/totalMedicalRecords` |
//!
//! ## Configuration
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HOSPITEX_API_BASE_URL` | `http://localhost:3001` | Backend base URL |
//! | `HOSPITEX_API_TIMEOUT_MS` | 10000 | Request timeout (milliseconds) |
//! | `HOSPITEX_TOKEN_STORAGE_KEY` | token | Session key for the token |
//! | `HOSPITEX_USER_STORAGE_KEY` | user | Session key for the user profile |
//! | `HOSPITEX_SESSION_TIMEOUT_MS` | 3600000 | Session lifetime, 0 disables expiry |
//! | `HOSPITEX_SESSION_FILE` | `.hospitex/session.json` | Persisted session file |
//! | `HOSPITEX_SEARCH_DEBOUNCE_MS` | 300 | Search debounce window |
//! | `HOSPITEX_LOG_LEVEL` | info | Log level (error, warn, info, debug, trace) |
//!
//! ## Architecture
//!
//! - [`config`] - Client configuration
//! - [`error`] - Error taxonomy
//! - [`http`] - Request executor
//! - [`resource`] - Resource records, normalization and CRUD
//! - [`auth`] - Login, signup and logout
//! - [`controllers`] - Observable list, filter and action state

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod auth;
pub mod config;
pub mod controllers;
pub mod error;
pub mod http;
pub mod resource;

// Re-export commonly used types
pub use auth::{AuthClient, LoginResponse};
pub use config::ClientConfig;
pub use controllers::{
    ActionController, ActionKind, ActionOutcome, FilterController, FilterState, ListController,
    ListState, StalePolicy,
};
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use resource::{RecordSource, ResourceClient, ResourceKind, ResourceRecord};

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG`, when set,
/// takes precedence over `level`.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hospitex={level},hospitex_client={level},hospitex_storage={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
