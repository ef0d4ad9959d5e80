//! Client configuration.
//!
//! Base URL, timeouts and session storage keys in one struct. It can be built
//! from environment variables, command line arguments, or programmatically.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HOSPITEX_API_BASE_URL` | http://localhost:3001 | Backend base URL |
//! | `HOSPITEX_API_TIMEOUT_MS` | 10000 | Request timeout (milliseconds) |
//! | `HOSPITEX_TOKEN_STORAGE_KEY` | token | Storage key for the bearer token |
//! | `HOSPITEX_USER_STORAGE_KEY` | user | Storage key for the cached user |
//! | `HOSPITEX_SESSION_TIMEOUT_MS` | 3600000 | Session lifetime, 0 disables expiry |
//! | `HOSPITEX_SESSION_FILE` | .hospitex/session.json | Session file path |
//! | `HOSPITEX_SEARCH_DEBOUNCE_MS` | 300 | Search debounce window (milliseconds) |
//! | `HOSPITEX_LOG_LEVEL` | info | Log level |
//!
//! # Example
//!
//! ```rust
//! use hospitex_client::ClientConfig;
//!
//! let config = ClientConfig {
//!     api_base_url: "https://hms.example.org".to_string(),
//!     api_timeout_ms: 5_000,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use hospitex_storage::backends::file::FileStore;
use hospitex_storage::session::{SessionKeys, SessionStore};
use url::Url;

/// Configuration for the Hospitex client.
#[derive(Debug, Clone, Parser)]
#[command(name = "hospitex-client")]
#[command(about = "Hospital management REST client")]
pub struct ClientConfig {
    /// Base URL of the backend.
    #[arg(long, env = "HOSPITEX_API_BASE_URL", default_value = "http://localhost:3001")]
    pub api_base_url: String,

    /// Request timeout in milliseconds.
    #[arg(long, env = "HOSPITEX_API_TIMEOUT_MS", default_value = "10000")]
    pub api_timeout_ms: u64,

    /// Storage key for the bearer token.
    #[arg(long, env = "HOSPITEX_TOKEN_STORAGE_KEY", default_value = "token")]
    pub token_storage_key: String,

    /// Storage key for the cached user record.
    #[arg(long, env = "HOSPITEX_USER_STORAGE_KEY", default_value = "user")]
    pub user_storage_key: String,

    /// Session lifetime in milliseconds (0 disables expiry).
    #[arg(long, env = "HOSPITEX_SESSION_TIMEOUT_MS", default_value = "3600000")]
    pub session_timeout_ms: u64,

    /// Path of the file the session is persisted to.
    #[arg(long, env = "HOSPITEX_SESSION_FILE", default_value = ".hospitex/session.json")]
    pub session_file: PathBuf,

    /// Quiet window for debounced search input, in milliseconds.
    #[arg(long, env = "HOSPITEX_SEARCH_DEBOUNCE_MS", default_value = "300")]
    pub search_debounce_ms: u64,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "HOSPITEX_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001".to_string(),
            api_timeout_ms: 10_000,
            token_storage_key: "token".to_string(),
            user_storage_key: "user".to_string(),
            session_timeout_ms: 3_600_000, // 1 hour
            session_file: PathBuf::from(".hospitex/session.json"),
            search_debounce_ms: 300,
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self::try_parse_from(["hospitex-client"]).unwrap_or_default()
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }

    /// Session lifetime as a [`Duration`]. Zero means sessions never expire.
    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms)
    }

    /// Debounce window as a [`Duration`].
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Storage key names for the session entries.
    pub fn session_keys(&self) -> SessionKeys {
        SessionKeys::new(&self.token_storage_key, &self.user_storage_key)
    }

    /// Builds the file-backed session store this configuration describes.
    pub fn file_session_store(&self) -> SessionStore {
        SessionStore::new(Arc::new(FileStore::new(&self.session_file)))
            .with_keys(self.session_keys())
            .with_timeout(self.session_timeout())
    }

    /// Parses the base URL.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.api_base_url)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match self.base_url() {
            Ok(url) if url.cannot_be_a_base() => {
                errors.push(format!("API base URL '{}' cannot be a base", self.api_base_url));
            }
            Ok(url) if !matches!(url.scheme(), "http" | "https") => {
                errors.push(format!("API base URL scheme '{}' is not http(s)", url.scheme()));
            }
            Ok(_) => {}
            Err(e) => errors.push(format!("Invalid API base URL '{}': {}", self.api_base_url, e)),
        }

        if self.api_timeout_ms == 0 {
            errors.push("API timeout cannot be 0".to_string());
        }

        if self.token_storage_key.trim().is_empty() {
            errors.push("Token storage key cannot be empty".to_string());
        }

        if self.user_storage_key.trim().is_empty() {
            errors.push("User storage key cannot be empty".to_string());
        }

        if self.token_storage_key == self.user_storage_key {
            errors.push("Token and user storage keys must differ".to_string());
        }
        if self.user_storage_key == self.session_keys().started_at {
            errors.push(format!(
                "User storage key '{}' collides with the session start-time key",
                self.user_storage_key
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing against a local mock
    /// backend.
    pub fn for_testing(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            api_timeout_ms: 2_000, // Shorter timeout for tests
            session_timeout_ms: 0,
            session_file: PathBuf::from("session-test.json"),
            log_level: "debug".to_string(),
            ..Default::default()
        }
    }
}
