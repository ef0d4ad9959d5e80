//! Session store.
//!
//! [`SessionStore`] owns the authentication token and the cached
//! [`UserRecord`]. Both are written and removed together, so after any
//! completed operation either the whole session is present or none of it is.
//!
//! Reads are fail-soft: corrupt or unreadable persisted data is logged and
//! reported as absent, never as an error.

mod user;

pub use user::{UserRecord, deserialize_id};

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::backends::memory::MemoryStore;
use crate::core::KeyValueStore;
use crate::error::{StorageError, StorageResult};

/// Role reported when nobody is signed in.
pub const GUEST_ROLE: &str = "guest";

/// Storage key names used for the session entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    /// Key holding the bearer token.
    pub token: String,
    /// Key holding the serialized [`UserRecord`].
    pub user: String,
    /// Key holding the RFC 3339 time the session was created.
    pub started_at: String,
}

impl SessionKeys {
    /// Builds key names from the token and user key. The start-time key is
    /// derived from the token key.
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Self {
        let token = token.into();
        let started_at = format!("{}_started_at", token);
        Self {
            token,
            user: user.into(),
            started_at,
        }
    }
}

impl Default for SessionKeys {
    fn default() -> Self {
        Self::new("token", "user")
    }
}

/// Snapshot of the persisted session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// The bearer token, if any.
    pub token: Option<String>,
    /// The cached user profile, if any.
    pub user: Option<UserRecord>,
}

impl Session {
    /// Returns `true` when both token and user are present.
    pub fn is_complete(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

/// Persistent store for the authenticated session.
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
    keys: SessionKeys,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("backend", &self.backend.backend_name())
            .field("keys", &self.keys)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SessionStore {
    /// Creates a session store over `backend` with default key names and no
    /// expiry.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            keys: SessionKeys::default(),
            timeout: None,
        }
    }

    /// Creates a session store backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Uses the given storage key names.
    pub fn with_keys(mut self, keys: SessionKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Expires sessions older than `timeout`. A zero duration disables expiry.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Returns the storage key names in use.
    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    /// Persists a new session, replacing any previous one.
    pub fn set_session(&self, token: &str, user: &UserRecord) -> StorageResult<()> {
        let user_json = serde_json::to_string(user)?;
        let started_at = Utc::now().to_rfc3339();

        self.backend.set_many(&[
            (self.keys.token.as_str(), token.to_string()),
            (self.keys.user.as_str(), user_json),
            (self.keys.started_at.as_str(), started_at),
        ])?;

        info!(role = %user.role, name = %user.display_name, "Session stored");
        Ok(())
    }

    /// Returns the stored token. Empty tokens are treated as absent.
    pub fn token(&self) -> Option<String> {
        self.read_key(&self.keys.token)
            .filter(|token| !token.trim().is_empty())
    }

    /// Returns the cached user, or `None` if absent or unparseable.
    pub fn current_user(&self) -> Option<UserRecord> {
        match self.read_user() {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable user record");
                None
            }
        }
    }

    /// Reads the cached user, reporting corrupt data as [`StorageError::Parse`].
    pub fn read_user(&self) -> StorageResult<Option<UserRecord>> {
        let Some(raw) = self.backend.get(&self.keys.user)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::parse(&self.keys.user, e))
    }

    /// Returns a snapshot of the token and user.
    pub fn session(&self) -> Session {
        Session {
            token: self.token(),
            user: self.current_user(),
        }
    }

    /// Returns `true` iff a token and a user are both stored and the session
    /// has not expired. An expired session is cleared as a side effect.
    pub fn is_authenticated(&self) -> bool {
        if self.is_expired() {
            info!("Session expired, clearing");
            if let Err(e) = self.clear_session() {
                warn!(error = %e, "Failed to clear expired session");
            }
            return false;
        }

        let session = self.session();
        debug!(
            has_token = session.token.is_some(),
            has_user = session.user.is_some(),
            "Auth check"
        );
        session.is_complete()
    }

    /// Returns the current user's role, or `"guest"` when signed out.
    pub fn user_role(&self) -> String {
        self.current_user()
            .map(|user| user.role)
            .filter(|role| !role.is_empty())
            .unwrap_or_else(|| GUEST_ROLE.to_string())
    }

    /// Returns when the current session was created, if recorded.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.read_key(&self.keys.started_at)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable session start time");
                None
            }
        }
    }

    /// Returns `true` if a timeout is configured and the session outlived it.
    pub fn is_expired(&self) -> bool {
        let (Some(timeout), Some(started_at)) = (self.timeout, self.started_at()) else {
            return false;
        };
        let age = Utc::now().signed_duration_since(started_at);
        age.to_std().is_ok_and(|age| age > timeout)
    }

    /// Removes every session key. Calling it with no session stored is a no-op.
    pub fn clear_session(&self) -> StorageResult<()> {
        self.backend.remove_many(&[
            self.keys.token.as_str(),
            self.keys.user.as_str(),
            self.keys.started_at.as_str(),
        ])?;
        debug!("Session cleared");
        Ok(())
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Session storage unreadable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor() -> UserRecord {
        UserRecord::new(Some("3".to_string()), "Dr. Shepherd", "doctor", "dshepherd")
    }

    #[test]
    fn test_empty_store_is_not_authenticated() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
        assert!(store.current_user().is_none());
        assert_eq!(store.user_role(), GUEST_ROLE);
    }

    #[test]
    fn test_set_session_stores_token_and_user() {
        let store = SessionStore::in_memory();
        store.set_session("abc", &doctor()).unwrap();

        assert_eq!(store.token().as_deref(), Some("abc"));
        assert_eq!(store.current_user(), Some(doctor()));
        assert!(store.is_authenticated());
        assert_eq!(store.user_role(), "doctor");
        assert!(store.started_at().is_some());
    }

    #[test]
    fn test_set_session_overwrites() {
        let store = SessionStore::in_memory();
        store.set_session("first", &doctor()).unwrap();

        let nurse = UserRecord::new(None, "Nurse Joy", "nurse", "joy");
        store.set_session("second", &nurse).unwrap();

        assert_eq!(store.token().as_deref(), Some("second"));
        assert_eq!(store.current_user(), Some(nurse));
    }

    #[test]
    fn test_clear_session_is_idempotent() {
        let store = SessionStore::in_memory();
        store.set_session("abc", &doctor()).unwrap();

        store.clear_session().unwrap();
        store.clear_session().unwrap();

        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_authenticated_tracks_last_operation() {
        let store = SessionStore::in_memory();
        store.set_session("a", &doctor()).unwrap();
        store.clear_session().unwrap();
        store.set_session("b", &doctor()).unwrap();
        assert!(store.is_authenticated());
        store.clear_session().unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_malformed_user_is_absent() {
        let store = SessionStore::in_memory();
        store.set_session("abc", &doctor()).unwrap();
        store
            .backend()
            .set("user", "{\"name\": \"broken".to_string())
            .unwrap();

        assert!(store.current_user().is_none());
        assert!(store.read_user().unwrap_err().is_parse());
        assert!(!store.is_authenticated());
        assert_eq!(store.user_role(), GUEST_ROLE);
    }

    #[test]
    fn test_token_without_user_is_not_authenticated() {
        let store = SessionStore::in_memory();
        store.backend().set("token", "orphan".to_string()).unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_blank_token_is_absent() {
        let store = SessionStore::in_memory();
        store.set_session("  ", &doctor()).unwrap();
        assert!(store.token().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_custom_keys() {
        let store = SessionStore::in_memory().with_keys(SessionKeys::new("hms_token", "hms_user"));
        store.set_session("abc", &doctor()).unwrap();

        assert_eq!(store.backend().get("hms_token").unwrap().as_deref(), Some("abc"));
        assert!(store.backend().get("hms_user").unwrap().is_some());
        assert!(store.backend().get("hms_token_started_at").unwrap().is_some());
        assert!(store.backend().get("token").unwrap().is_none());
    }

    #[test]
    fn test_expired_session_is_cleared() {
        let store = SessionStore::in_memory().with_timeout(Duration::from_secs(60));
        store.set_session("abc", &doctor()).unwrap();
        assert!(store.is_authenticated());

        let old = (Utc::now() - chrono::Duration::minutes(5)).to_rfc3339();
        store.backend().set("token_started_at", old).unwrap();

        assert!(store.is_expired());
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_zero_timeout_never_expires() {
        let store = SessionStore::in_memory().with_timeout(Duration::ZERO);
        store.set_session("abc", &doctor()).unwrap();
        let old = (Utc::now() - chrono::Duration::days(30)).to_rfc3339();
        store.backend().set("token_started_at", old).unwrap();

        assert!(!store.is_expired());
        assert!(store.is_authenticated());
    }
}
