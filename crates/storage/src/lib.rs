//! Hospitex Storage
//!
//! Durable key-value storage and the session store built on top of it.
//!
//! The hospital client keeps exactly one piece of process-external state: the
//! authenticated session (bearer token plus cached user profile). This crate
//! owns that state behind an explicit interface so no other part of the
//! client touches the underlying storage directly.
//!
//! # Architecture
//!
//! - [`core`] - The [`KeyValueStore`](core::KeyValueStore) trait
//! - [`backends`] - In-memory and file-backed implementations
//! - [`session`] - [`SessionStore`](session::SessionStore) and [`UserRecord`](session::UserRecord)
//! - [`error`] - Error types for all storage operations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use hospitex_storage::backends::memory::MemoryStore;
//! use hospitex_storage::session::{SessionStore, UserRecord};
//!
//! let store = SessionStore::new(Arc::new(MemoryStore::new()));
//! assert!(!store.is_authenticated());
//!
//! let user = UserRecord::new(Some("7".to_string()), "Dr. Grey", "doctor", "mgrey");
//! store.set_session("token-abc", &user).unwrap();
//!
//! assert!(store.is_authenticated());
//! assert_eq!(store.user_role(), "doctor");
//!
//! store.clear_session().unwrap();
//! assert!(store.token().is_none());
//! ```

#![warn(missing_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod session;

pub use crate::core::KeyValueStore;
pub use error::{StorageError, StorageResult};
pub use session::{Session, SessionKeys, SessionStore, UserRecord};
