//! Session persistence tests against the file backend.
//!
//! These cover the behaviour that only shows up with durable storage: a
//! session written by one process is visible to the next, and a damaged file
//! degrades to "signed out" instead of an error.

use std::fs;
use std::sync::Arc;

use hospitex_storage::backends::file::FileStore;
use hospitex_storage::session::{SessionKeys, SessionStore, UserRecord};

fn admin() -> UserRecord {
    UserRecord::new(Some("1".to_string()), "Admin", "admin", "admin")
}

fn open(path: &std::path::Path) -> SessionStore {
    SessionStore::new(Arc::new(FileStore::new(path)))
}

#[test]
fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    open(&path).set_session("persisted-token", &admin()).unwrap();

    let restarted = open(&path);
    assert!(restarted.is_authenticated());
    assert_eq!(restarted.token().as_deref(), Some("persisted-token"));
    assert_eq!(restarted.current_user(), Some(admin()));
}

#[test]
fn test_logout_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = open(&path);
    store.set_session("t", &admin()).unwrap();
    store.clear_session().unwrap();

    assert!(!open(&path).is_authenticated());
}

#[test]
fn test_corrupt_file_reads_as_signed_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, "\u{0}\u{0}garbage").unwrap();

    let store = open(&path);
    assert!(store.token().is_none());
    assert!(store.current_user().is_none());
    assert!(!store.is_authenticated());

    // A fresh login repairs the file.
    store.set_session("new", &admin()).unwrap();
    assert!(store.is_authenticated());
}

#[test]
fn test_malformed_user_entry_in_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, r#"{"token": "abc", "user": "not-json"}"#).unwrap();

    let store = open(&path);
    assert_eq!(store.token().as_deref(), Some("abc"));
    assert!(store.current_user().is_none());
    assert!(!store.is_authenticated());
}

#[test]
fn test_two_stores_with_different_keys_share_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let staff_portal = open(&path);
    let kiosk = open(&path).with_keys(SessionKeys::new("kiosk_token", "kiosk_user"));

    staff_portal.set_session("staff", &admin()).unwrap();
    assert!(!kiosk.is_authenticated());

    kiosk.set_session("kiosk", &admin()).unwrap();
    staff_portal.clear_session().unwrap();

    assert!(kiosk.is_authenticated());
    assert!(!staff_portal.is_authenticated());
}
