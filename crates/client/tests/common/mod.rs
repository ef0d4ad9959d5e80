//! Common test utilities for client integration testing.
//!
//! - [`harness`] - Mock backend served over a real socket
//! - [`fixtures`] - Backend payloads used across tests

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;
