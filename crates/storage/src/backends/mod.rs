//! Key-value store backends.
//!
//! - [`memory`] - Process-local map, useful for tests and ephemeral sessions
//! - [`file`] - JSON document on disk that survives process restarts

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
