//! Observable view state for user interfaces.
//!
//! Each controller owns one piece of state and publishes it through a
//! [`tokio::sync::watch`] channel. Consumers either take a snapshot or
//! `subscribe()` and await `changed()`.
//!
//! - [`ListController`] - the loaded records of one collection
//! - [`FilterController`] - search and exact-match filters over that list
//! - [`ActionController`] - create/update/delete with per-action loading flags

mod actions;
mod filter;
mod list;

pub use actions::{ActionController, ActionKind, ActionLoading, ActionOutcome};
pub use filter::{
    DEFAULT_DEBOUNCE, DEFAULT_SEARCH_FIELDS, FilterController, FilterState, apply_filters,
};
pub use list::{LOAD_ERROR_MESSAGE, ListController, ListState, StalePolicy};
