//! [`ListController`], which loads a collection and publishes its state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::watch;
use tracing::{debug, error};

use crate::resource::{RecordSource, ResourceRecord};

/// Message stored in [`ListState::error`] when a fetch fails.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load data. Please try again.";

/// Snapshot of a loaded collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    /// Records from the most recent applied fetch, in backend order.
    pub items: Vec<ResourceRecord>,
    /// `true` while at least one fetch is in flight.
    pub loading: bool,
    /// User-facing message from the most recent failed fetch.
    pub error: Option<String>,
}

/// What to do with a fetch that completes after a newer one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalePolicy {
    /// Every completion is applied; the last one to finish wins.
    #[default]
    LastCompleted,
    /// A completion is dropped if a fetch issued later has already been
    /// applied.
    DiscardSuperseded,
}

/// Loads a collection and tracks its loading and error state.
///
/// Overlapping fetches are not deduplicated. `loading` stays `true` until
/// every fetch in flight has settled.
pub struct ListController {
    source: Arc<dyn RecordSource>,
    state: watch::Sender<ListState>,
    policy: StalePolicy,
    in_flight: AtomicUsize,
    issued: AtomicU64,
    applied: AtomicU64,
}

impl ListController {
    /// Creates a controller with an empty list.
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        let (state, _) = watch::channel(ListState::default());
        Self {
            source,
            state,
            policy: StalePolicy::default(),
            in_flight: AtomicUsize::new(0),
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// Sets how late completions are handled.
    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the stale-completion policy.
    pub fn stale_policy(&self) -> StalePolicy {
        self.policy
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    /// Loads the list from the source.
    ///
    /// Failures are recorded in [`ListState::error`] and logged; this method
    /// never fails. Previously loaded items are kept on failure.
    pub async fn fetch(&self) {
        // Counters are only touched inside send_modify, which serializes them
        // with the state they describe.
        let mut seq = 0;
        self.state.send_modify(|state| {
            seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            state.loading = true;
            state.error = None;
        });
        debug!(source = %self.source.source_name(), seq, "Fetching list");

        let result = self.source.list().await;
        if let Err(e) = &result {
            error!(source = %self.source.source_name(), error = %e, "Failed to load list");
        }

        self.state.send_modify(|state| {
            let remaining = self.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            state.loading = remaining > 0;

            let applied = self.applied.load(Ordering::SeqCst);
            if self.policy == StalePolicy::DiscardSuperseded && seq < applied {
                debug!(seq, applied, "Discarding superseded list result");
                return;
            }
            self.applied.store(seq.max(applied), Ordering::SeqCst);

            match result {
                Ok(items) => state.items = items,
                Err(_) => state.error = Some(LOAD_ERROR_MESSAGE.to_string()),
            }
        });
    }
}

impl std::fmt::Debug for ListController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListController")
            .field("source", &self.source.source_name())
            .field("policy", &self.policy)
            .field("state", &*self.state.borrow())
            .finish()
    }
}
