//! [`FilterController`] and the pure [`apply_filters`] function.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

use super::list::ListState;
use crate::resource::ResourceRecord;

/// Default search debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Fields matched by the free-text search unless configured otherwise.
pub const DEFAULT_SEARCH_FIELDS: [&str; 2] = ["name", "email"];

/// Active filters. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Case-insensitive substring matched against the search fields.
    pub search: String,
    /// Exact role.
    pub role: String,
    /// Exact department.
    pub department: String,
    /// Exact status.
    pub status: String,
}

impl FilterState {
    /// Returns `true` when no filter is set.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.role.is_empty()
            && self.department.is_empty()
            && self.status.is_empty()
    }

    /// Returns `true` if `record` passes every non-empty filter.
    pub fn matches(&self, record: &ResourceRecord, search_fields: &[&str]) -> bool {
        matches_search(record, &self.search, search_fields)
            && matches_exact(record, "role", &self.role)
            && matches_exact(record, "department", &self.department)
            && matches_exact(record, "status", &self.status)
    }
}

fn matches_search(record: &ResourceRecord, search: &str, fields: &[&str]) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    fields.iter().any(|field| {
        record
            .get_str(field)
            .is_some_and(|value| value.to_lowercase().contains(&needle))
    })
}

fn matches_exact(record: &ResourceRecord, field: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return true;
    }
    match record.get(field) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == expected,
        Some(Value::Bool(b)) => b.to_string() == expected,
        _ => false,
    }
}

/// Returns the records that pass `filters`, in their original order.
pub fn apply_filters(
    items: &[ResourceRecord],
    filters: &FilterState,
    search_fields: &[&str],
) -> Vec<ResourceRecord> {
    items
        .iter()
        .filter(|record| filters.matches(record, search_fields))
        .cloned()
        .collect()
}

/// Derives a filtered view of a [`ListController`](super::ListController)'s
/// items.
///
/// Role, department and status filters apply immediately. Search text is
/// debounced: only the last value of a burst of [`update_search`] calls is
/// applied, once the debounce window has passed without another call.
///
/// [`update_search`]: FilterController::update_search
pub struct FilterController {
    source: watch::Receiver<ListState>,
    filters: Arc<watch::Sender<FilterState>>,
    search_fields: Vec<String>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl FilterController {
    /// Creates a controller over `source` with the default debounce window.
    pub fn new(source: watch::Receiver<ListState>) -> Self {
        let (filters, _) = watch::channel(FilterState::default());
        Self {
            source,
            filters: Arc::new(filters),
            search_fields: DEFAULT_SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
            debounce: DEFAULT_DEBOUNCE,
            pending: Mutex::new(None),
        }
    }

    /// Sets the debounce window for [`update_search`](Self::update_search).
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the fields the search text is matched against.
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the current filters.
    pub fn filters(&self) -> FilterState {
        self.filters.borrow().clone()
    }

    /// Returns a receiver that observes every filter change.
    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.filters.subscribe()
    }

    /// The source list's items that pass the current filters.
    pub fn filtered_list(&self) -> Vec<ResourceRecord> {
        let fields: Vec<&str> = self.search_fields.iter().map(String::as_str).collect();
        let filters = self.filters.borrow();
        apply_filters(&self.source.borrow().items, &filters, &fields)
    }

    /// Schedules `text` to become the search filter after the debounce window.
    ///
    /// A call made before the window elapses replaces the pending one.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn update_search(&self, text: impl Into<String>) {
        let text = text.into();
        let filters = Arc::clone(&self.filters);
        let debounce = self.debounce;

        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            trace!(search = %text, "Applying debounced search");
            filters.send_if_modified(|state| {
                if state.search == text {
                    return false;
                }
                state.search = text;
                true
            });
        }));
    }

    /// Returns `true` while a debounced search update is waiting to apply.
    pub fn is_search_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Sets the role filter immediately.
    pub fn set_role(&self, role: impl Into<String>) {
        let role = role.into();
        self.filters.send_modify(|state| state.role = role);
    }

    /// Sets the department filter immediately.
    pub fn set_department(&self, department: impl Into<String>) {
        let department = department.into();
        self.filters.send_modify(|state| state.department = department);
    }

    /// Sets the status filter immediately.
    pub fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        self.filters.send_modify(|state| state.status = status);
    }

    /// Resets every filter and cancels a pending search update.
    pub fn clear_filters(&self) {
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
        self.filters.send_modify(|state| *state = FilterState::default());
    }
}

impl Drop for FilterController {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().take() {
            pending.abort();
        }
    }
}

impl std::fmt::Debug for FilterController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterController")
            .field("filters", &*self.filters.borrow())
            .field("search_fields", &self.search_fields)
            .field("debounce", &self.debounce)
            .finish()
    }
}
