//! [`ActionController`], create/update/delete with per-action loading flags.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use super::list::ListController;
use crate::error::{ClientError, ClientResult};
use crate::resource::{ResourceClient, ResourceRecord};

/// A mutation performed through an [`ActionController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Record creation.
    Create,
    /// Record update.
    Update,
    /// Record deletion.
    Delete,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::Create => "create",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
        })
    }
}

/// Result of a mutation, as shown to a user.
#[derive(Debug)]
pub enum ActionOutcome<T> {
    /// The backend accepted the mutation.
    Succeeded(T),
    /// The mutation failed.
    Failed {
        /// Short message for the user.
        message: String,
        /// The underlying error.
        cause: ClientError,
    },
}

impl<T> ActionOutcome<T> {
    fn from_result(result: ClientResult<T>) -> Self {
        match result {
            Ok(value) => ActionOutcome::Succeeded(value),
            Err(cause) => ActionOutcome::Failed {
                message: cause.user_message(),
                cause,
            },
        }
    }

    /// Returns `true` for [`ActionOutcome::Succeeded`].
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Succeeded(_))
    }

    /// The user-facing failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ActionOutcome::Succeeded(_) => None,
            ActionOutcome::Failed { message, .. } => Some(message),
        }
    }

    /// Converts back into a `Result`.
    pub fn into_result(self) -> ClientResult<T> {
        match self {
            ActionOutcome::Succeeded(value) => Ok(value),
            ActionOutcome::Failed { cause, .. } => Err(cause),
        }
    }
}

/// Which mutations are currently in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionLoading {
    create: usize,
    update: usize,
    delete: usize,
}

impl ActionLoading {
    /// Returns `true` while at least one `kind` action is running.
    pub fn is_loading(&self, kind: ActionKind) -> bool {
        *self.counter(kind) > 0
    }

    /// Returns `true` while any action is running.
    pub fn any(&self) -> bool {
        self.create + self.update + self.delete > 0
    }

    fn counter(&self, kind: ActionKind) -> &usize {
        match kind {
            ActionKind::Create => &self.create,
            ActionKind::Update => &self.update,
            ActionKind::Delete => &self.delete,
        }
    }

    fn counter_mut(&mut self, kind: ActionKind) -> &mut usize {
        match kind {
            ActionKind::Create => &mut self.create,
            ActionKind::Update => &mut self.update,
            ActionKind::Delete => &mut self.delete,
        }
    }
}

/// Marks an action as loading until dropped, including on cancellation.
struct LoadingGuard<'a> {
    loading: &'a watch::Sender<ActionLoading>,
    kind: ActionKind,
}

impl<'a> LoadingGuard<'a> {
    fn start(loading: &'a watch::Sender<ActionLoading>, kind: ActionKind) -> Self {
        loading.send_modify(|state| *state.counter_mut(kind) += 1);
        Self { loading, kind }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let kind = self.kind;
        self.loading.send_modify(|state| {
            let counter = state.counter_mut(kind);
            *counter = counter.saturating_sub(1);
        });
    }
}

/// Runs create/update/delete against one collection and reports outcomes
/// instead of errors.
///
/// When a [`ListController`] is attached, it is refreshed after every
/// successful mutation.
pub struct ActionController {
    client: ResourceClient,
    loading: watch::Sender<ActionLoading>,
    refresh: Option<Arc<ListController>>,
}

impl ActionController {
    /// Creates a controller for `client`'s collection.
    pub fn new(client: ResourceClient) -> Self {
        let (loading, _) = watch::channel(ActionLoading::default());
        Self {
            client,
            loading,
            refresh: None,
        }
    }

    /// Refreshes `list` after each successful mutation.
    pub fn with_refresh(mut self, list: Arc<ListController>) -> Self {
        self.refresh = Some(list);
        self
    }

    /// Returns the current loading flags.
    pub fn loading(&self) -> ActionLoading {
        *self.loading.borrow()
    }

    /// Returns a receiver that observes loading changes.
    pub fn subscribe(&self) -> watch::Receiver<ActionLoading> {
        self.loading.subscribe()
    }

    /// Creates a record.
    pub async fn create(&self, fields: &ResourceRecord) -> ActionOutcome<ResourceRecord> {
        let result = {
            let _guard = LoadingGuard::start(&self.loading, ActionKind::Create);
            self.client.create(fields).await
        };
        self.finish(ActionKind::Create, None, result).await
    }

    /// Updates the record `id`.
    pub async fn update(&self, id: &str, fields: &ResourceRecord) -> ActionOutcome<ResourceRecord> {
        let result = {
            let _guard = LoadingGuard::start(&self.loading, ActionKind::Update);
            self.client.update(id, fields).await
        };
        self.finish(ActionKind::Update, Some(id), result).await
    }

    /// Deletes the record `id`.
    pub async fn delete(&self, id: &str) -> ActionOutcome<()> {
        let result = {
            let _guard = LoadingGuard::start(&self.loading, ActionKind::Delete);
            self.client.remove(id).await
        };
        self.finish(ActionKind::Delete, Some(id), result).await
    }

    async fn finish<T>(
        &self,
        kind: ActionKind,
        id: Option<&str>,
        result: ClientResult<T>,
    ) -> ActionOutcome<T> {
        let resource = self.client.kind();
        match &result {
            Ok(_) => {
                info!(resource = %resource, action = %kind, id = ?id, "Action succeeded");
                if let Some(list) = &self.refresh {
                    list.fetch().await;
                }
            }
            Err(e) => {
                error!(resource = %resource, action = %kind, id = ?id, error = %e, "Action failed");
            }
        }
        ActionOutcome::from_result(result)
    }
}

impl fmt::Debug for ActionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionController")
            .field("resource", &self.client.kind())
            .field("loading", &*self.loading.borrow())
            .field("refresh", &self.refresh.is_some())
            .finish()
    }
}
