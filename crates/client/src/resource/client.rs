//! [`ResourceClient`], the per-collection CRUD client, and the [`RecordSource`] seam.

use async_trait::async_trait;
use tracing::{debug, error, info};
use url::Url;

use super::normalize::{extract_count, normalize_list};
use super::record::ResourceRecord;
use super::validate::require_fields;
use super::ResourceKind;
use crate::error::{ClientError, ClientResult};
use crate::http::{HttpClient, Method};

/// Anything that can produce the current list of records.
///
/// [`ListController`](crate::controllers::ListController) depends on this
/// trait rather than on [`ResourceClient`] directly.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short name used in logs.
    fn source_name(&self) -> &str;

    /// Fetches the full list of records.
    async fn list(&self) -> ClientResult<Vec<ResourceRecord>>;
}

/// CRUD client for one backend collection.
///
/// # Example
///
/// ```rust,ignore
/// use hospitex_client::{ClientConfig, HttpClient, ResourceClient, ResourceKind};
/// use hospitex_storage::SessionStore;
///
/// let http = HttpClient::new(&ClientConfig::default(), SessionStore::in_memory())?;
/// let patients = ResourceClient::new(http, ResourceKind::Patient);
///
/// let all = patients.list().await?;
/// let one = patients.get_by_id("42").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: HttpClient,
    kind: ResourceKind,
}

impl ResourceClient {
    /// Creates a client for `kind` over `http`.
    pub fn new(http: HttpClient, kind: ResourceKind) -> Self {
        Self { http, kind }
    }

    /// The collection this client serves.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn collection_path(&self) -> String {
        format!("/{}", self.kind.collection())
    }

    /// The record's URL, with `id` encoded as a single path segment.
    fn item_url(&self, id: &str) -> ClientResult<Url> {
        self.http.url_for_segments(&[self.kind.collection(), id])
    }

    async fn list_at(&self, url: Url) -> ClientResult<Vec<ResourceRecord>> {
        let path = url.path().to_string();
        let payload = self
            .http
            .send(Method::GET, url, None)
            .await
            .inspect_err(|e| {
                error!(resource = %self.kind, path = %path, error = %e, "List request failed");
            })?;
        let records = normalize_list(payload).inspect_err(|e| {
            error!(resource = %self.kind, path = %path, error = %e, "Unrecognized list payload");
        })?;
        debug!(resource = %self.kind, count = records.len(), "Records loaded");
        Ok(records)
    }

    /// Fetches every record in the collection, normalizing the envelope.
    pub async fn list(&self) -> ClientResult<Vec<ResourceRecord>> {
        self.list_at(self.http.url_for(&self.collection_path())?).await
    }

    /// Fetches one record.
    pub async fn get_by_id(&self, id: &str) -> ClientResult<ResourceRecord> {
        let value = self
            .http
            .send(Method::GET, self.item_url(id)?, None)
            .await
            .inspect_err(|e| {
                error!(resource = %self.kind, id = %id, error = %e, "Fetch by id failed");
            })?;
        ResourceRecord::from_response(value)
    }

    /// Creates a record and returns what the backend echoed back.
    ///
    /// For [`ResourceKind::Vital`] the required fields are checked first; if
    /// any are missing nothing is sent.
    pub async fn create(&self, fields: &ResourceRecord) -> ClientResult<ResourceRecord> {
        require_fields(fields, self.kind.required_fields())?;

        let body = serde_json::to_value(fields)?;
        let value = self
            .http
            .post(&self.collection_path(), &body)
            .await
            .inspect_err(|e| {
                error!(resource = %self.kind, error = %e, "Create failed");
            })?;

        info!(resource = %self.kind, "Record created");
        ResourceRecord::from_response(value)
    }

    /// Replaces a record's fields.
    pub async fn update(&self, id: &str, fields: &ResourceRecord) -> ClientResult<ResourceRecord> {
        let body = serde_json::to_value(fields)?;
        let value = self
            .http
            .send(Method::PUT, self.item_url(id)?, Some(&body))
            .await
            .inspect_err(|e| {
                error!(resource = %self.kind, id = %id, error = %e, "Update failed");
            })?;

        info!(resource = %self.kind, id = %id, "Record updated");
        ResourceRecord::from_response(value)
    }

    /// Deletes a record.
    pub async fn remove(&self, id: &str) -> ClientResult<()> {
        self.http
            .send(Method::DELETE, self.item_url(id)?, None)
            .await
            .inspect_err(|e| {
                error!(resource = %self.kind, id = %id, error = %e, "Delete failed");
            })?;

        info!(resource = %self.kind, id = %id, "Record deleted");
        Ok(())
    }

    /// Patients assigned to the signed-in staff member.
    ///
    /// Only available on [`ResourceKind::Patient`].
    pub async fn my_patients(&self) -> ClientResult<Vec<ResourceRecord>> {
        self.ensure_kind(ResourceKind::Patient, "my_patients")?;
        self.list_at(self.http.url_for("/patients/my-patients")?).await
    }

    /// Vitals readings recorded for one patient.
    ///
    /// Only available on [`ResourceKind::Vital`].
    pub async fn by_patient(&self, patient_id: &str) -> ClientResult<Vec<ResourceRecord>> {
        self.ensure_kind(ResourceKind::Vital, "by_patient")?;
        let url = self
            .http
            .url_for_segments(&["vitals", "patient", patient_id])?;
        self.list_at(url).await
    }

    /// Number of records in the collection.
    ///
    /// Uses the backend's count endpoint where one exists and falls back to
    /// counting the list otherwise.
    pub async fn total(&self) -> ClientResult<u64> {
        match self.kind.total_endpoint() {
            Some((path, field)) => {
                let payload = self.http.get(path).await?;
                extract_count(&payload, field)
            }
            None => Ok(self.list().await?.len() as u64),
        }
    }

    fn ensure_kind(&self, expected: ResourceKind, operation: &str) -> ClientResult<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(ClientError::Unsupported {
                operation: operation.to_string(),
                resource: self.kind.to_string(),
            })
        }
    }
}

#[async_trait]
impl RecordSource for ResourceClient {
    fn source_name(&self) -> &str {
        self.kind.collection()
    }

    async fn list(&self) -> ClientResult<Vec<ResourceRecord>> {
        ResourceClient::list(self).await
    }
}
