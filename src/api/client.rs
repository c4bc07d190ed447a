use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::error::ApiError;
use super::store::TeacherStore;
use crate::models::{ExportFormat, FilterCriteria, Teacher, TeacherStatistics};

/// Path of the teachers resource below the configured host.
pub const API_PREFIX: &str = "/api/teachers";

/// Sole boundary between the screens and the remote service. Every method maps
/// to one remote call; the mutating ones additionally re-fetch the full list so
/// the store always mirrors server state.
pub struct TeacherClient {
    http: Client,
    base: String,
    store: TeacherStore,
}

impl TeacherClient {
    /// Build a client for `base_url` (scheme, host and port only).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).with_context(|| format!("invalid base URL {base_url}"))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        let base = format!("{}{}", parsed.as_str().trim_end_matches('/'), API_PREFIX);
        Ok(Self {
            http,
            base,
            store: TeacherStore::new(),
        })
    }

    pub fn store(&self) -> &TeacherStore {
        &self.store
    }

    /// Fully qualified URL of the teachers resource.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Fetch every teacher and republish the list to the store. The loading
    /// flag stays raised for the duration of the call.
    pub async fn list_all(&self) -> Result<Vec<Teacher>, ApiError> {
        info!("api: list teachers");
        self.store.set_loading(true);
        let _loading = LoadingGuard(&self.store);
        let result = self.get_json::<Vec<Teacher>>(self.http.get(self.url(""))).await;
        match &result {
            Ok(teachers) => self.store.publish(teachers.clone()),
            Err(err) => warn!("api: list teachers failed: {err}"),
        }
        result
    }

    pub async fn get(&self, id: i64) -> Result<Teacher, ApiError> {
        info!(id, "api: get teacher");
        self.get_json(self.http.get(self.url(&format!("/{id}")))).await
    }

    pub async fn create(&self, teacher: &Teacher) -> Result<Teacher, ApiError> {
        info!(name = %teacher.full_name, "api: create teacher");
        let created = self
            .get_json(self.http.post(self.url("")).json(teacher))
            .await?;
        self.refresh().await;
        Ok(created)
    }

    pub async fn update(&self, id: i64, teacher: &Teacher) -> Result<Teacher, ApiError> {
        info!(id, "api: update teacher");
        let updated = self
            .get_json(self.http.put(self.url(&format!("/{id}"))).json(teacher))
            .await?;
        self.refresh().await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        info!(id, "api: delete teacher");
        self.send(self.http.delete(self.url(&format!("/{id}"))))
            .await?;
        self.refresh().await;
        Ok(())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Teacher>, ApiError> {
        info!(query, "api: search teachers");
        self.get_json(self.http.get(self.url("/search")).query(&[("query", query)]))
            .await
    }

    pub async fn filter(&self, criteria: &FilterCriteria) -> Result<Vec<Teacher>, ApiError> {
        info!(?criteria, "api: filter teachers");
        self.get_json(self.http.post(self.url("/filter")).json(criteria))
            .await
    }

    pub async fn filter_by_age(&self, min_age: u32, max_age: u32) -> Result<Vec<Teacher>, ApiError> {
        info!(min_age, max_age, "api: filter teachers by age");
        let request = self
            .http
            .get(self.url("/filter/age"))
            .query(&[("minAge", min_age), ("maxAge", max_age)]);
        self.get_json(request).await
    }

    pub async fn filter_by_classes(
        &self,
        min_classes: u32,
        max_classes: u32,
    ) -> Result<Vec<Teacher>, ApiError> {
        info!(min_classes, max_classes, "api: filter teachers by classes");
        let request = self
            .http
            .get(self.url("/filter/classes"))
            .query(&[("minClasses", min_classes), ("maxClasses", max_classes)]);
        self.get_json(request).await
    }

    pub async fn statistics(&self) -> Result<TeacherStatistics, ApiError> {
        info!("api: statistics");
        self.get_json(self.http.get(self.url("/statistics"))).await
    }

    /// Download the server-generated export as raw bytes.
    pub async fn export(&self, format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        info!(format = format.label(), "api: export");
        let response = self.send(self.http.get(self.url(format.path()))).await?;
        let bytes = response.bytes().await.map_err(ApiError::Decode)?;
        Ok(bytes.to_vec())
    }

    /// Re-fetch the list after a mutation. The mutation already succeeded, so a
    /// failed refresh is only logged.
    async fn refresh(&self) {
        if let Err(err) = self.list_all().await {
            warn!("api: refresh after mutation failed: {err}");
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: source
                .url()
                .map(|url| url.to_string())
                .unwrap_or_else(|| self.base.clone()),
            source,
        })?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            warn!(%status, url = %response.url(), "api: request failed");
            Err(ApiError::from_status(status))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(ApiError::Decode)
    }
}

/// Lowers the store's loading flag when dropped, so an aborted fetch does not
/// leave it raised.
struct LoadingGuard<'a>(&'a TeacherStore);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_resource_prefix() {
        let client = TeacherClient::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/teachers");
        assert_eq!(client.url("/7"), "http://localhost:8000/api/teachers/7");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = TeacherClient::new("not a url", Duration::from_secs(5))
            .err()
            .expect("must fail");
        assert!(err.to_string().contains("invalid base URL"));
    }
}
