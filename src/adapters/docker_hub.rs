use crate::domain::ports::{TagListing, TagProvider};
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const DEFAULT_REGISTRY_URL: &str = "https://hub.docker.com";

/// Docker Hub v2 tag listing: `GET /v2/repositories/{namespace}/{name}/tags`.
#[derive(Debug, Clone)]
pub struct DockerHubTagProvider {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl DockerHubTagProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Namespace and name are pushed as single path segments, so `/`, `?` or `#`
    /// in a title are percent-encoded.
    fn tags_url(&self, namespace: &str, service_name: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            SyncError::registry(format!("Invalid registry URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                SyncError::registry(format!("Registry URL '{}' cannot hold a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v2", "repositories", namespace, service_name, "tags"]);
        Ok(url)
    }
}

impl Default for DockerHubTagProvider {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

#[async_trait]
impl TagProvider for DockerHubTagProvider {
    async fn list_tags(
        &self,
        namespace: &str,
        service_name: &str,
        page_size: usize,
        page: usize,
    ) -> Result<TagListing> {
        let url = self.tags_url(namespace, service_name)?;
        tracing::debug!("📡 Fetching tags: {} (page {}, size {})", url, page, page_size);

        let mut request = self
            .client
            .get(url.clone())
            .query(&[("page_size", page_size), ("page", page)]);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::registry(format!("{} returned {}", url, status)));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            SyncError::registry(format!("Unexpected tag listing from {}: {}", url, e))
        })
    }
}
