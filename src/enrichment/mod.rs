//! Optional metadata enrichment: snippets and commands published in a
//! service's git repository. Runs after, and independently of, reconciliation.

pub mod commands;

use crate::domain::model::{Service, ServiceMetadata};
use crate::domain::ports::{MetadataStore, SnippetSource};
use crate::utils::error::SyncError;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_SNIPPET: &str = "image: semtech/mu-javascript-template:1.3.5
links:
  - db:database
ports:
  - \"8888:80\"
  - \"9229:9229\"
environment:
  NODE_ENV: \"development\"
volumes:
  - \"/tmp/tmp/test-js/:/app\"";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub enabled: bool,
    /// Branch the snippet files are read from.
    pub branch: String,
    pub github_url: String,
    pub raw_url: String,
    pub concurrency: usize,
    /// Timeout for each raw file fetch, separate from the store timeout.
    pub timeout_seconds: u64,
    pub default_compose_snippet: String,
    pub default_creation_snippet: String,
    pub default_development_snippet: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            branch: "wip".to_string(),
            github_url: "https://github.com/".to_string(),
            raw_url: "https://raw.githubusercontent.com/".to_string(),
            concurrency: 4,
            timeout_seconds: 10,
            default_compose_snippet: DEFAULT_SNIPPET.to_string(),
            default_creation_snippet: DEFAULT_SNIPPET.to_string(),
            default_development_snippet: DEFAULT_SNIPPET.to_string(),
        }
    }
}

impl MetadataConfig {
    /// `https://github.com/org/repo` → `https://raw.githubusercontent.com/org/repo/{branch}`
    pub fn raw_base_url(&self, git_repository: &str) -> String {
        let repository = git_repository.trim().trim_end_matches('/');
        let repository = repository.strip_suffix(".git").unwrap_or(repository);
        let base = match repository.strip_prefix(&self.github_url) {
            Some(path) => format!("{}{}", self.raw_url, path),
            None => repository.to_string(),
        };
        format!("{}/{}", base, self.branch)
    }
}

#[derive(Debug, Default)]
pub struct EnrichmentReport {
    pub services_updated: usize,
    pub services_without_repository: usize,
    pub errors: Vec<SyncError>,
}

pub struct MetadataEnricher<S: MetadataStore, F: SnippetSource> {
    store: Arc<S>,
    source: F,
    config: MetadataConfig,
}

impl<S: MetadataStore, F: SnippetSource> MetadataEnricher<S, F> {
    pub fn new(store: Arc<S>, source: F, config: MetadataConfig) -> Self {
        Self {
            store,
            source,
            config,
        }
    }

    pub async fn enrich(&self, services: &[Service]) -> EnrichmentReport {
        let outcomes: Vec<Option<Result<(), SyncError>>> = stream::iter(services)
            .map(|service| self.enrich_service(service))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut report = EnrichmentReport::default();
        for outcome in outcomes {
            match outcome {
                None => report.services_without_repository += 1,
                Some(Ok(())) => report.services_updated += 1,
                Some(Err(e)) => {
                    tracing::warn!("⚠️ {}", e);
                    report.errors.push(e);
                }
            }
        }
        tracing::info!(
            "🧩 Metadata updated for {} services ({} without repository, {} failed)",
            report.services_updated,
            report.services_without_repository,
            report.errors.len()
        );
        report
    }

    /// `None` when the service has no git repository to read from.
    async fn enrich_service(&self, service: &Service) -> Option<Result<(), SyncError>> {
        let repository = service.git_repository.as_deref()?;
        let metadata = self.fetch_metadata(repository).await;

        Some(
            self.store
                .replace_metadata(service, &metadata)
                .await
                .map_err(|e| SyncError::EnrichmentError {
                    service: service.title.clone(),
                    message: e.to_string(),
                }),
        )
    }

    pub async fn fetch_metadata(&self, git_repository: &str) -> ServiceMetadata {
        let base = self.config.raw_base_url(git_repository);

        let (commands, compose, creation, development) = futures::join!(
            self.fetch_or_default(format!("{}/commands", base), ""),
            self.fetch_or_default(
                format!("{}/compose-snippet", base),
                &self.config.default_compose_snippet
            ),
            self.fetch_or_default(
                format!("{}/creation-snippet", base),
                &self.config.default_creation_snippet
            ),
            self.fetch_or_default(
                format!("{}/development-snippet", base),
                &self.config.default_development_snippet
            ),
        );

        ServiceMetadata {
            compose_snippet: compose.trim().to_string(),
            creation_snippet: creation.trim().to_string(),
            development_snippet: development.trim().to_string(),
            commands: commands::parse_commands(&commands),
        }
    }

    async fn fetch_or_default(&self, url: String, default: &str) -> String {
        match self.source.fetch_text(&url).await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("Using default for {}: {}", url, e);
                default.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::utils::error::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct CannedFiles(HashMap<String, String>);

    #[async_trait]
    impl SnippetSource for CannedFiles {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| SyncError::registry(format!("404 {}", url)))
        }
    }

    #[test]
    fn test_raw_base_url() {
        let config = MetadataConfig::default();
        assert_eq!(
            config.raw_base_url("https://github.com/mu-semtech/mu-auth.git"),
            "https://raw.githubusercontent.com/mu-semtech/mu-auth/wip"
        );
        assert_eq!(
            config.raw_base_url("https://gitlab.com/x/y/"),
            "https://gitlab.com/x/y/wip"
        );
    }

    #[tokio::test]
    async fn test_enrich_uses_defaults_for_missing_files() {
        let base = "https://raw.githubusercontent.com/mu-semtech/auth/wip";
        let files = CannedFiles(HashMap::from([
            (format!("{}/commands", base), "build,make,Builds\n".to_string()),
            (format!("{}/compose-snippet", base), "  image: semtech/auth\n".to_string()),
        ]));
        let store = Arc::new(MemoryStore::new());
        let config = MetadataConfig {
            default_creation_snippet: "creation default".to_string(),
            ..MetadataConfig::default()
        };
        let enricher = MetadataEnricher::new(store.clone(), files, config);

        let mut with_repo = Service::new("http://example.com/services/auth", "auth");
        with_repo.git_repository = Some("https://github.com/mu-semtech/auth".to_string());
        let without_repo = Service::new("http://example.com/services/bare", "bare");

        let report = enricher.enrich(&[with_repo, without_repo]).await;

        assert_eq!(report.services_updated, 1);
        assert_eq!(report.services_without_repository, 1);
        assert!(report.errors.is_empty());

        let metadata = store
            .metadata_for("http://example.com/services/auth")
            .await
            .unwrap();
        assert_eq!(metadata.compose_snippet, "image: semtech/auth");
        assert_eq!(metadata.creation_snippet, "creation default");
        assert_eq!(metadata.development_snippet, DEFAULT_SNIPPET);
        assert_eq!(metadata.commands.len(), 1);
        assert_eq!(metadata.commands[0].shell_command, "make");
    }

    /// Rejects metadata for one service id, stores the rest.
    struct RejectingStore {
        inner: MemoryStore,
        reject: &'static str,
    }

    #[async_trait]
    impl MetadataStore for RejectingStore {
        async fn replace_metadata(
            &self,
            service: &Service,
            metadata: &ServiceMetadata,
        ) -> Result<()> {
            if service.id == self.reject {
                return Err(SyncError::store("update rejected"));
            }
            self.inner.replace_metadata(service, metadata).await
        }
    }

    #[tokio::test]
    async fn test_rejected_replace_is_reported_for_that_service_only() {
        let store = Arc::new(RejectingStore {
            inner: MemoryStore::new(),
            reject: "http://example.com/services/broken",
        });
        let enricher = MetadataEnricher::new(
            store.clone(),
            CannedFiles(HashMap::new()),
            MetadataConfig::default(),
        );

        let services: Vec<Service> = ["auth", "broken", "login"]
            .iter()
            .map(|name| {
                let mut service =
                    Service::new(format!("http://example.com/services/{}", name), *name);
                service.git_repository = Some(format!("https://github.com/mu-semtech/{}", name));
                service
            })
            .collect();

        let report = enricher.enrich(&services).await;

        assert_eq!(report.services_updated, 2);
        assert_eq!(report.services_without_repository, 0);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            &report.errors[0],
            SyncError::EnrichmentError { service, message }
                if service == "broken" && message.contains("update rejected")
        ));
        assert!(store
            .inner
            .metadata_for("http://example.com/services/login")
            .await
            .is_some());
        assert!(store
            .inner
            .metadata_for("http://example.com/services/broken")
            .await
            .is_none());
    }
}
