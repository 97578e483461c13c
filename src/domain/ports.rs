use crate::domain::model::{Service, ServiceMetadata, ServiceVersionLink, VersionRecord, VersionTag};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Rows returned by a graph-store read: one map of variable → value per solution.
pub type Bindings = Vec<std::collections::HashMap<String, String>>;

/// Raw read/write access to the knowledge graph.
#[async_trait]
pub trait GraphStoreClient: Send + Sync {
    async fn query(&self, query: &str) -> Result<Bindings>;
    async fn update(&self, update: &str) -> Result<()>;
}

/// The four logical store operations the reconciliation engine needs.
///
/// Implementations must give inserts set semantics: inserting a fact that is
/// already present is a no-op.
#[async_trait]
pub trait RevisionStore: Send + Sync {
    async fn tracked_services(&self) -> Result<Vec<Service>>;
    async fn find_revision_id(&self, image: &str, version: &str) -> Result<Option<String>>;
    async fn insert_revision(&self, record: &VersionRecord) -> Result<()>;
    async fn insert_link(&self, link: &ServiceVersionLink) -> Result<()>;
}

/// Store side of the optional metadata enrichment.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Replaces the snippets and commands recorded for `service`.
    async fn replace_metadata(&self, service: &Service, metadata: &ServiceMetadata)
        -> Result<()>;
}

/// What a registry hands back for one page of tags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagListing {
    Plain(Vec<VersionTag>),
    Paged {
        results: Vec<VersionTag>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
    },
}

#[async_trait]
pub trait TagProvider: Send + Sync {
    async fn list_tags(
        &self,
        namespace: &str,
        service_name: &str,
        page_size: usize,
        page: usize,
    ) -> Result<TagListing>;
}

/// Process-wide source of globally unique identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Fetches raw text files published next to a service's sources.
#[async_trait]
pub trait SnippetSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}
