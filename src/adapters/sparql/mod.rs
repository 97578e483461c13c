pub mod client;
pub mod queries;

pub use client::HttpGraphStoreClient;

use crate::domain::model::{Service, ServiceMetadata, ServiceVersionLink, VersionRecord};
use crate::domain::ports::{GraphStoreClient, IdGenerator, MetadataStore, RevisionStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_GRAPH: &str = "http://mu.semte.ch/application";

/// [`RevisionStore`] over any SPARQL endpoint. `INSERT DATA` gives the set
/// semantics the fact writer depends on.
pub struct SparqlStore<C: GraphStoreClient> {
    client: C,
    graph: String,
    ids: Arc<dyn IdGenerator>,
}

impl<C: GraphStoreClient> SparqlStore<C> {
    pub fn new(client: C, graph: impl Into<String>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            client,
            graph: graph.into(),
            ids,
        }
    }
}

#[async_trait]
impl<C: GraphStoreClient> RevisionStore for SparqlStore<C> {
    async fn tracked_services(&self) -> Result<Vec<Service>> {
        let rows = self
            .client
            .query(&queries::tracked_services(&self.graph)?)
            .await?;

        let mut services = Vec::with_capacity(rows.len());
        for mut row in rows {
            let (Some(id), Some(title)) = (row.remove("service"), row.remove("title")) else {
                tracing::warn!("Skipping incomplete service binding: {:?}", row);
                continue;
            };
            services.push(Service {
                id,
                title,
                uuid: row.remove("uuid"),
                git_repository: row.remove("gitRepository"),
            });
        }
        Ok(services)
    }

    async fn find_revision_id(&self, image: &str, version: &str) -> Result<Option<String>> {
        let rows = self
            .client
            .query(&queries::revision_id(&self.graph, image, version)?)
            .await?;
        Ok(rows.into_iter().find_map(|mut row| row.remove("uuid")))
    }

    async fn insert_revision(&self, record: &VersionRecord) -> Result<()> {
        self.client
            .update(&queries::insert_revision(&self.graph, record)?)
            .await
    }

    async fn insert_link(&self, link: &ServiceVersionLink) -> Result<()> {
        self.client
            .update(&queries::insert_link(&self.graph, link)?)
            .await
    }
}

#[async_trait]
impl<C: GraphStoreClient> MetadataStore for SparqlStore<C> {
    async fn replace_metadata(&self, service: &Service, metadata: &ServiceMetadata) -> Result<()> {
        let command_ids: Vec<String> = metadata
            .commands
            .iter()
            .map(|_| self.ids.generate())
            .collect();

        self.client
            .update(&queries::delete_metadata(&self.graph, &service.id)?)
            .await?;
        self.client
            .update(&queries::insert_metadata(
                &self.graph,
                &service.id,
                metadata,
                &command_ids,
            )?)
            .await
    }
}
