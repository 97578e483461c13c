use crate::domain::model::{Service, ServiceMetadata, ServiceVersionLink, VersionRecord};
use crate::domain::ports::{MetadataStore, RevisionStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct GraphState {
    services: Vec<Service>,
    records: BTreeSet<(String, String, String)>,
    links: BTreeSet<ServiceVersionLink>,
    metadata: HashMap<String, ServiceMetadata>,
    mutations: usize,
}

/// In-process graph with set semantics, for tests and local dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<GraphState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_services(services: Vec<Service>) -> Self {
        Self {
            state: Mutex::new(GraphState {
                services,
                ..GraphState::default()
            }),
        }
    }

    pub async fn records(&self) -> Vec<VersionRecord> {
        let state = self.state.lock().await;
        state
            .records
            .iter()
            .map(|(identifier, image, version)| VersionRecord {
                identifier: identifier.clone(),
                image: image.clone(),
                version: version.clone(),
            })
            .collect()
    }

    pub async fn links(&self) -> Vec<ServiceVersionLink> {
        self.state.lock().await.links.iter().cloned().collect()
    }

    pub async fn metadata_for(&self, service_id: &str) -> Option<ServiceMetadata> {
        self.state.lock().await.metadata.get(service_id).cloned()
    }

    /// Number of insert/replace calls received, including no-op re-inserts.
    pub async fn mutation_count(&self) -> usize {
        self.state.lock().await.mutations
    }
}

#[async_trait]
impl RevisionStore for MemoryStore {
    async fn tracked_services(&self) -> Result<Vec<Service>> {
        Ok(self.state.lock().await.services.clone())
    }

    async fn find_revision_id(&self, image: &str, version: &str) -> Result<Option<String>> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .iter()
            .find(|(_, i, v)| i == image && v == version)
            .map(|(identifier, _, _)| identifier.clone()))
    }

    async fn insert_revision(&self, record: &VersionRecord) -> Result<()> {
        let mut state = self.state.lock().await;
        state.mutations += 1;
        state.records.insert((
            record.identifier.clone(),
            record.image.clone(),
            record.version.clone(),
        ));
        Ok(())
    }

    async fn insert_link(&self, link: &ServiceVersionLink) -> Result<()> {
        let mut state = self.state.lock().await;
        state.mutations += 1;
        state.links.insert(link.clone());
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn replace_metadata(&self, service: &Service, metadata: &ServiceMetadata) -> Result<()> {
        let mut state = self.state.lock().await;
        state.mutations += 1;
        state.metadata.insert(service.id.clone(), metadata.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_is_idempotent() {
        let store = MemoryStore::new();
        let record = VersionRecord {
            identifier: "abc".to_string(),
            image: "semtech/auth-service".to_string(),
            version: "1.0.0".to_string(),
        };

        store.insert_revision(&record).await.unwrap();
        store.insert_revision(&record).await.unwrap();

        assert_eq!(store.records().await, vec![record]);
        assert_eq!(store.mutation_count().await, 2);
        assert_eq!(
            store
                .find_revision_id("semtech/auth-service", "1.0.0")
                .await
                .unwrap(),
            Some("abc".to_string())
        );
        assert_eq!(
            store
                .find_revision_id("semtech/auth-service", "1.0")
                .await
                .unwrap(),
            None
        );
    }
}
