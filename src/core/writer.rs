use crate::domain::model::{Service, ServiceVersionLink, VersionRecord};
use crate::domain::ports::RevisionStore;
use crate::utils::error::{Result, SyncError};
use std::sync::Arc;

/// Persists a resolved revision as two facts: the record and the service link.
///
/// Both inserts are unconditional. This is only correct because the store
/// treats re-inserting an existing fact as a no-op; a store without set
/// semantics needs an existence check before the link insert.
pub struct FactWriter<S: RevisionStore> {
    store: Arc<S>,
    namespace: String,
}

impl<S: RevisionStore> FactWriter<S> {
    pub fn new(store: Arc<S>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub async fn write(
        &self,
        service: &Service,
        identifier: &str,
        version: &str,
    ) -> Result<VersionRecord> {
        let record = VersionRecord {
            identifier: identifier.to_string(),
            image: service.image_ref(&self.namespace),
            version: version.to_string(),
        };
        let link = ServiceVersionLink {
            service: service.id.clone(),
            record: identifier.to_string(),
        };

        let write_error = |e: SyncError| SyncError::WriteError {
            service: service.title.clone(),
            version: version.to_string(),
            message: e.to_string(),
        };

        // 記錄寫入失敗時不寫連結，避免指向不存在的 revision
        self.store.insert_revision(&record).await.map_err(write_error)?;
        self.store.insert_link(&link).await.map_err(write_error)?;

        tracing::debug!("💾 Stored {}@{} as {}", record.image, version, identifier);
        Ok(record)
    }
}
