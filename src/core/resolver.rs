use crate::domain::model::Service;
use crate::domain::ports::{IdGenerator, RevisionStore};
use crate::utils::error::{Result, SyncError};
use std::sync::Arc;

/// Identifier chosen for a (service, version) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A revision with this image and version is already recorded.
    Existing(String),
    /// Nothing recorded yet; a fresh identifier was minted but not persisted.
    Minted(String),
}

impl Resolution {
    pub fn identifier(&self) -> &str {
        match self {
            Resolution::Existing(id) | Resolution::Minted(id) => id,
        }
    }

    pub fn is_minted(&self) -> bool {
        matches!(self, Resolution::Minted(_))
    }
}

/// Maps (service, version) to a stable revision identifier. Read-only against the store.
pub struct IdentityResolver<S: RevisionStore> {
    store: Arc<S>,
    ids: Arc<dyn IdGenerator>,
    namespace: String,
}

impl<S: RevisionStore> IdentityResolver<S> {
    pub fn new(store: Arc<S>, ids: Arc<dyn IdGenerator>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            ids,
            namespace: namespace.into(),
        }
    }

    pub async fn resolve(&self, service: &Service, version: &str) -> Result<Resolution> {
        let image = service.image_ref(&self.namespace);

        // 查詢失敗不可視為「不存在」，否則會產生重複的識別碼
        let existing = self
            .store
            .find_revision_id(&image, version)
            .await
            .map_err(|e| SyncError::IdentityLookupError {
                service: service.title.clone(),
                version: version.to_string(),
                message: e.to_string(),
            })?;

        Ok(match existing {
            Some(id) => {
                tracing::trace!("♻️ {}@{} already recorded as {}", image, version, id);
                Resolution::Existing(id)
            }
            None => {
                let id = self.ids.generate();
                tracing::debug!("🆕 {}@{} minted {}", image, version, id);
                Resolution::Minted(id)
            }
        })
    }
}
