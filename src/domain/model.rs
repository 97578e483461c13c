use crate::utils::error::SyncError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalog entry flagged for version reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Opaque store identifier (the service URI).
    pub id: String,
    /// Registry lookup key.
    pub title: String,
    pub uuid: Option<String>,
    pub git_repository: Option<String>,
}

impl Service {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            uuid: None,
            git_repository: None,
        }
    }

    /// `namespace/title`, the image reference stored on every revision of this service.
    pub fn image_ref(&self, namespace: &str) -> String {
        format!("{}/{}", namespace, self.title)
    }
}

/// A published image revision label. Compared by exact string equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionTag {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for VersionTag {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// 接受純字串 "1.0.0" 或 Docker Hub 的 {"name": "1.0.0", ...} 物件
impl<'de> Deserialize<'de> for VersionTag {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum TagEntry {
            Name(String),
            Object { name: String },
        }

        Ok(match TagEntry::deserialize(deserializer)? {
            TagEntry::Name(name) | TagEntry::Object { name } => Self(name),
        })
    }
}

/// The persisted fact for one observed (image, version) pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRecord {
    pub identifier: String,
    pub image: String,
    pub version: String,
}

/// Service → VersionRecord relation. Additive only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceVersionLink {
    pub service: String,
    pub record: String,
}

/// Outcome of one reconciliation run.
///
/// Only a discovery failure prevents a `RunResult` from being produced; every
/// other failure lands in `errors` and the remaining work still happens.
#[derive(Debug)]
pub struct RunResult {
    pub services_discovered: usize,
    pub services_processed: usize,
    pub services_skipped: usize,
    pub tags_seen: usize,
    pub versions_written: usize,
    pub versions_minted: usize,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub errors: Vec<SyncError>,
    /// Services found by discovery, for follow-up work such as enrichment.
    pub services: Vec<Service>,
}

impl RunResult {
    pub fn is_complete_success(&self) -> bool {
        self.errors.is_empty() && self.services_skipped == 0
    }

    /// Services were found but none could be processed.
    pub fn is_total_failure(&self) -> bool {
        self.services_discovered > 0 && self.services_processed == 0
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            services_discovered: self.services_discovered,
            services_processed: self.services_processed,
            services_skipped: self.services_skipped,
            tags_seen: self.tags_seen,
            versions_written: self.versions_written,
            versions_minted: self.versions_minted,
            dry_run: self.dry_run,
            started_at: self.started_at,
            finished_at: self.finished_at,
            errors: self
                .errors
                .iter()
                .map(|e| FailureEntry {
                    category: format!("{:?}", e.category()),
                    message: e.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureEntry {
    pub category: String,
    pub message: String,
}

/// Serializable view of a [`RunResult`], used by the CLI's JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub services_discovered: usize,
    pub services_processed: usize,
    pub services_skipped: usize,
    pub tags_seen: usize,
    pub versions_written: usize,
    pub versions_minted: usize,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub errors: Vec<FailureEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub title: String,
    pub shell_command: String,
    pub description: String,
}

/// Snippets and commands published next to a service's source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMetadata {
    pub compose_snippet: String,
    pub creation_snippet: String,
    pub development_snippet: String,
    pub commands: Vec<Command>,
}
