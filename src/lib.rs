pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod enrichment;
pub mod utils;

pub use crate::config::AppConfig;
pub use crate::core::{engine::ReconciliationEngine, settings::ReconcileConfig};
pub use crate::domain::model::{RunResult, Service, VersionRecord, VersionTag};
pub use crate::utils::error::{Result, SyncError};
