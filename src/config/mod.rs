#[cfg(feature = "cli")]
pub mod cli;

use crate::adapters::docker_hub::DEFAULT_REGISTRY_URL;
use crate::adapters::sparql::DEFAULT_GRAPH;
use crate::core::settings::{ReconcileConfig, DEFAULT_NAMESPACE, DEFAULT_PAGE_SIZE};
use crate::enrichment::MetadataConfig;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_STORE_ENDPOINT: &str = "http://database:8890/sparql";

/// Whole-application configuration, normally read from a TOML file.
///
/// Every section and field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub registry: RegistryConfig,
    pub store: StoreConfig,
    pub reconcile: ReconcileSection,
    pub metadata: MetadataConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub url: String,
    pub namespace: String,
    pub page_size: usize,
    pub page: usize,
    pub timeout_seconds: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub endpoint: String,
    /// Separate SPARQL update endpoint; the query endpoint is used when unset.
    pub update_endpoint: Option<String>,
    pub graph: String,
    pub timeout_seconds: u64,
    pub headers: HashMap<String, String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_STORE_ENDPOINT.to_string(),
            update_endpoint: None,
            graph: DEFAULT_GRAPH.to_string(),
            timeout_seconds: 30,
            headers: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSection {
    pub concurrent_services: usize,
    pub concurrent_writes: usize,
    pub dry_run: bool,
}

impl Default for ReconcileSection {
    fn default() -> Self {
        let defaults = ReconcileConfig::default();
        Self {
            concurrent_services: defaults.concurrent_services,
            concurrent_writes: defaults.concurrent_writes,
            dry_run: defaults.dry_run,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of the compact human format.
    pub json: bool,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| SyncError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SPARQL_ENDPOINT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn reconcile_settings(&self) -> ReconcileConfig {
        ReconcileConfig {
            namespace: self.registry.namespace.clone(),
            page_size: self.registry.page_size,
            page: self.registry.page,
            concurrent_services: self.reconcile.concurrent_services,
            concurrent_writes: self.reconcile.concurrent_writes,
            dry_run: self.reconcile.dry_run,
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout_seconds)
    }

    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry.timeout_seconds)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata.timeout_seconds)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("registry.url", &self.registry.url)?;
        validate_positive_number("registry.timeout_seconds", self.registry.timeout_seconds as usize, 1)?;

        validate_url("store.endpoint", &self.store.endpoint)?;
        if let Some(update_endpoint) = &self.store.update_endpoint {
            validate_url("store.update_endpoint", update_endpoint)?;
        }
        validate_url("store.graph", &self.store.graph)?;
        validate_positive_number("store.timeout_seconds", self.store.timeout_seconds as usize, 1)?;

        self.reconcile_settings().validate()?;

        if self.metadata.enabled {
            validate_non_empty_string("metadata.branch", &self.metadata.branch)?;
            validate_url("metadata.raw_url", &self.metadata.raw_url)?;
            validate_positive_number("metadata.concurrency", self.metadata.concurrency, 1)?;
            validate_positive_number("metadata.timeout_seconds", self.metadata.timeout_seconds as usize, 1)?;
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
