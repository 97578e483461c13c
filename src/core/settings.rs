use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAMESPACE: &str = "semtech";
/// Registry page size; also the hard upper bound on tags considered per service.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Everything the reconciliation engine needs to know, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub namespace: String,
    pub page_size: usize,
    pub page: usize,
    pub concurrent_services: usize,
    pub concurrent_writes: usize,
    pub dry_run: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
            concurrent_services: 10,
            concurrent_writes: 10,
            dry_run: false,
        }
    }
}

impl ReconcileConfig {
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Validate for ReconcileConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("registry.namespace", &self.namespace)?;
        validate_range("registry.page_size", self.page_size, 1, DEFAULT_PAGE_SIZE)?;
        validate_range("registry.page", self.page, 1, usize::MAX)?;
        validate_range("reconcile.concurrent_services", self.concurrent_services, 1, 256)?;
        validate_range("reconcile.concurrent_writes", self.concurrent_writes, 1, 256)?;
        Ok(())
    }
}
