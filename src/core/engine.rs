use crate::adapters::id::UuidGenerator;
use crate::core::resolver::{IdentityResolver, Resolution};
use crate::core::settings::ReconcileConfig;
use crate::core::tags::normalize_tags;
use crate::core::writer::FactWriter;
use crate::domain::model::{RunResult, Service, VersionTag};
use crate::domain::ports::{IdGenerator, RevisionStore, TagProvider};
use crate::utils::error::{Result, SyncError};
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Stops a running reconciliation from starting further services.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-run keyed locks so one (image, version) key is resolved and written by
/// one task at a time inside this process.
#[derive(Default)]
struct PairLocks {
    locks: Mutex<HashMap<(String, String), Arc<Mutex<()>>>>,
}

impl PairLocks {
    async fn acquire(&self, image: &str, version: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry((image.to_string(), version.to_string()))
                .or_default()
                .clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Debug, Default)]
struct ServiceOutcome {
    processed: bool,
    skipped: bool,
    tags_seen: usize,
    written: usize,
    minted: usize,
    errors: Vec<SyncError>,
}

impl ServiceOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    fn failed(error: SyncError) -> Self {
        Self {
            errors: vec![error],
            ..Self::default()
        }
    }
}

/// Discovers tracked services, fetches their tags and records every version.
///
/// `run` returns only after every service and tag task has finished, successfully or not.
pub struct ReconciliationEngine<S: RevisionStore, T: TagProvider> {
    store: Arc<S>,
    tags: T,
    resolver: IdentityResolver<S>,
    writer: FactWriter<S>,
    config: ReconcileConfig,
    cancel: CancelHandle,
    monitor: SystemMonitor,
}

impl<S: RevisionStore, T: TagProvider> ReconciliationEngine<S, T> {
    pub fn new(store: Arc<S>, tags: T, config: ReconcileConfig) -> Self {
        Self::with_id_generator(store, tags, Arc::new(UuidGenerator), config)
    }

    pub fn with_id_generator(
        store: Arc<S>,
        tags: T,
        ids: Arc<dyn IdGenerator>,
        config: ReconcileConfig,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(store.clone(), ids, config.namespace.clone()),
            writer: FactWriter::new(store.clone(), config.namespace.clone()),
            store,
            tags,
            config,
            cancel: CancelHandle::default(),
            monitor: SystemMonitor::default(),
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = SystemMonitor::new(enabled);
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Runs one reconciliation pass. Only a discovery failure is returned as `Err`.
    pub async fn run(&self) -> Result<RunResult> {
        let started_at = Utc::now();
        tracing::info!(
            "🚀 Starting reconciliation (namespace: {}, dry run: {})",
            self.config.namespace,
            self.config.dry_run
        );

        // Step A: 探索 — 失敗則整個執行中止，不做任何寫入
        let services = self.store.tracked_services().await.map_err(|e| {
            tracing::error!("❌ Service discovery failed: {}", e);
            SyncError::DiscoveryError {
                message: e.to_string(),
            }
        })?;
        tracing::info!("🔎 Discovered {} tracked services", services.len());
        self.monitor.log_stats("Discovery");

        let locks = PairLocks::default();

        // Step B/C: 各服務並行處理，等待全部完成後才彙總
        let outcomes: Vec<ServiceOutcome> = stream::iter(services.iter())
            .map(|service| self.reconcile_service(service, &locks))
            .buffer_unordered(self.config.concurrent_services.max(1))
            .collect()
            .await;

        let mut result = RunResult {
            services_discovered: services.len(),
            services_processed: 0,
            services_skipped: 0,
            tags_seen: 0,
            versions_written: 0,
            versions_minted: 0,
            dry_run: self.config.dry_run,
            started_at,
            finished_at: started_at,
            errors: Vec::new(),
            services: Vec::new(),
        };
        for outcome in outcomes {
            result.services_processed += usize::from(outcome.processed);
            result.services_skipped += usize::from(outcome.skipped);
            result.tags_seen += outcome.tags_seen;
            result.versions_written += outcome.written;
            result.versions_minted += outcome.minted;
            result.errors.extend(outcome.errors);
        }
        result.finished_at = Utc::now();
        result.services = services;

        self.monitor.log_stats("Reconciliation");
        tracing::info!(
            "✅ Reconciliation finished: {}/{} services, {} tags, {} written, {} new, {} skipped, {} errors",
            result.services_processed,
            result.services_discovered,
            result.tags_seen,
            result.versions_written,
            result.versions_minted,
            result.services_skipped,
            result.errors.len()
        );

        Ok(result)
    }

    async fn reconcile_service(&self, service: &Service, locks: &PairLocks) -> ServiceOutcome {
        if self.cancel.is_cancelled() {
            tracing::info!("⏹️ Skipping '{}': run cancelled", service.title);
            return ServiceOutcome::skipped();
        }

        let listing = match self
            .tags
            .list_tags(
                &self.config.namespace,
                &service.title,
                self.config.page_size,
                self.config.page,
            )
            .await
        {
            Ok(listing) => listing,
            Err(e) => {
                tracing::warn!("⚠️ Could not fetch tags for '{}': {}", service.title, e);
                return ServiceOutcome::failed(SyncError::TagFetchError {
                    service: service.title.clone(),
                    message: e.to_string(),
                });
            }
        };
        let tags = normalize_tags(listing, self.config.page_size);
        tracing::debug!("🏷️ {} tags for '{}'", tags.len(), service.title);

        let results: Vec<Result<Resolution>> = stream::iter(tags.iter())
            .map(|tag| self.apply_tag(service, tag, locks))
            .buffer_unordered(self.config.concurrent_writes.max(1))
            .collect()
            .await;

        let mut outcome = ServiceOutcome {
            processed: true,
            tags_seen: tags.len(),
            ..ServiceOutcome::default()
        };
        for result in results {
            match result {
                Ok(resolution) => {
                    if !self.config.dry_run {
                        outcome.written += 1;
                    }
                    outcome.minted += usize::from(resolution.is_minted());
                }
                Err(e) => {
                    tracing::warn!("⚠️ {}", e);
                    outcome.errors.push(e);
                }
            }
        }

        tracing::info!(
            "📦 {}: {} tags, {} new, {} failed",
            service.title,
            outcome.tags_seen,
            outcome.minted,
            outcome.errors.len()
        );
        outcome
    }

    async fn apply_tag(
        &self,
        service: &Service,
        tag: &VersionTag,
        locks: &PairLocks,
    ) -> Result<Resolution> {
        let version = tag.as_str();
        let _guard = locks
            .acquire(&service.image_ref(&self.config.namespace), version)
            .await;

        let resolution = self.resolver.resolve(service, version).await?;
        if !self.config.dry_run {
            self.writer
                .write(service, resolution.identifier(), version)
                .await?;
        }
        Ok(resolution)
    }
}
