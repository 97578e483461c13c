use clap::Parser;
use revision_sync::adapters::{
    DockerHubTagProvider, HttpGraphStoreClient, HttpSnippetSource, SparqlStore, UuidGenerator,
};
use revision_sync::config::cli::{CliArgs, OutputFormat};
use revision_sync::enrichment::MetadataEnricher;
use revision_sync::utils::error::ErrorSeverity;
use revision_sync::utils::{logger, validation::Validate};
use revision_sync::{ReconciliationEngine, RunResult};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("Starting revision-sync");
    tracing::debug!("Configuration: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let mut client = HttpGraphStoreClient::new(config.store.endpoint.clone())
        .with_headers(config.store.headers.clone())
        .with_timeout(config.store_timeout());
    if let Some(update_endpoint) = &config.store.update_endpoint {
        client = client.with_update_endpoint(update_endpoint.clone());
    }
    let ids = Arc::new(UuidGenerator);
    let store = Arc::new(SparqlStore::new(client, config.store.graph.clone(), ids.clone()));
    let tags = DockerHubTagProvider::new(config.registry.url.clone())
        .with_timeout(config.registry_timeout());

    let engine =
        ReconciliationEngine::with_id_generator(store.clone(), tags, ids, config.reconcile_settings())
            .with_monitoring(args.monitor);
    tracing::info!(
        "🔄 Reconciling namespace '{}' (dry run: {})",
        engine.config().namespace,
        engine.config().dry_run
    );

    // Ctrl-C 只阻止尚未開始的服務，已寫入的資料保留
    let cancel = engine.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("⏹️ Cancellation requested, finishing in-flight services");
            cancel.cancel();
        }
    });

    let result = match engine.run().await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(
                "❌ Reconciliation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(3);
        }
    };

    // 補充資料失敗不影響對帳結果，只輸出警告
    if config.metadata.enabled && !config.reconcile.dry_run {
        let enricher = MetadataEnricher::new(
            store.clone(),
            HttpSnippetSource::new().with_timeout(config.metadata_timeout()),
            config.metadata.clone(),
        );
        let enrichment = enricher.enrich(&result.services).await;
        eprintln!(
            "🧩 Metadata: {} updated, {} without repository, {} failed",
            enrichment.services_updated,
            enrichment.services_without_repository,
            enrichment.errors.len()
        );
        for error in &enrichment.errors {
            eprintln!("⚠️ {}", error.user_friendly_message());
        }
    }

    report(&result, args.output)?;

    // 根據結果決定退出碼：部分失敗仍屬成功執行，但以 2 提示
    let exit_code = match result.errors.iter().map(|e| e.severity()).max() {
        None if result.services_skipped == 0 => 0,
        None => 2,
        Some(ErrorSeverity::Low) => 0,
        Some(_) => 2,
    };
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn report(result: &RunResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result.summary())?);
        }
        OutputFormat::Text => {
            let status = if result.is_complete_success() {
                "✅ Reconciliation completed"
            } else if result.is_total_failure() {
                "❌ Reconciliation processed no services"
            } else {
                "⚠️ Reconciliation completed with failures"
            };
            println!("{}", status);
            println!(
                "   services: {} discovered, {} processed, {} skipped",
                result.services_discovered, result.services_processed, result.services_skipped
            );
            println!(
                "   versions: {} tags seen, {} written, {} new{}",
                result.tags_seen,
                result.versions_written,
                result.versions_minted,
                if result.dry_run { " (dry run)" } else { "" }
            );
            for error in &result.errors {
                println!("   - {}", error);
                println!("     💡 {}", error.recovery_suggestion());
            }
        }
    }
    Ok(())
}
