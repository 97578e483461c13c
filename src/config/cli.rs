use crate::config::AppConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "revision-sync")]
#[command(about = "Reconcile tracked microservices with their published image tags")]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults apply when absent)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Registry namespace the images are published under
    #[arg(long)]
    pub namespace: Option<String>,

    /// SPARQL endpoint of the graph store
    #[arg(long)]
    pub store_endpoint: Option<String>,

    /// Base URL of the registry API
    #[arg(long)]
    pub registry_url: Option<String>,

    /// Services reconciled concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Resolve identifiers without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Also refresh snippets and commands from each service's repository
    #[arg(long)]
    pub with_metadata: bool,

    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log CPU and memory usage per phase
    #[arg(long)]
    pub monitor: bool,
}

impl CliArgs {
    /// 命令列參數覆蓋檔案中的設定
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(namespace) = &self.namespace {
            config.registry.namespace = namespace.clone();
        }
        if let Some(endpoint) = &self.store_endpoint {
            config.store.endpoint = endpoint.clone();
        }
        if let Some(url) = &self.registry_url {
            config.registry.url = url.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.reconcile.concurrent_services = concurrency;
        }
        if self.dry_run {
            config.reconcile.dry_run = true;
        }
        if self.with_metadata {
            config.metadata.enabled = true;
        }
    }

    pub fn load_config(&self) -> crate::utils::error::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        self.apply_to(&mut config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[registry]\nnamespace = \"from-file\"\n\n[reconcile]\nconcurrent_services = 3"
        )
        .unwrap();

        let args = CliArgs::parse_from([
            "revision-sync",
            "--config",
            file.path().to_str().unwrap(),
            "--namespace",
            "from-cli",
            "--dry-run",
        ]);
        let config = args.load_config().unwrap();

        assert_eq!(config.registry.namespace, "from-cli");
        assert_eq!(config.reconcile.concurrent_services, 3);
        assert!(config.reconcile.dry_run);
        assert!(!config.metadata.enabled);
        assert_eq!(args.output, OutputFormat::Text);
    }

    #[test]
    fn test_defaults_without_config_file() {
        let args = CliArgs::parse_from(["revision-sync", "--output", "json", "--with-metadata"]);
        let config = args.load_config().unwrap();

        assert_eq!(config.registry.namespace, "semtech");
        assert!(config.metadata.enabled);
        assert_eq!(args.output, OutputFormat::Json);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = CliArgs::parse_from(["revision-sync", "--config", "/nonexistent/revision-sync.toml"]);
        assert!(args.load_config().is_err());
    }
}
