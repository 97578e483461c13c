use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Service discovery failed: {message}")]
    DiscoveryError { message: String },

    #[error("Tag fetch failed for service '{service}': {message}")]
    TagFetchError { service: String, message: String },

    #[error("Identity lookup failed for {service}@{version}: {message}")]
    IdentityLookupError {
        service: String,
        version: String,
        message: String,
    },

    #[error("Write failed for {service}@{version}: {message}")]
    WriteError {
        service: String,
        version: String,
        message: String,
    },

    #[error("Metadata enrichment failed for service '{service}': {message}")]
    EnrichmentError { service: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Graph store error: {message}")]
    Store { message: String },

    #[error("Registry error: {message}")]
    Registry { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Discovery,
    Registry,
    Identity,
    Write,
    Enrichment,
    Network,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DiscoveryError { .. } => ErrorCategory::Discovery,
            Self::TagFetchError { .. } | Self::Registry { .. } => ErrorCategory::Registry,
            Self::IdentityLookupError { .. } => ErrorCategory::Identity,
            Self::WriteError { .. } | Self::Store { .. } => ErrorCategory::Write,
            Self::EnrichmentError { .. } => ErrorCategory::Enrichment,
            Self::Http(_) => ErrorCategory::Network,
            Self::Serialization(_) | Self::Io(_) => ErrorCategory::Data,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EnrichmentError { .. } => ErrorSeverity::Low,
            Self::TagFetchError { .. }
            | Self::IdentityLookupError { .. }
            | Self::WriteError { .. } => ErrorSeverity::Medium,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::High,
            Self::DiscoveryError { .. }
            | Self::Http(_)
            | Self::Serialization(_)
            | Self::Io(_)
            | Self::Store { .. }
            | Self::Registry { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Discovery => {
                "Check that the SPARQL endpoint is reachable and re-run the reconciliation"
            }
            ErrorCategory::Registry => {
                "Verify the image exists under the configured namespace; a later run will pick it up"
            }
            ErrorCategory::Identity => {
                "The version was skipped to avoid minting a duplicate identifier; re-run when the store is healthy"
            }
            ErrorCategory::Write => {
                "Re-run the reconciliation; inserts are idempotent so a full re-run is safe"
            }
            ErrorCategory::Enrichment => "Check the git repository URL and snippet files",
            ErrorCategory::Network => "Check network connectivity and endpoint timeouts",
            ErrorCategory::Data => "Inspect the response payload returned by the remote service",
            ErrorCategory::Configuration => "Fix the configuration file or command-line overrides",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::DiscoveryError { .. } => {
                format!("Could not load the tracked services from the graph store ({})", self)
            }
            Self::TagFetchError { service, .. } => {
                format!("Could not fetch image tags for '{}'", service)
            }
            Self::IdentityLookupError {
                service, version, ..
            } => format!("Could not check whether {}@{} is already recorded", service, version),
            Self::WriteError {
                service, version, ..
            } => format!("Could not store version {} of '{}'", version, service),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
