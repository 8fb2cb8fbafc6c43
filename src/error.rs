//! Error types for the ticket intake service.

use std::time::Duration;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Advisor error: {0}")]
    Advisor(#[from] AdvisorError),

    #[error("Analyzer error: {0}")]
    Analyzer(#[from] AnalyzerError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ticket store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

/// Intake pipeline errors.
///
/// `SecurityBlock` is deliberately opaque: its message never explains
/// which signal triggered the rejection. The score is kept for internal
/// audit logging only.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Mensaje no procesable")]
    SecurityBlock { score: f32 },

    #[error("Scoring failed: {0}")]
    Scoring(String),
}

/// Channel (email I/O) errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Fetch failed on channel {name}: {reason}")]
    FetchFailed { name: String, reason: String },

    #[error("Channel health check failed: {name}")]
    HealthCheckFailed { name: String },
}

/// Optional-model analyzer errors.
///
/// These never fail a request: callers degrade to the rule-based path.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Model {name} unavailable: {reason}")]
    Unavailable { name: String, reason: String },

    #[error("Model {name} timed out after {timeout:?}")]
    Timeout { name: String, timeout: Duration },
}

/// Advisory LLM errors.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Advisor timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Advisor is not configured")]
    NotConfigured,
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
