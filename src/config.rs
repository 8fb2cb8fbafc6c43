//! Service configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Top-level service configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port for the HTTP API.
    pub http_port: u16,
    /// Churn weight profile name ("heuristic_v1" or "semantic_v1").
    pub churn_profile: String,
    /// Sender domains considered known-good by the security filter.
    pub trusted_sender_domains: Vec<String>,
    /// Bounded timeout for optional classifier/analyzer model calls.
    pub model_timeout: Duration,
    /// Directory for rolling log files.
    pub log_dir: String,
}

impl AppConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_port: u16 = match std::env::var("TRIAGE_HTTP_PORT") {
            Ok(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TRIAGE_HTTP_PORT".into(),
                message: format!("not a valid port: {s}"),
            })?,
            Err(_) => 5000,
        };

        let churn_profile =
            std::env::var("TRIAGE_CHURN_PROFILE").unwrap_or_else(|_| "heuristic_v1".to_string());

        let trusted_sender_domains: Vec<String> = std::env::var("TRIAGE_TRUSTED_DOMAINS")
            .unwrap_or_else(|_| "gmail.com,empresa.com,outlook.com".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let model_timeout_secs: u64 = std::env::var("TRIAGE_MODEL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let log_dir = std::env::var("TRIAGE_LOG_DIR").unwrap_or_else(|_| "./logs".to_string());

        Ok(Self {
            http_port,
            churn_profile,
            trusted_sender_domains,
            model_timeout: Duration::from_secs(model_timeout_secs),
            log_dir,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: 5000,
            churn_profile: "heuristic_v1".to_string(),
            trusted_sender_domains: vec![
                "gmail.com".to_string(),
                "empresa.com".to_string(),
                "outlook.com".to_string(),
            ],
            model_timeout: Duration::from_secs(5),
            log_dir: "./logs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_trusted_domains() {
        let config = AppConfig::default();
        assert!(config.trusted_sender_domains.contains(&"gmail.com".to_string()));
        assert_eq!(config.http_port, 5000);
    }
}
