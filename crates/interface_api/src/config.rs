//! API configuration

use serde::Deserialize;

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_database_url() -> String {
    "postgres://localhost/claims".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_staging_dir() -> String {
    "/tmp/claims-staging".to_string()
}
fn default_staging_sweep_secs() -> u64 {
    60
}
fn default_poll_interval_secs() -> u64 {
    10
}
fn default_reasoning_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_reasoning_model() -> String {
    "gpt-4o-mini".to_string()
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database URL
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory backing the document staging store
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
    /// Interval between staging housekeeping sweeps
    #[serde(default = "default_staging_sweep_secs")]
    pub staging_sweep_secs: u64,
    /// Interval between analyzer polls for open claims
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Base URL of the reasoning service
    #[serde(default = "default_reasoning_base_url")]
    pub reasoning_base_url: String,
    /// API key for the reasoning service; empty disables auth
    #[serde(default)]
    pub reasoning_api_key: String,
    /// Model served by the reasoning service
    #[serde(default = "default_reasoning_model")]
    pub reasoning_model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            log_level: default_log_level(),
            staging_dir: default_staging_dir(),
            staging_sweep_secs: default_staging_sweep_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            reasoning_base_url: default_reasoning_base_url(),
            reasoning_api_key: String::new(),
            reasoning_model: default_reasoning_model(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment variables with the `API_` prefix
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.staging_sweep_secs, 60);
        assert!(config.reasoning_api_key.is_empty());
    }

    // a malformed variable must surface as an error, never as defaults
    #[test]
    fn test_malformed_environment_is_an_error() {
        std::env::set_var("API_PORT", "not-a-number");
        let result = ApiConfig::from_env();
        std::env::remove_var("API_PORT");
        assert!(result.is_err());
    }
}
