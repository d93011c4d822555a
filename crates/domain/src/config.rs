//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIGURATION_HEADER_KEY, DEFAULT_JOB_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_SECS,
};

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the Nexus server, e.g. `https://nexus.example.org`
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Overrides `<home>/.nexus-api/tokens`
    #[serde(default)]
    pub token_cache_dir: Option<PathBuf>,
    #[serde(default = "default_configuration_header_key")]
    pub configuration_header_key: String,
    #[serde(default = "default_job_poll_interval_ms")]
    pub job_poll_interval_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            token_cache_dir: None,
            configuration_header_key: CONFIGURATION_HEADER_KEY.to_string(),
            job_poll_interval_ms: DEFAULT_JOB_POLL_INTERVAL_MS,
            user_agent: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn job_poll_interval(&self) -> Duration {
        Duration::from_millis(self.job_poll_interval_ms)
    }
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_configuration_header_key() -> String {
    CONFIGURATION_HEADER_KEY.to_string()
}

fn default_job_poll_interval_ms() -> u64 {
    DEFAULT_JOB_POLL_INTERVAL_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_defaults() {
        let config = ClientConfig::new("https://nexus.example.org");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.job_poll_interval(), Duration::from_secs(1));
        assert_eq!(config.configuration_header_key, "Nexus-Configuration");
        assert!(config.token_cache_dir.is_none());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "base_url": "http://localhost:5000" }"#).expect("parse");
        assert_eq!(config, ClientConfig::new("http://localhost:5000"));
    }

    #[test]
    fn toml_overrides() {
        let config: ClientConfig = toml::from_str(
            r#"
            base_url = "http://localhost:5000"
            timeout_seconds = 5
            job_poll_interval_ms = 250
            token_cache_dir = "/tmp/nexus-tokens"
            "#,
        )
        .expect("parse");

        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.job_poll_interval(), Duration::from_millis(250));
        assert_eq!(config.token_cache_dir, Some(PathBuf::from("/tmp/nexus-tokens")));
    }
}
