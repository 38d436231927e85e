//! Partner connection configuration

use serde::Deserialize;

use core_kernel::{CircuitBreakerConfig, RetryPolicy};

/// Connection settings for one partner system
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerConfig {
    /// Base URL of the partner API (e.g., "https://api.speedpay.example/v2")
    pub base_url: String,

    /// API key sent on every request
    pub api_key: String,

    /// Header name carrying the API key
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Fixed-attempt retry applied to transient failures
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Circuit breaker; None disables it
    #[serde(default = "default_circuit_breaker")]
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

fn default_api_key_header() -> String {
    "X-Api-Key".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_circuit_breaker() -> Option<CircuitBreakerConfig> {
    Some(CircuitBreakerConfig::default())
}

impl Default for PartnerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            api_key_header: default_api_key_header(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry: RetryPolicy::default(),
            circuit_breaker: default_circuit_breaker(),
        }
    }
}

impl PartnerConfig {
    /// Creates a config with the given base URL and API key, defaults elsewhere
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

/// Connection settings for all four partners
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerSettings {
    #[serde(default)]
    pub clue: PartnerConfig,
    #[serde(default)]
    pub policystar: PartnerConfig,
    #[serde(default)]
    pub rmv: PartnerConfig,
    #[serde(default)]
    pub speedpay: PartnerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PartnerConfig::new("https://api.example", "key-123");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.api_key_header, "X-Api-Key");
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.circuit_breaker.is_some());
    }

    #[test]
    fn test_config_deserializes_with_partial_fields() {
        let config: PartnerConfig = serde_json::from_str(
            r#"{"base_url": "https://clue.example", "api_key": "k", "timeout_secs": 10}"#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.retry.backoff_ms, 500);
    }
}
