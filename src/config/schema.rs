//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from the JSON config file.

use serde::{Deserialize, Serialize};

/// Root configuration for the filtering proxy.
///
/// The two method lists are mandatory; every other section falls back to
/// its defaults so a minimal policy file is a complete configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProxyConfig {
    /// JSON-RPC methods admitted by the policy.
    pub whitelisted_methods: Vec<String>,

    /// JSON-RPC methods always rejected, even when also whitelisted.
    pub blacklisted_methods: Vec<String>,

    /// Listener configuration (bind address).
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Upstream service settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Request size limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:14705").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:14705".to_string(),
        }
    }
}

/// Upstream service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream (scheme and authority only).
    pub url: String,

    /// Bound on a single upstream call in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8899".to_string(),
            timeout_secs: None,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_policy_file_uses_defaults() {
        let json = r#"{"whitelisted_methods":["getHealth"],"blacklisted_methods":[]}"#;
        let config: ProxyConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.whitelisted_methods, vec!["getHealth".to_string()]);
        assert!(config.blacklisted_methods.is_empty());
        assert_eq!(config.listener.bind_address, "0.0.0.0:14705");
        assert_eq!(config.upstream.url, "http://localhost:8899");
        assert_eq!(config.upstream.timeout_secs, None);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn method_lists_are_required() {
        let json = r#"{"whitelisted_methods":["getHealth"]}"#;
        assert!(serde_json::from_str::<ProxyConfig>(json).is_err());
    }

    #[test]
    fn method_lists_must_be_strings() {
        let json = r#"{"whitelisted_methods":[1, 2],"blacklisted_methods":[]}"#;
        assert!(serde_json::from_str::<ProxyConfig>(json).is_err());
    }

    #[test]
    fn optional_sections_override_defaults() {
        let json = r#"{
            "whitelisted_methods": [],
            "blacklisted_methods": ["sendTransaction"],
            "upstream": { "url": "http://10.0.0.2:8899", "timeout_secs": 30 },
            "limits": { "max_body_bytes": 1024 }
        }"#;
        let config: ProxyConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.upstream.url, "http://10.0.0.2:8899");
        assert_eq!(config.upstream.timeout_secs, Some(30));
        assert_eq!(config.limits.max_body_bytes, 1024);
        assert_eq!(config.listener.bind_address, "0.0.0.0:14705");
    }
}
