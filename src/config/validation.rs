//! Configuration validation.
//!
//! Serde handles the syntactic side (types, required keys). This module runs
//! the semantic checks and returns every problem found, not just the first.

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;
use crate::http::request::UpstreamTarget;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A method list contains an empty string.
    EmptyMethodName { list: &'static str },
    /// The listener address is not a socket address.
    InvalidBindAddress(String),
    /// The upstream URL is not of the form `http://host[:port]`.
    InvalidUpstreamUrl { url: String, reason: String },
    /// `upstream.timeout_secs` is zero.
    ZeroTimeout,
    /// `limits.max_body_bytes` is zero.
    ZeroBodyLimit,
    /// The metrics endpoint address is not a socket address.
    InvalidMetricsAddress(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyMethodName { list } => {
                write!(f, "{} contains an empty method name", list)
            }
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "invalid listener bind address '{}'", addr)
            }
            ValidationError::InvalidUpstreamUrl { url, reason } => {
                write!(f, "invalid upstream url '{}': {}", url, reason)
            }
            ValidationError::ZeroTimeout => write!(f, "upstream.timeout_secs must be greater than 0"),
            ValidationError::ZeroBodyLimit => write!(f, "limits.max_body_bytes must be greater than 0"),
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "invalid metrics address '{}'", addr)
            }
        }
    }
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.whitelisted_methods.iter().any(|m| m.is_empty()) {
        errors.push(ValidationError::EmptyMethodName { list: "whitelisted_methods" });
    }
    if config.blacklisted_methods.iter().any(|m| m.is_empty()) {
        errors.push(ValidationError::EmptyMethodName { list: "blacklisted_methods" });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }

    if let Err(e) = UpstreamTarget::parse(&config.upstream.url) {
        errors.push(ValidationError::InvalidUpstreamUrl {
            url: config.upstream.url.clone(),
            reason: e.to_string(),
        });
    }

    if config.upstream.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
