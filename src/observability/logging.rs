//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Resolve the log filter from the command line, `RUST_LOG`, or a default

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither the command line nor `RUST_LOG` sets one.
pub const DEFAULT_FILTER: &str = "rpc_filter_proxy=info,tower_http=info";

/// Pick the effective filter. An explicit override wins over the environment.
pub fn resolve_filter(explicit: Option<&str>) -> EnvFilter {
    explicit
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(explicit: Option<&str>) {
    tracing_subscriber::registry()
        .with(resolve_filter(explicit))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let filter = resolve_filter(Some("rpc_filter_proxy=trace"));
        assert_eq!(filter.to_string(), "rpc_filter_proxy=trace");
    }

    #[test]
    fn invalid_explicit_filter_falls_back() {
        let filter = resolve_filter(Some("rpc_filter_proxy=[[["));
        assert!(!filter.to_string().contains("[[["));
    }
}
