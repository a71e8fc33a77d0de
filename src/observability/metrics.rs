//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by disposition and status
//! - `proxy_request_duration_seconds` (histogram): latency by disposition
//! - `proxy_policy_decisions_total` (counter): policy outcomes by decision
//! - `proxy_stream_errors_total` (counter): downloads broken mid-stream
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(disposition: &'static str, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "disposition" => disposition,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "disposition" => disposition)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_policy_decision(decision: &'static str) {
    counter!("proxy_policy_decisions_total", "decision" => decision).increment(1);
}

pub fn record_stream_error() {
    counter!("proxy_stream_errors_total").increment(1);
}
