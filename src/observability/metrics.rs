//! Metrics collection and exposition.
//!
//! # Metrics
//! - `access_decisions_total` (counter): filter chain outcomes by `outcome`
//! - `authentication_attempts_total` (counter): login results by `result`
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is optional and off by default

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_decision(outcome: &'static str) {
    metrics::counter!("access_decisions_total", "outcome" => outcome).increment(1);
}

pub fn record_authentication(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("authentication_attempts_total", "result" => result).increment(1);
}
