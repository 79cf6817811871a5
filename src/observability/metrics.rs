//! Metrics collection and exposition.
//!
//! # Metrics
//! - `session_refresh_total` (counter): refresh exchanges by outcome
//! - `session_replay_total` (counter): replays by outcome
//! - `session_waiters` (gauge): requests suspended behind the current refresh
//! - `session_probe_total` (counter): health probe verdicts, including cooldown skips
//! - `session_login_redirect_total` (counter): unrecoverable session failures
//!
//! Updates go through the `metrics` facade and are no-ops until a recorder
//! is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_refresh(outcome: &'static str) {
    metrics::counter!("session_refresh_total", "outcome" => outcome).increment(1);
}

pub fn record_replay(outcome: &'static str) {
    metrics::counter!("session_replay_total", "outcome" => outcome).increment(1);
}

pub fn record_waiters(count: usize) {
    metrics::gauge!("session_waiters").set(count as f64);
}

pub fn record_probe(result: &'static str) {
    metrics::counter!("session_probe_total", "result" => result).increment(1);
}

pub fn record_login_redirect() {
    metrics::counter!("session_login_redirect_total").increment(1);
}
