//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sweep_cycles_total` (counter): attempt cycles started
//! - `sweep_cycle_duration_seconds` (histogram): cycle latency
//! - `sweep_simulation_failures_total` (counter): relay-rejected simulations
//! - `sweep_submission_failures_total` (counter): relay-rejected submissions
//! - `sweep_bundles_submitted_total` (counter): bundles accepted by the relay
//! - `sweep_resolutions_total` (counter): resolutions by `resolution` label
//! - `sweep_last_observed_block` (gauge): newest block seen by the watcher
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::relay::BundleResolution;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_cycle(start: Instant) {
    metrics::counter!("sweep_cycles_total").increment(1);
    metrics::histogram!("sweep_cycle_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_simulation_failure() {
    metrics::counter!("sweep_simulation_failures_total").increment(1);
}

pub fn record_submission_failure() {
    metrics::counter!("sweep_submission_failures_total").increment(1);
}

pub fn record_bundle_submitted() {
    metrics::counter!("sweep_bundles_submitted_total").increment(1);
}

pub fn record_resolution(resolution: BundleResolution) {
    metrics::counter!("sweep_resolutions_total", "resolution" => resolution.as_str()).increment(1);
}

pub fn record_observed_block(block: u64) {
    metrics::gauge!("sweep_last_observed_block").set(block as f64);
}
