//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the check-in server:
//! - HTTP request metrics (latency, counts, errors)
//! - Device state gauges (collected dynamically from the orchestrator)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "turnstile_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("turnstile_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "turnstile_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Device State Gauges (collected dynamically)
// =============================================================================

/// Whether scanning is running (1) or stopped (0).
pub static SCANNING_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "turnstile_scanning_active",
        "Whether the scan session is running (1) or stopped (0)",
    )
    .unwrap()
});

/// Tickets in the local snapshot.
pub static SNAPSHOT_TICKETS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "turnstile_snapshot_tickets",
        "Number of tickets in the local snapshot",
    )
    .unwrap()
});

/// Unsynced pending admissions.
pub static PENDING_ADMISSIONS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "turnstile_pending_admissions",
        "Number of unsynced offline admissions",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    registry.register(Box::new(SCANNING_ACTIVE.clone())).unwrap();
    registry
        .register(Box::new(SNAPSHOT_TICKETS.clone()))
        .unwrap();
    registry
        .register(Box::new(PENDING_ADMISSIONS.clone()))
        .unwrap();

    // Core metrics (scans, snapshots, sync, directory)
    for metric in turnstile_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the device's current state.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.orchestrator().status().await;
    SCANNING_ACTIVE.set(if status.is_scanning { 1 } else { 0 });
    SNAPSHOT_TICKETS.set(status.offline_ticket_count as i64);
    PENDING_ADMISSIONS.set(status.pending_count as i64);
}
