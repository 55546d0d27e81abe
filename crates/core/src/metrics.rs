//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Scans (by outcome) and accepted check-ins (by mode)
//! - Snapshot lifecycle (downloads, clears, dropped pending admissions)
//! - Sync runs (results, accepted, conflicts, integrity errors)
//! - Directory service calls

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Scan Metrics
// =============================================================================

/// Scans total by outcome.
pub static SCANS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("turnstile_scans_total", "Total scans processed"),
        &["result"], // "success" or a failure kind
    )
    .unwrap()
});

/// Accepted check-ins by mode.
pub static CHECKINS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("turnstile_checkins_total", "Total accepted check-ins"),
        &["mode"], // "online", "offline"
    )
    .unwrap()
});

// =============================================================================
// Snapshot Metrics
// =============================================================================

/// Snapshot downloads total.
pub static SNAPSHOT_DOWNLOADS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "turnstile_snapshot_downloads_total",
        "Total snapshot downloads",
    )
    .unwrap()
});

/// Snapshot clears total.
pub static SNAPSHOT_CLEARS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("turnstile_snapshot_clears_total", "Total snapshot clears").unwrap()
});

/// Unsynced pending admissions discarded by clears.
pub static PENDING_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "turnstile_pending_dropped_total",
        "Total unsynced admissions discarded by offline data clears",
    )
    .unwrap()
});

// =============================================================================
// Sync Metrics
// =============================================================================

/// Sync runs total by result.
pub static SYNC_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("turnstile_sync_runs_total", "Total sync drains"),
        &["result"], // "completed", "interrupted"
    )
    .unwrap()
});

/// Pending admissions acknowledged by the backend.
pub static SYNC_ACCEPTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "turnstile_sync_accepted_total",
        "Total pending admissions acknowledged by the directory",
    )
    .unwrap()
});

/// Sync conflicts total.
pub static SYNC_CONFLICTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "turnstile_sync_conflicts_total",
        "Total pending admissions rejected as already consumed",
    )
    .unwrap()
});

/// Data-integrity errors total.
pub static SYNC_INTEGRITY_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "turnstile_sync_integrity_errors_total",
        "Total pending admissions dropped as data-integrity errors",
    )
    .unwrap()
});

// =============================================================================
// Directory Service Metrics
// =============================================================================

/// Directory requests total.
pub static DIRECTORY_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "turnstile_directory_requests_total",
            "Total ticket directory requests",
        ),
        &["operation", "status"], // status: "success", "conflict", "error"
    )
    .unwrap()
});

/// Directory request duration.
pub static DIRECTORY_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "turnstile_directory_request_duration_seconds",
            "Duration of ticket directory requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Scans
        Box::new(SCANS_TOTAL.clone()),
        Box::new(CHECKINS_TOTAL.clone()),
        // Snapshots
        Box::new(SNAPSHOT_DOWNLOADS.clone()),
        Box::new(SNAPSHOT_CLEARS.clone()),
        Box::new(PENDING_DROPPED.clone()),
        // Sync
        Box::new(SYNC_RUNS.clone()),
        Box::new(SYNC_ACCEPTED.clone()),
        Box::new(SYNC_CONFLICTS.clone()),
        Box::new(SYNC_INTEGRITY_ERRORS.clone()),
        // Directory
        Box::new(DIRECTORY_REQUESTS.clone()),
        Box::new(DIRECTORY_REQUEST_DURATION.clone()),
    ]
}
