//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Convertino server:
//! - HTTP request metrics (latency, counts, errors)
//! - Upload metrics
//! - Session entry counts (collected dynamically)
//!
//! Core metrics (discovery, conversion, export) are registered here too.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use regex_lite::Regex;
use tracing::warn;

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
            "convertino_http_request_duration_seconds",
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
        Opts::new("convertino_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "convertino_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Upload Metrics
// =============================================================================

/// Files received through batch uploads.
pub static UPLOADED_FILES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "convertino_uploaded_files_total",
        "Total files received through batch uploads",
    )
    .unwrap()
});

/// Bytes received through batch uploads.
pub static UPLOADED_BYTES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "convertino_uploaded_bytes_total",
        "Total bytes received through batch uploads",
    )
    .unwrap()
});

// =============================================================================
// Session Metrics
// =============================================================================

/// Entries of the current batch by conversion status.
pub static ENTRIES_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "convertino_entries_by_status",
            "Entries of the current batch by conversion status",
        ),
        &["status"],
    )
    .unwrap()
});

/// Entries still waiting for their format lookup.
pub static ENTRIES_DISCOVERY_PENDING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "convertino_entries_discovery_pending",
        "Entries whose format lookup has not answered yet",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Uploads
    registry
        .register(Box::new(UPLOADED_FILES_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(UPLOADED_BYTES_TOTAL.clone()))
        .unwrap();

    // Session
    registry
        .register(Box::new(ENTRIES_BY_STATUS.clone()))
        .unwrap();
    registry
        .register(Box::new(ENTRIES_DISCOVERY_PENDING.clone()))
        .unwrap();

    // Core metrics (discovery, conversion, export)
    for metric in convertino_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the session gauges reflect the current batch.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let summary = state.store().summary().await;

    for (status, count) in [
        ("idle", summary.idle),
        ("converting", summary.converting),
        ("done", summary.done),
        ("failed", summary.failed),
    ] {
        ENTRIES_BY_STATUS
            .with_label_values(&[status])
            .set(count as i64);
    }
    ENTRIES_DISCOVERY_PENDING.set(summary.discovery_pending as i64);
}

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace entry ids with a placeholder).
pub fn normalize_path(path: &str) -> String {
    NUMERIC_RE.replace_all(path, "/{id}$1").into_owned()
}
