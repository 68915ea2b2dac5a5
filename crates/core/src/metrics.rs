//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Discovery (catalog lookups)
//! - Conversions (per family, per outcome)
//! - Exports
//! - Superseded responses dropped by the session store

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Discovery Metrics
// =============================================================================

/// Catalog lookups total by result.
pub static DISCOVERIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("convertino_discoveries_total", "Total format catalog lookups"),
        &["result"], // "formats", "unsupported", "failed"
    )
    .unwrap()
});

// =============================================================================
// Conversion Metrics
// =============================================================================

/// Conversions total by family and result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("convertino_conversions_total", "Total file conversions"),
        &["family", "result"], // result: "success", "failed", "unroutable"
    )
    .unwrap()
});

/// Conversion round-trip duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "convertino_conversion_duration_seconds",
            "Duration of remote conversion requests",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["family"],
    )
    .unwrap()
});

// =============================================================================
// Session Metrics
// =============================================================================

/// Responses dropped because their entry was removed or superseded.
pub static STALE_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "convertino_stale_writes_total",
            "Responses discarded because a newer request superseded them",
        ),
        &["operation"], // "discovery", "conversion"
    )
    .unwrap()
});

// =============================================================================
// Export Metrics
// =============================================================================

/// Exports total by result.
pub static EXPORTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("convertino_exports_total", "Total artifact exports"),
        &["result"], // "success", "failed", "no_result"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(DISCOVERIES_TOTAL.clone()),
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(STALE_WRITES.clone()),
        Box::new(EXPORTS_TOTAL.clone()),
    ]
}
