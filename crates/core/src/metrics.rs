//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Job lifecycle (enqueued, completed, failed)
//! - Encoder (duration, timeouts)
//! - Uploads

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Job Lifecycle Metrics
// =============================================================================

/// Jobs enqueued total.
pub static JOBS_ENQUEUED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("clipbox_jobs_enqueued_total", "Total jobs enqueued").unwrap()
});

/// Jobs completed total.
pub static JOBS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clipbox_jobs_completed_total",
        "Total jobs completed successfully",
    )
    .unwrap()
});

/// Jobs failed total by phase.
pub static JOBS_FAILED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clipbox_jobs_failed_total", "Total jobs failed"),
        &["phase"], // "encode", "upload", "recovery"
    )
    .unwrap()
});

/// Jobs currently being processed.
pub static JOBS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("clipbox_jobs_active", "Jobs currently being processed").unwrap()
});

// =============================================================================
// Encoder Metrics
// =============================================================================

/// Encode duration in seconds by result.
pub static ENCODE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("clipbox_encode_duration_seconds", "Duration of encodes")
            .buckets(vec![1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["result"], // "success", "failed", "timeout"
    )
    .unwrap()
});

/// Encode timeouts total.
pub static ENCODE_TIMEOUTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clipbox_encode_timeouts_total",
        "Total encodes killed after exceeding the timeout",
    )
    .unwrap()
});

// =============================================================================
// Upload Metrics
// =============================================================================

/// Result uploads total by result.
pub static UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clipbox_uploads_total", "Total result uploads"),
        &["backend", "result"], // result: "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_ENQUEUED.clone()),
        Box::new(JOBS_COMPLETED.clone()),
        Box::new(JOBS_FAILED.clone()),
        Box::new(JOBS_ACTIVE.clone()),
        Box::new(ENCODE_DURATION.clone()),
        Box::new(ENCODE_TIMEOUTS.clone()),
        Box::new(UPLOADS_TOTAL.clone()),
    ]
}
