//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Queue (submissions, terminal jobs, runs)
//! - Stages (durations, failures)
//! - Metadata resolution

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Queue Metrics
// =============================================================================

/// Jobs submitted total.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("clipfetch_jobs_submitted_total", "Total jobs submitted").unwrap()
});

/// Jobs that reached a terminal state, by result.
pub static JOBS_COMPLETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "clipfetch_jobs_completed_total",
            "Total jobs that reached a terminal state",
        ),
        &["result"], // "finished", "failed"
    )
    .unwrap()
});

/// Runs started total.
pub static RUNS_STARTED: Lazy<IntCounter> =
    Lazy::new(|| IntCounter::new("clipfetch_runs_started_total", "Total runs started").unwrap());

/// Runs completed total.
pub static RUNS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clipfetch_runs_completed_total",
        "Total runs where every job reached a terminal state",
    )
    .unwrap()
});

// =============================================================================
// Stage Metrics
// =============================================================================

/// Stage duration in seconds, by stage kind.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "clipfetch_stage_duration_seconds",
            "Duration of stage executions",
        )
        .buckets(vec![
            1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0, 3600.0,
        ]),
        &["stage"], // "download", "transcode"
    )
    .unwrap()
});

/// Stage failures total, by stage kind.
pub static STAGE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clipfetch_stage_failures_total", "Total stage failures"),
        &["stage"], // "download", "transcode"
    )
    .unwrap()
});

// =============================================================================
// Metadata Metrics
// =============================================================================

/// Metadata lookups total, by result.
pub static METADATA_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "clipfetch_metadata_lookups_total",
            "Total metadata resolver lookups",
        ),
        &["result"], // "resolved", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Queue
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_COMPLETED.clone()),
        Box::new(RUNS_STARTED.clone()),
        Box::new(RUNS_COMPLETED.clone()),
        // Stages
        Box::new(STAGE_DURATION.clone()),
        Box::new(STAGE_FAILURES.clone()),
        // Metadata
        Box::new(METADATA_LOOKUPS.clone()),
    ]
}
