//! Types for the queue orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RunConfig;

/// Errors returned by the queue orchestrator's public operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The submitted reference was empty or whitespace-only; no job was
    /// created.
    #[error("empty reference rejected")]
    InvalidSubmission,

    /// The reference is already in the queue.
    #[error("reference already queued: {reference}")]
    DuplicateSubmission { reference: String },

    /// `start` was called while a run is in progress.
    #[error("a run is already in progress")]
    RunAlreadyActive,

    /// `start` was called with no pending jobs.
    #[error("no pending jobs to start")]
    EmptyQueue,

    /// Job not found.
    #[error("job not found: {0}")]
    JobNotFound(String),
}

/// Bookkeeping for the run in progress.
///
/// `target` is frozen when the run starts; `completed` counts every job in
/// the run that reached a terminal state, failed or finished.
#[derive(Debug, Clone)]
pub struct ActiveRun {
    /// Run identifier (UUID).
    pub id: String,
    /// Output configuration captured at start, applied to every job.
    pub config: RunConfig,
    /// Number of jobs captured into the run.
    pub target: usize,
    /// Jobs that reached a terminal state so far.
    pub completed: usize,
    /// Jobs that finished successfully.
    pub finished: usize,
    /// Jobs that failed.
    pub failed: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl ActiveRun {
    /// Terminal jobs over the frozen target, as a percentage.
    pub fn total_pct(&self) -> f32 {
        if self.target == 0 {
            0.0
        } else {
            (self.completed as f32 / self.target as f32) * 100.0
        }
    }

    /// True once every captured job is terminal.
    pub fn is_complete(&self) -> bool {
        self.completed >= self.target
    }
}

/// Snapshot of the queue for status reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStatus {
    /// Whether a run is in progress.
    pub run_active: bool,
    /// Jobs captured into the active run (0 when idle).
    pub target_count: usize,
    /// Terminal jobs in the active run (0 when idle).
    pub completed_count: usize,
    /// Jobs waiting for the next run.
    pub pending_count: usize,
    /// Jobs in the download stage.
    pub downloading_count: usize,
    /// Jobs in the transcode stage.
    pub encoding_count: usize,
    /// Jobs finished successfully.
    pub finished_count: usize,
    /// Jobs that failed.
    pub failed_count: usize,
}
