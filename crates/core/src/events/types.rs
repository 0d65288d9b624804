//! Event types published by the queue orchestrator.

use serde::{Deserialize, Serialize};

use crate::job::JobState;

/// An observable change in the queue.
///
/// Events for a single job arrive in the order its transitions happened;
/// no ordering is guaranteed across different jobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A job's state or stage progress changed.
    JobUpdated {
        job_id: String,
        state: JobState,
        progress: f32,
    },

    /// Display metadata arrived for a job.
    MetadataResolved {
        job_id: String,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thumbnail: Option<String>,
    },

    /// Batch-level progress signal.
    BatchProgress {
        /// Stage progress of the most recently updated in-flight job.
        current_pct: f32,
        /// Terminal jobs over the run's frozen target, as a percentage.
        total_pct: f32,
        /// Whether a run is in progress.
        run_active: bool,
    },

    /// A run started with the given frozen job set size.
    RunStarted { run_id: String, target: usize },

    /// Every job in the run reached a terminal state.
    RunFinished {
        run_id: String,
        finished: usize,
        failed: usize,
    },

    /// Finished jobs were swept from the queue.
    FinishedCleared { removed: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_updated_serialization() {
        let event = QueueEvent::JobUpdated {
            job_id: "job-1".to_string(),
            state: JobState::Downloading,
            progress: 42.5,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"job_updated\""));
        assert!(json.contains("\"job_id\":\"job-1\""));

        let parsed: QueueEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_batch_progress_serialization() {
        let event = QueueEvent::BatchProgress {
            current_pct: 80.0,
            total_pct: 33.333,
            run_active: true,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"batch_progress\""));
        assert!(json.contains("\"run_active\":true"));
    }

    #[test]
    fn test_failed_state_carries_reason() {
        let event = QueueEvent::JobUpdated {
            job_id: "job-2".to_string(),
            state: JobState::Failed {
                reason: "network timeout".to_string(),
            },
            progress: 37.0,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("network timeout"));
    }
}
