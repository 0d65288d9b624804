//! Core job data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current state of a job.
///
/// State machine flow:
/// ```text
/// Pending -> Downloading -> Encoding -> Finished
///                 |    \________|________/
///                 v             v
///               Failed       Finished (passthrough skips Encoding)
/// ```
///
/// Transitions only move forward; `Finished` and `Failed` are absorbing.
/// `Failed` is reachable from `Downloading` and `Encoding` only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobState {
    /// Job created, waiting for the next run to pick it up.
    Pending,

    /// Download stage is running.
    Downloading,

    /// Transcode stage is running.
    Encoding,

    /// Job completed successfully (terminal).
    Finished,

    /// Job failed during a stage (terminal).
    Failed {
        /// Opaque failure reason reported by the stage executor.
        reason: String,
    },
}

impl JobState {
    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Finished | JobState::Failed { .. })
    }

    /// Returns true if a stage is currently running for this job.
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Downloading | JobState::Encoding)
    }

    /// Returns true if `next` is a legal transition from this state.
    pub fn can_transition_to(&self, next: &JobState) -> bool {
        match (self, next) {
            (JobState::Pending, JobState::Downloading) => true,
            (JobState::Downloading, JobState::Encoding) => true,
            (JobState::Downloading, JobState::Finished) => true,
            (JobState::Downloading, JobState::Failed { .. }) => true,
            (JobState::Encoding, JobState::Finished) => true,
            (JobState::Encoding, JobState::Failed { .. }) => true,
            _ => false,
        }
    }

    /// Returns the state type as a string (for filtering and display).
    pub fn state_type(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Downloading => "downloading",
            JobState::Encoding => "encoding",
            JobState::Finished => "finished",
            JobState::Failed { .. } => "failed",
        }
    }
}

/// A queued media reference and its processing state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    /// Unique identifier (UUID).
    pub id: String,

    /// The source URL or reference string, immutable after creation.
    pub reference: String,

    /// Display title, populated once the metadata resolver completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Thumbnail URL, populated once the metadata resolver completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// Current state.
    pub state: JobState,

    /// Stage progress (0.0-100.0), meaningful only while a stage is running.
    /// A new stage starts back at 0.
    pub progress: f32,

    /// Run this job was captured into, set when a run starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    /// When the job was created.
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp (state, progress, or metadata).
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Placeholder title shown while metadata resolution is in flight.
    pub const RESOLVING_TITLE: &'static str = "Fetching info...";

    /// Placeholder title used when metadata resolution fails.
    pub const UNKNOWN_TITLE: &'static str = "Unknown title";

    /// Creates a new pending job for the given reference.
    pub fn new(reference: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            reference: reference.into(),
            title: None,
            thumbnail: None,
            state: JobState::Pending,
            progress: 0.0,
            run_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the title to display, falling back to the resolving placeholder.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(Self::RESOLVING_TITLE)
    }

    /// Returns true if this job belongs to the given run.
    pub fn in_run(&self, run_id: &str) -> bool {
        self.run_id.as_deref() == Some(run_id)
    }
}
