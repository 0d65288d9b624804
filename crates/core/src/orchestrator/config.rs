//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the queue orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Delay between consecutive job starts within a run (milliseconds).
    /// Job `i` starts `i * start_stagger_ms` after the run begins, so
    /// downloads overlap without opening every connection at once.
    #[serde(default = "default_start_stagger")]
    pub start_stagger_ms: u64,

    /// How long to wait for metadata resolution before degrading the
    /// display (seconds). Resolution failure never fails the job.
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout_secs: u64,

    /// Capacity of the observer event channel. A subscriber that lags
    /// further than this misses old events.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_start_stagger() -> u64 {
    500
}

fn default_metadata_timeout() -> u64 {
    15
}

fn default_event_capacity() -> usize {
    256
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            start_stagger_ms: default_start_stagger(),
            metadata_timeout_secs: default_metadata_timeout(),
            event_capacity: default_event_capacity(),
        }
    }
}
