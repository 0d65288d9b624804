//! Error types for stage execution.

use thiserror::Error;

/// Errors that can occur while running a stage.
///
/// The reason text is opaque to the orchestrator: it is surfaced to
/// observers verbatim and never interpreted or retried.
#[derive(Debug, Error)]
pub enum StageError {
    /// The stage failed for a backend-specific reason.
    #[error("{reason}")]
    Failed { reason: String },

    /// I/O error while running the stage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StageError {
    /// Creates a new failure with the given reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}
