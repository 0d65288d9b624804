//! Stage executor contract.
//!
//! A stage is one phase of processing for a job: fetching the source stream
//! (download) or converting it to an editor-friendly format (transcode).
//! Stage internals are external collaborators; this module defines the
//! execution contract and the progress-reporting protocol the orchestrator
//! drives them through.

mod error;
mod traits;
mod types;

pub use error::StageError;
pub use traits::StageExecutor;
pub use types::{
    output_filename, sanitized_filename, StageKind, StageOutcome, StageProgress, StageRequest,
};
