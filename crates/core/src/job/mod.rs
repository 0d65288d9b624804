//! Job tracking for queued media references.

mod types;

pub use types::{Job, JobState};
