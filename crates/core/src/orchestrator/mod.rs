//! Queue orchestrator for the acquisition pipeline.
//!
//! The orchestrator owns the job collection and drives each job through its
//! state machine by invoking stage executors:
//! - **Submission**: creates pending jobs and fires off best-effort metadata
//!   resolution.
//! - **Runs**: `start` freezes the pending set and launches one driver per
//!   job with a fixed stagger between starts; drivers then proceed
//!   independently of their siblings.
//! - **Observation**: every state or progress change is published on the
//!   event bus, along with batch-level progress signals.
//!
//! A run cannot be cancelled: once started, every captured job runs to a
//! terminal state. Failed jobs stay in the queue for inspection and manual
//! re-submission; there is no automatic retry.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::QueueOrchestrator;
pub use types::{ActiveRun, QueueError, QueueStatus};
