//! Core library for clipfetch: a media acquisition and conversion pipeline
//! for editing workflows.
//!
//! Callers submit media references, start a batch run with a captured output
//! configuration, and observe per-job and batch progress on the event bus.
//! The download and transcode stages and the metadata resolver are external
//! collaborators behind traits; this crate owns the job state machine, the
//! stagger-based run scheduling, and progress aggregation.

pub mod config;
pub mod events;
pub mod job;
pub mod metrics;
pub mod orchestrator;
pub mod progress;
pub mod resolver;
pub mod stage;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FormatMode,
    Resolution, RunConfig,
};
pub use events::{EventBus, QueueEvent};
pub use job::{Job, JobState};
pub use orchestrator::{
    ActiveRun, OrchestratorConfig, QueueError, QueueOrchestrator, QueueStatus,
};
pub use progress::{aggregate, BatchSnapshot};
pub use resolver::{MetadataResolver, ResolvedMetadata, ResolverError};
pub use stage::{
    output_filename, sanitized_filename, StageError, StageExecutor, StageKind, StageOutcome,
    StageProgress, StageRequest,
};
