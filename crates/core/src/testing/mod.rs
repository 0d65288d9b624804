//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the external collaborator
//! traits, allowing complete queue lifecycle testing without any real
//! network or media tooling.
//!
//! # Example
//!
//! ```rust,ignore
//! use clipfetch_core::testing::{MockResolver, MockStageExecutor};
//!
//! let resolver = MockResolver::new();
//! let executor = MockStageExecutor::new();
//!
//! // Configure mock behavior
//! resolver.set_metadata("https://example.com/v/1", meta).await;
//! executor.fail_reference("https://example.com/v/2", StageKind::Download, "timeout").await;
//!
//! // Use in QueueOrchestrator...
//! ```

mod mock_resolver;
mod mock_stage;

pub use mock_resolver::MockResolver;
pub use mock_stage::{MockStageExecutor, RecordedStage};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::config::{FormatMode, Resolution, RunConfig};
    use std::path::PathBuf;

    /// Create a run config with reasonable test defaults.
    pub fn run_config(format_mode: FormatMode) -> RunConfig {
        RunConfig {
            directory: PathBuf::from("/tmp/clipfetch-test"),
            resolution: Resolution::R1080p,
            format_mode,
        }
    }

    /// Create a numbered test reference.
    pub fn reference(n: usize) -> String {
        format!("https://example.com/v/{n:04}")
    }
}
