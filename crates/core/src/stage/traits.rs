//! Trait definition for stage executors.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::StageError;
use super::types::{StageOutcome, StageProgress, StageRequest};

/// Runs one pipeline stage for one job.
///
/// Progress streams over the channel while the stage runs; the returned
/// `Result` is the terminal event. If the receiver is dropped, execution
/// continues without progress reporting.
#[async_trait]
pub trait StageExecutor: Send + Sync {
    /// Returns the name of this executor implementation.
    fn name(&self) -> &str;

    /// Validates that the executor is properly configured and ready.
    async fn validate(&self) -> Result<(), StageError>;

    /// Executes a stage, reporting progress through `progress_tx`.
    async fn execute(
        &self,
        request: StageRequest,
        progress_tx: mpsc::Sender<StageProgress>,
    ) -> Result<StageOutcome, StageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FormatMode, Resolution};
    use crate::stage::StageKind;
    use std::path::PathBuf;

    struct InstantExecutor;

    #[async_trait]
    impl StageExecutor for InstantExecutor {
        fn name(&self) -> &str {
            "instant"
        }

        async fn validate(&self) -> Result<(), StageError> {
            Ok(())
        }

        async fn execute(
            &self,
            request: StageRequest,
            progress_tx: mpsc::Sender<StageProgress>,
        ) -> Result<StageOutcome, StageError> {
            let _ = progress_tx
                .send(StageProgress {
                    job_id: request.job_id.clone(),
                    kind: request.kind,
                    percent: 100.0,
                })
                .await;
            Ok(StageOutcome {
                output_path: Some(request.output_directory.join(&request.dest_filename)),
            })
        }
    }

    fn request(kind: StageKind) -> StageRequest {
        StageRequest {
            job_id: "job-1".to_string(),
            reference: "https://example.com/v/1".to_string(),
            kind,
            resolution: Resolution::R1080p,
            format_mode: FormatMode::H264Cfr,
            input_path: None,
            output_directory: PathBuf::from("/out"),
            dest_filename: "clip_CFR.mp4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_execute_reports_progress_and_outcome() {
        let executor = InstantExecutor;
        let (tx, mut rx) = mpsc::channel(4);

        let outcome = executor.execute(request(StageKind::Download), tx).await.unwrap();
        assert_eq!(
            outcome.output_path,
            Some(PathBuf::from("/out/clip_CFR.mp4"))
        );

        let progress = rx.recv().await.unwrap();
        assert_eq!(progress.percent, 100.0);
        assert_eq!(progress.kind, StageKind::Download);
    }

    #[tokio::test]
    async fn test_execute_with_dropped_receiver() {
        let executor = InstantExecutor;
        let (tx, rx) = mpsc::channel(4);
        drop(rx);

        // Send errors inside the executor must not fail the stage.
        let outcome = executor.execute(request(StageKind::Transcode), tx).await;
        assert!(outcome.is_ok());
    }
}
