//! Mock stage executor for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::stage::{
    StageError, StageExecutor, StageKind, StageOutcome, StageProgress, StageRequest,
};

/// A recorded stage execution for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedStage {
    /// The request that was executed.
    pub request: StageRequest,
    /// Whether the stage succeeded.
    pub success: bool,
}

/// Mock implementation of the StageExecutor trait.
///
/// Provides controllable behavior for testing:
/// - Track stage executions for assertions
/// - Per-reference failure injection with opaque reasons
/// - Simulated stage duration and stepped progress reporting
#[derive(Debug, Clone)]
pub struct MockStageExecutor {
    /// Recorded executions.
    executions: Arc<RwLock<Vec<RecordedStage>>>,
    /// Simulated stage duration in milliseconds.
    stage_duration_ms: Arc<RwLock<u64>>,
    /// Number of progress events sent per successful stage.
    progress_steps: Arc<RwLock<u32>>,
    /// Failures by (reference, stage kind).
    failures: Arc<RwLock<HashMap<(String, StageKind), String>>>,
}

impl Default for MockStageExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStageExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        Self {
            executions: Arc::new(RwLock::new(Vec::new())),
            stage_duration_ms: Arc::new(RwLock::new(20)),
            progress_steps: Arc::new(RwLock::new(4)),
            failures: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Set the simulated duration of one stage.
    pub async fn set_stage_duration(&self, duration: Duration) {
        *self.stage_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Set how many progress events a successful stage sends.
    pub async fn set_progress_steps(&self, steps: u32) {
        *self.progress_steps.write().await = steps.max(1);
    }

    /// Make the given stage fail for a reference with an opaque reason.
    pub async fn fail_reference(
        &self,
        reference: impl Into<String>,
        kind: StageKind,
        reason: impl Into<String>,
    ) {
        self.failures
            .write()
            .await
            .insert((reference.into(), kind), reason.into());
    }

    /// Get all recorded executions.
    pub async fn recorded_executions(&self) -> Vec<RecordedStage> {
        self.executions.read().await.clone()
    }

    /// Number of executions of the given stage kind.
    pub async fn execution_count(&self, kind: StageKind) -> usize {
        self.executions
            .read()
            .await
            .iter()
            .filter(|e| e.request.kind == kind)
            .count()
    }

    /// Clear recorded executions.
    pub async fn clear_recorded(&self) {
        self.executions.write().await.clear();
    }

    async fn record(&self, request: &StageRequest, success: bool) {
        self.executions.write().await.push(RecordedStage {
            request: request.clone(),
            success,
        });
    }
}

#[async_trait]
impl StageExecutor for MockStageExecutor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn validate(&self) -> Result<(), StageError> {
        Ok(())
    }

    async fn execute(
        &self,
        request: StageRequest,
        progress_tx: mpsc::Sender<StageProgress>,
    ) -> Result<StageOutcome, StageError> {
        let injected = self
            .failures
            .read()
            .await
            .get(&(request.reference.clone(), request.kind))
            .cloned();

        if let Some(reason) = injected {
            self.record(&request, false).await;
            return Err(StageError::failed(reason));
        }

        self.record(&request, true).await;

        let duration_ms = *self.stage_duration_ms.read().await;
        let steps = *self.progress_steps.read().await;
        let step_duration = duration_ms / steps as u64;

        for i in 1..=steps {
            let percent = (i as f32 / steps as f32) * 100.0;
            let _ = progress_tx
                .send(StageProgress {
                    job_id: request.job_id.clone(),
                    kind: request.kind,
                    percent,
                })
                .await;

            if step_duration > 0 {
                tokio::time::sleep(Duration::from_millis(step_duration)).await;
            }
        }

        let output_path = match request.kind {
            StageKind::Download => request
                .output_directory
                .join(format!("temp_{}.mkv", request.job_id)),
            StageKind::Transcode => request.output_directory.join(&request.dest_filename),
        };

        Ok(StageOutcome {
            output_path: Some(output_path),
        })
    }
}
