//! Queue orchestrator implementation.
//!
//! The orchestrator is the only writer of job state. Stage executors and the
//! metadata resolver report back through channels and return values; every
//! mutation funnels through the helpers in this file.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::events::{EventBus, QueueEvent};
use crate::job::{Job, JobState};
use crate::metrics;
use crate::progress::{self, BatchSnapshot};
use crate::resolver::{MetadataResolver, ResolverError};
use crate::stage::{output_filename, StageExecutor, StageKind, StageOutcome, StageRequest};

use super::config::OrchestratorConfig;
use super::types::{ActiveRun, QueueError, QueueStatus};

/// The queue orchestrator - owns the job collection and drives runs.
pub struct QueueOrchestrator<E>
where
    E: StageExecutor + 'static,
{
    config: OrchestratorConfig,
    resolver: Arc<dyn MetadataResolver>,
    executor: Arc<E>,

    // Runtime state
    jobs: Arc<RwLock<Vec<Job>>>,
    run: Arc<RwLock<Option<ActiveRun>>>,
    events: EventBus,
}

impl<E> QueueOrchestrator<E>
where
    E: StageExecutor + 'static,
{
    /// Create a new orchestrator.
    pub fn new(
        config: OrchestratorConfig,
        resolver: Arc<dyn MetadataResolver>,
        executor: Arc<E>,
    ) -> Self {
        let events = EventBus::new(config.event_capacity);

        Self {
            config,
            resolver,
            executor,
            jobs: Arc::new(RwLock::new(Vec::new())),
            run: Arc::new(RwLock::new(None)),
            events,
        }
    }

    /// Subscribe to queue events.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Submit a media reference, creating a pending job.
    ///
    /// Metadata resolution is requested fire-and-forget: a resolver failure
    /// degrades the title to a placeholder and nothing else.
    pub async fn submit(&self, reference: &str) -> Result<String, QueueError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(QueueError::InvalidSubmission);
        }

        let job_id = {
            let mut jobs = self.jobs.write().await;
            if jobs.iter().any(|j| j.reference == reference) {
                return Err(QueueError::DuplicateSubmission {
                    reference: reference.to_string(),
                });
            }
            let job = Job::new(reference);
            let job_id = job.id.clone();
            jobs.push(job);
            job_id
        };

        metrics::JOBS_SUBMITTED.inc();
        debug!("Submitted job {} for {}", job_id, reference);
        self.events.emit(QueueEvent::JobUpdated {
            job_id: job_id.clone(),
            state: JobState::Pending,
            progress: 0.0,
        });

        self.spawn_metadata_task(job_id.clone(), reference.to_string());

        Ok(job_id)
    }

    /// Start a run over every currently pending job.
    ///
    /// The pending set at this moment defines the run's membership; jobs
    /// submitted later wait for the next run. `config` is captured here and
    /// applied identically to all captured jobs.
    pub async fn start(&self, config: RunConfig) -> Result<String, QueueError> {
        let run_id = uuid::Uuid::new_v4().to_string();

        let scheduled: Vec<String> = {
            let mut run = self.run.write().await;
            if run.is_some() {
                return Err(QueueError::RunAlreadyActive);
            }

            let mut jobs = self.jobs.write().await;
            let mut scheduled = Vec::new();
            for job in jobs.iter_mut().filter(|j| j.state == JobState::Pending) {
                job.run_id = Some(run_id.clone());
                job.updated_at = Utc::now();
                scheduled.push(job.id.clone());
            }
            if scheduled.is_empty() {
                return Err(QueueError::EmptyQueue);
            }

            *run = Some(ActiveRun {
                id: run_id.clone(),
                config: config.clone(),
                target: scheduled.len(),
                completed: 0,
                finished: 0,
                failed: 0,
                started_at: Utc::now(),
            });
            scheduled
        };

        metrics::RUNS_STARTED.inc();
        info!("Starting run {} with {} jobs", run_id, scheduled.len());
        self.events.emit(QueueEvent::RunStarted {
            run_id: run_id.clone(),
            target: scheduled.len(),
        });
        self.events.emit(QueueEvent::BatchProgress {
            current_pct: 0.0,
            total_pct: 0.0,
            run_active: true,
        });

        for (position, job_id) in scheduled.into_iter().enumerate() {
            let delay = Duration::from_millis(self.config.start_stagger_ms * position as u64);
            let jobs = Arc::clone(&self.jobs);
            let run = Arc::clone(&self.run);
            let executor = Arc::clone(&self.executor);
            let events = self.events.clone();
            let run_config = config.clone();

            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                Self::drive_job(jobs, run, events, executor, run_config, job_id).await;
            });
        }

        Ok(run_id)
    }

    /// Remove every finished job from the queue.
    ///
    /// Failed and in-flight jobs are untouched; failed jobs stay visible for
    /// inspection. Returns the number of jobs removed.
    pub async fn clear_finished(&self) -> usize {
        let removed = {
            let mut jobs = self.jobs.write().await;
            let before = jobs.len();
            jobs.retain(|j| !matches!(j.state, JobState::Finished));
            before - jobs.len()
        };

        info!("Cleared {} finished jobs", removed);
        self.events.emit(QueueEvent::FinishedCleared { removed });

        // The display reset is deferred while a run is active so that the
        // batch total stays monotone within the run.
        let run_active = self.run.read().await.is_some();
        if !run_active {
            self.events.emit(QueueEvent::BatchProgress {
                current_pct: 0.0,
                total_pct: 0.0,
                run_active: false,
            });
        }

        removed
    }

    /// Get current queue status.
    pub async fn status(&self) -> QueueStatus {
        let mut status = QueueStatus::default();
        {
            let jobs = self.jobs.read().await;
            for job in jobs.iter() {
                match job.state {
                    JobState::Pending => status.pending_count += 1,
                    JobState::Downloading => status.downloading_count += 1,
                    JobState::Encoding => status.encoding_count += 1,
                    JobState::Finished => status.finished_count += 1,
                    JobState::Failed { .. } => status.failed_count += 1,
                }
            }
        }

        let run = self.run.read().await;
        if let Some(active) = run.as_ref() {
            status.run_active = true;
            status.target_count = active.target;
            status.completed_count = active.completed;
        }

        status
    }

    /// Snapshot of the job collection.
    pub async fn jobs(&self) -> Vec<Job> {
        self.jobs.read().await.clone()
    }

    /// Look up a single job by id.
    pub async fn job(&self, job_id: &str) -> Result<Job, QueueError> {
        self.jobs
            .read()
            .await
            .iter()
            .find(|j| j.id == job_id)
            .cloned()
            .ok_or_else(|| QueueError::JobNotFound(job_id.to_string()))
    }

    /// Recompute batch progress for the active run from the job collection.
    ///
    /// Agrees with the running counters kept in the run record; returns an
    /// empty snapshot when no run is active.
    pub async fn batch_progress(&self) -> BatchSnapshot {
        let run_id = {
            let run = self.run.read().await;
            match run.as_ref() {
                Some(active) => active.id.clone(),
                None => return BatchSnapshot::default(),
            }
        };
        let jobs = self.jobs.read().await;
        progress::aggregate(&jobs, &run_id)
    }

    /// Spawn the fire-and-forget metadata resolution task for a job.
    fn spawn_metadata_task(&self, job_id: String, reference: String) {
        let resolver = Arc::clone(&self.resolver);
        let jobs = Arc::clone(&self.jobs);
        let events = self.events.clone();
        let timeout_secs = self.config.metadata_timeout_secs;

        tokio::spawn(async move {
            let result = match timeout(
                Duration::from_secs(timeout_secs),
                resolver.resolve(&reference),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ResolverError::Timeout { secs: timeout_secs }),
            };

            match result {
                Ok(meta) => {
                    metrics::METADATA_LOOKUPS
                        .with_label_values(&["resolved"])
                        .inc();
                    let mut jobs = jobs.write().await;
                    if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
                        job.title = Some(meta.title.clone());
                        job.thumbnail = meta.thumbnail.clone();
                        job.updated_at = Utc::now();
                        events.emit(QueueEvent::MetadataResolved {
                            job_id: job_id.clone(),
                            title: meta.title,
                            thumbnail: meta.thumbnail,
                        });
                    }
                }
                Err(e) => {
                    metrics::METADATA_LOOKUPS.with_label_values(&["failed"]).inc();
                    warn!("Metadata resolution failed for {}: {}", reference, e);
                    let mut jobs = jobs.write().await;
                    if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
                        if job.title.is_none() {
                            job.title = Some(Job::UNKNOWN_TITLE.to_string());
                            job.updated_at = Utc::now();
                            events.emit(QueueEvent::MetadataResolved {
                                job_id: job_id.clone(),
                                title: Job::UNKNOWN_TITLE.to_string(),
                                thumbnail: None,
                            });
                        }
                    }
                }
            }
        });
    }

    /// Drive one job through its stages. Runs in its own task; sibling jobs
    /// never block each other.
    async fn drive_job(
        jobs: Arc<RwLock<Vec<Job>>>,
        run: Arc<RwLock<Option<ActiveRun>>>,
        events: EventBus,
        executor: Arc<E>,
        config: RunConfig,
        job_id: String,
    ) {
        if !Self::set_job_state(&jobs, &events, &job_id, JobState::Downloading).await {
            return;
        }

        let download = match Self::build_request(&jobs, &config, &job_id, StageKind::Download, None)
            .await
        {
            Some(request) => request,
            None => return,
        };

        let outcome = Self::run_stage(&jobs, &run, &events, &executor, download).await;

        match outcome {
            Ok(outcome) => {
                if config.format_mode.requires_transcode() {
                    if !Self::set_job_state(&jobs, &events, &job_id, JobState::Encoding).await {
                        return;
                    }
                    let transcode = match Self::build_request(
                        &jobs,
                        &config,
                        &job_id,
                        StageKind::Transcode,
                        outcome.output_path,
                    )
                    .await
                    {
                        Some(request) => request,
                        None => return,
                    };

                    match Self::run_stage(&jobs, &run, &events, &executor, transcode).await {
                        Ok(_) => {
                            Self::finish_job(&jobs, &run, &events, &job_id, JobState::Finished)
                                .await;
                        }
                        Err(e) => {
                            metrics::STAGE_FAILURES
                                .with_label_values(&[StageKind::Transcode.as_str()])
                                .inc();
                            warn!("Transcode failed for job {}: {}", job_id, e);
                            Self::finish_job(
                                &jobs,
                                &run,
                                &events,
                                &job_id,
                                JobState::Failed {
                                    reason: e.to_string(),
                                },
                            )
                            .await;
                        }
                    }
                } else {
                    Self::finish_job(&jobs, &run, &events, &job_id, JobState::Finished).await;
                }
            }
            Err(e) => {
                metrics::STAGE_FAILURES
                    .with_label_values(&[StageKind::Download.as_str()])
                    .inc();
                warn!("Download failed for job {}: {}", job_id, e);
                Self::finish_job(
                    &jobs,
                    &run,
                    &events,
                    &job_id,
                    JobState::Failed {
                        reason: e.to_string(),
                    },
                )
                .await;
            }
        }
    }

    /// Build the stage request for a job, reading its current display title
    /// for the destination filename.
    async fn build_request(
        jobs: &Arc<RwLock<Vec<Job>>>,
        config: &RunConfig,
        job_id: &str,
        kind: StageKind,
        input_path: Option<std::path::PathBuf>,
    ) -> Option<StageRequest> {
        let jobs = jobs.read().await;
        let job = jobs.iter().find(|j| j.id == job_id)?;
        let title = job.title.clone().unwrap_or_else(|| job.reference.clone());

        Some(StageRequest {
            job_id: job.id.clone(),
            reference: job.reference.clone(),
            kind,
            resolution: config.resolution,
            format_mode: config.format_mode,
            input_path,
            output_directory: config.directory.clone(),
            dest_filename: output_filename(&title, config.format_mode),
        })
    }

    /// Execute one stage, applying its progress stream to the job.
    ///
    /// Any progress value >= 100 marks the stage complete; events arriving
    /// after that are ignored, so a late or repeated completion signal from
    /// an executor cannot move the job backwards.
    async fn run_stage(
        jobs: &Arc<RwLock<Vec<Job>>>,
        run: &Arc<RwLock<Option<ActiveRun>>>,
        events: &EventBus,
        executor: &Arc<E>,
        request: StageRequest,
    ) -> Result<StageOutcome, crate::stage::StageError> {
        let job_id = request.job_id.clone();
        let stage_kind = request.kind;
        let started = Instant::now();

        let (tx, mut rx) = mpsc::channel(32);
        let exec = executor.execute(request, tx);
        tokio::pin!(exec);

        let mut outcome = None;
        let mut stage_complete = false;

        loop {
            tokio::select! {
                result = &mut exec, if outcome.is_none() => {
                    outcome = Some(result);
                }
                received = rx.recv() => match received {
                    Some(progress) => {
                        if stage_complete {
                            continue;
                        }
                        let percent = progress.percent.clamp(0.0, 100.0);
                        if percent >= 100.0 {
                            stage_complete = true;
                        }
                        Self::set_job_progress(jobs, run, events, &job_id, percent).await;
                    }
                    None => break,
                }
            }
        }

        let result = match outcome {
            Some(result) => result,
            // Executor dropped its sender early but is still running.
            None => exec.await,
        };

        metrics::STAGE_DURATION
            .with_label_values(&[stage_kind.as_str()])
            .observe(started.elapsed().as_secs_f64());

        result
    }

    /// Transition a job to a new in-flight state, resetting stage progress.
    /// Returns false if the job is gone or the transition is illegal.
    async fn set_job_state(
        jobs: &Arc<RwLock<Vec<Job>>>,
        events: &EventBus,
        job_id: &str,
        state: JobState,
    ) -> bool {
        let mut jobs = jobs.write().await;
        let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) else {
            warn!("Job {} vanished before stage start", job_id);
            return false;
        };
        if !job.state.can_transition_to(&state) {
            warn!(
                "Illegal transition for job {}: {} -> {}",
                job_id,
                job.state.state_type(),
                state.state_type()
            );
            return false;
        }

        debug!(
            "Job {}: {} -> {}",
            job_id,
            job.state.state_type(),
            state.state_type()
        );
        job.state = state.clone();
        job.progress = 0.0;
        job.updated_at = Utc::now();
        drop(jobs);

        events.emit(QueueEvent::JobUpdated {
            job_id: job_id.to_string(),
            state,
            progress: 0.0,
        });
        true
    }

    /// Apply a stage progress value to a job and publish it, together with
    /// the batch-level signal ("current" follows the latest event).
    async fn set_job_progress(
        jobs: &Arc<RwLock<Vec<Job>>>,
        run: &Arc<RwLock<Option<ActiveRun>>>,
        events: &EventBus,
        job_id: &str,
        percent: f32,
    ) {
        let state = {
            let mut jobs = jobs.write().await;
            let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) else {
                return;
            };
            if !job.state.is_active() {
                return;
            }
            job.progress = percent;
            job.updated_at = Utc::now();
            job.state.clone()
        };

        events.emit(QueueEvent::JobUpdated {
            job_id: job_id.to_string(),
            state,
            progress: percent,
        });

        // Batch totals are read and emitted under the run lock so observers
        // never see the total move backwards.
        let run = run.read().await;
        if let Some(active) = run.as_ref() {
            events.emit(QueueEvent::BatchProgress {
                current_pct: percent,
                total_pct: active.total_pct(),
                run_active: true,
            });
        }
    }

    /// Move a job into a terminal state and update the run accounting.
    async fn finish_job(
        jobs: &Arc<RwLock<Vec<Job>>>,
        run: &Arc<RwLock<Option<ActiveRun>>>,
        events: &EventBus,
        job_id: &str,
        state: JobState,
    ) {
        let final_progress = {
            let mut jobs = jobs.write().await;
            let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) else {
                return;
            };
            if !job.state.can_transition_to(&state) {
                warn!(
                    "Illegal terminal transition for job {}: {} -> {}",
                    job_id,
                    job.state.state_type(),
                    state.state_type()
                );
                return;
            }
            if matches!(state, JobState::Finished) {
                job.progress = 100.0;
            }
            job.state = state.clone();
            job.updated_at = Utc::now();
            job.progress
        };

        let result = state.state_type();
        metrics::JOBS_COMPLETED.with_label_values(&[result]).inc();
        info!("Job {} reached terminal state {}", job_id, result);

        events.emit(QueueEvent::JobUpdated {
            job_id: job_id.to_string(),
            state: state.clone(),
            progress: final_progress,
        });

        let mut run_guard = run.write().await;
        let Some(active) = run_guard.as_mut() else {
            return;
        };

        active.completed += 1;
        match state {
            JobState::Finished => active.finished += 1,
            JobState::Failed { .. } => active.failed += 1,
            _ => {}
        }

        if !active.is_complete() {
            events.emit(QueueEvent::BatchProgress {
                current_pct: final_progress,
                total_pct: active.total_pct(),
                run_active: true,
            });
            return;
        }

        if let Some(done) = run_guard.take() {
            metrics::RUNS_COMPLETED.inc();
            info!(
                "Run {} complete: {} finished, {} failed",
                done.id, done.finished, done.failed
            );
            events.emit(QueueEvent::RunFinished {
                run_id: done.id,
                finished: done.finished,
                failed: done.failed,
            });
            events.emit(QueueEvent::BatchProgress {
                current_pct: 0.0,
                total_pct: 100.0,
                run_active: false,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FormatMode, Resolution};
    use crate::testing::{MockResolver, MockStageExecutor};
    use std::path::PathBuf;

    fn orchestrator() -> QueueOrchestrator<MockStageExecutor> {
        QueueOrchestrator::new(
            OrchestratorConfig {
                start_stagger_ms: 1,
                metadata_timeout_secs: 1,
                event_capacity: 256,
            },
            Arc::new(MockResolver::new()),
            Arc::new(MockStageExecutor::new()),
        )
    }

    fn run_config() -> RunConfig {
        RunConfig {
            directory: PathBuf::from("/out"),
            resolution: Resolution::R1080p,
            format_mode: FormatMode::H264Cfr,
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_reference() {
        let orchestrator = orchestrator();
        assert!(matches!(
            orchestrator.submit("").await,
            Err(QueueError::InvalidSubmission)
        ));
        assert!(matches!(
            orchestrator.submit("   \t").await,
            Err(QueueError::InvalidSubmission)
        ));
        assert!(orchestrator.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_duplicate_reference() {
        let orchestrator = orchestrator();
        orchestrator.submit("https://example.com/v/1").await.unwrap();
        let result = orchestrator.submit("https://example.com/v/1").await;
        assert!(matches!(
            result,
            Err(QueueError::DuplicateSubmission { .. })
        ));
        assert_eq!(orchestrator.jobs().await.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_trims_reference() {
        let orchestrator = orchestrator();
        let job_id = orchestrator
            .submit("  https://example.com/v/1  ")
            .await
            .unwrap();
        let job = orchestrator.job(&job_id).await.unwrap();
        assert_eq!(job.reference, "https://example.com/v/1");
    }

    #[tokio::test]
    async fn test_start_with_empty_queue_is_rejected() {
        let orchestrator = orchestrator();
        assert!(matches!(
            orchestrator.start(run_config()).await,
            Err(QueueError::EmptyQueue)
        ));
    }

    #[tokio::test]
    async fn test_job_lookup_unknown_id() {
        let orchestrator = orchestrator();
        assert!(matches!(
            orchestrator.job("nope").await,
            Err(QueueError::JobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_status_counts_pending_jobs() {
        let orchestrator = orchestrator();
        orchestrator.submit("https://example.com/v/1").await.unwrap();
        orchestrator.submit("https://example.com/v/2").await.unwrap();

        let status = orchestrator.status().await;
        assert_eq!(status.pending_count, 2);
        assert!(!status.run_active);
    }
}
