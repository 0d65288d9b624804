//! Batch progress aggregation.
//!
//! Progress is a pure function of the job collection: no hidden counters,
//! so a batch snapshot can be recomputed at any time and compared against
//! the orchestrator's running totals.

use serde::{Deserialize, Serialize};

use crate::job::Job;

/// Aggregated progress for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSnapshot {
    /// Stage progress of the most recently updated in-flight job, 0 when
    /// nothing is in flight.
    pub current_pct: f32,
    /// Terminal jobs over the run's job count, as a percentage.
    pub total_pct: f32,
    /// Jobs in the run that reached a terminal state.
    pub completed: usize,
    /// Total jobs captured into the run.
    pub target: usize,
}

/// Recomputes batch progress for the given run from the job collection.
///
/// "Current" follows the source's last-event-wins semantics: under
/// concurrent staggered jobs the winner depends on timing, but for a fixed
/// snapshot the `updated_at` ordering makes the result deterministic.
pub fn aggregate(jobs: &[Job], run_id: &str) -> BatchSnapshot {
    let run_jobs: Vec<&Job> = jobs.iter().filter(|j| j.in_run(run_id)).collect();

    let target = run_jobs.len();
    let completed = run_jobs.iter().filter(|j| j.state.is_terminal()).count();

    let total_pct = if target == 0 {
        0.0
    } else {
        (completed as f32 / target as f32) * 100.0
    };

    let current_pct = run_jobs
        .iter()
        .filter(|j| j.state.is_active())
        .max_by_key(|j| j.updated_at)
        .map(|j| j.progress)
        .unwrap_or(0.0);

    BatchSnapshot {
        current_pct,
        total_pct,
        completed,
        target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobState;
    use chrono::Duration;

    fn run_job(run_id: &str, state: JobState, progress: f32, updated_offset_ms: i64) -> Job {
        let mut job = Job::new("https://example.com/v/x");
        job.run_id = Some(run_id.to_string());
        job.state = state;
        job.progress = progress;
        job.updated_at = job.created_at + Duration::milliseconds(updated_offset_ms);
        job
    }

    #[test]
    fn test_empty_collection() {
        let snapshot = aggregate(&[], "run-1");
        assert_eq!(snapshot, BatchSnapshot::default());
    }

    #[test]
    fn test_jobs_outside_run_are_ignored() {
        let jobs = vec![
            run_job("run-1", JobState::Finished, 100.0, 0),
            run_job("run-2", JobState::Finished, 100.0, 0),
            Job::new("https://example.com/v/pending"),
        ];

        let snapshot = aggregate(&jobs, "run-1");
        assert_eq!(snapshot.target, 1);
        assert_eq!(snapshot.completed, 1);
        assert_eq!(snapshot.total_pct, 100.0);
    }

    #[test]
    fn test_total_counts_failed_as_terminal() {
        let jobs = vec![
            run_job("run-1", JobState::Finished, 100.0, 0),
            run_job(
                "run-1",
                JobState::Failed {
                    reason: "network timeout".to_string(),
                },
                37.0,
                1,
            ),
            run_job("run-1", JobState::Downloading, 50.0, 2),
            run_job("run-1", JobState::Pending, 0.0, 3),
        ];

        let snapshot = aggregate(&jobs, "run-1");
        assert_eq!(snapshot.target, 4);
        assert_eq!(snapshot.completed, 2);
        assert_eq!(snapshot.total_pct, 50.0);
    }

    #[test]
    fn test_current_is_latest_updated_active_job() {
        let jobs = vec![
            run_job("run-1", JobState::Downloading, 80.0, 0),
            run_job("run-1", JobState::Encoding, 25.0, 10),
            run_job("run-1", JobState::Finished, 100.0, 20),
        ];

        // The finished job updated last, but only active jobs count for
        // "current"; of those the encoder updated most recently.
        let snapshot = aggregate(&jobs, "run-1");
        assert_eq!(snapshot.current_pct, 25.0);
    }

    #[test]
    fn test_current_zero_when_nothing_in_flight() {
        let jobs = vec![
            run_job("run-1", JobState::Finished, 100.0, 0),
            run_job("run-1", JobState::Pending, 0.0, 1),
        ];

        let snapshot = aggregate(&jobs, "run-1");
        assert_eq!(snapshot.current_pct, 0.0);
    }

    #[test]
    fn test_total_is_exact_at_every_terminal_count() {
        for terminal in 0..=4usize {
            let mut jobs = Vec::new();
            for i in 0..4 {
                let state = if i < terminal {
                    JobState::Finished
                } else {
                    JobState::Downloading
                };
                jobs.push(run_job("run-1", state, 10.0, i as i64));
            }
            let snapshot = aggregate(&jobs, "run-1");
            assert_eq!(snapshot.total_pct, terminal as f32 / 4.0 * 100.0);
        }
    }
}
