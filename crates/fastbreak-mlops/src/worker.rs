//! RetrainWorker — claims one queued job, runs or simulates training, and
//! finalizes with results or failure.

use std::sync::Arc;

use fastbreak_core::epoch_secs;
use fastbreak_core::errors::WorkerError;
use fastbreak_core::traits::Trainer;
use fastbreak_core::types::{
    AuditStatus, RetrainJob, RunDetails, RunMode, TerminalStatus, TrainingSummary,
};
use fastbreak_storage::queries::audit;
use fastbreak_storage::DatabaseManager;
use serde::Serialize;

use crate::predictor::PredictorHandle;
use crate::queue::RetrainQueue;

const AUDIT_MODULE: &str = "retrain_worker";

/// Outcome of one worker tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Noop,
    Completed,
    Failed,
}

/// Structured result of `process_next`. A training failure lands here as
/// `Failed` with the finalized job attached — it is not an error.
#[derive(Debug, Clone)]
pub struct WorkerOutcome {
    pub status: WorkerStatus,
    pub message: String,
    pub job: Option<RetrainJob>,
    pub run_details: Option<RunDetails>,
}

/// Processes queued retrain jobs one at a time.
pub struct RetrainWorker<T> {
    db: Arc<DatabaseManager>,
    queue: RetrainQueue,
    trainer: T,
    predictor: Option<Arc<PredictorHandle>>,
}

impl<T: Trainer> RetrainWorker<T> {
    pub fn new(db: Arc<DatabaseManager>, queue: RetrainQueue, trainer: T) -> Self {
        Self {
            db,
            queue,
            trainer,
            predictor: None,
        }
    }

    /// Attach the serving-path predictor handle; successful execute-mode
    /// runs mark it stale so new artifacts get loaded.
    pub fn with_predictor(mut self, predictor: Arc<PredictorHandle>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    /// Claim and process the oldest queued job.
    ///
    /// `execute=false` completes the job with a simulation marker — safe for
    /// first-run validation of the queue wiring. `execute=true` invokes the
    /// training routine; the call runs outside any transaction or lock.
    /// A failed job is never auto-retried — a fresh policy evaluation must
    /// create a new one.
    pub fn process_next(
        &self,
        season: Option<&str>,
        execute: bool,
    ) -> Result<WorkerOutcome, WorkerError> {
        let Some(job) = self.queue.claim_next(season)? else {
            return Ok(WorkerOutcome {
                status: WorkerStatus::Noop,
                message: "no queued retrain jobs available".to_string(),
                job: None,
                run_details: None,
            });
        };

        let attempt = if execute {
            self.trainer.train(&job.season).map(|output| RunDetails {
                mode: RunMode::Execute,
                training_summary: Some(TrainingSummary::from_output(&output)),
                note: None,
            })
        } else {
            Ok(RunDetails::simulate())
        };

        match attempt {
            Ok(run_details) => {
                let finalized =
                    self.queue
                        .finalize(job.id, TerminalStatus::Completed, &run_details, None)?;
                if execute {
                    if let Some(predictor) = &self.predictor {
                        predictor.mark_stale();
                    }
                }
                self.record_audit(&finalized, execute, run_details.mode, None)?;
                Ok(WorkerOutcome {
                    status: WorkerStatus::Completed,
                    message: "retrain job processed successfully".to_string(),
                    job: Some(finalized),
                    run_details: Some(run_details),
                })
            }
            Err(training_error) => {
                let message = training_error.to_string();
                tracing::warn!(
                    job_id = job.id,
                    season = %job.season,
                    error = %message,
                    "training failed; finalizing job as failed"
                );
                let run_details = RunDetails {
                    mode: if execute {
                        RunMode::Execute
                    } else {
                        RunMode::Simulate
                    },
                    training_summary: None,
                    note: None,
                };
                let finalized = self.queue.finalize(
                    job.id,
                    TerminalStatus::Failed,
                    &run_details,
                    Some(&message),
                )?;
                self.record_audit(&finalized, execute, run_details.mode, Some(&message))?;
                Ok(WorkerOutcome {
                    status: WorkerStatus::Failed,
                    message: format!("retrain job failed: {message}"),
                    job: Some(finalized),
                    run_details: None,
                })
            }
        }
    }

    fn record_audit(
        &self,
        job: &RetrainJob,
        execute: bool,
        mode: RunMode,
        error: Option<&str>,
    ) -> Result<(), WorkerError> {
        let status = if error.is_some() {
            AuditStatus::Failed
        } else {
            AuditStatus::Success
        };
        let details = serde_json::json!({
            "job_id": job.id,
            "season": job.season,
            "execute": execute,
            "mode": mode,
        });
        self.db.write_with_bootstrap(|conn| {
            audit::insert(conn, epoch_secs(), AUDIT_MODULE, status, 1, error, &details)
        })?;
        Ok(())
    }
}
