//! RetrainQueue — the durable job store.
//!
//! Wraps the storage queries with artifact capture and the fixed rollback
//! plan, and routes every operation through the schema bootstrap so a fresh
//! database volume heals itself on first use.

use std::path::PathBuf;
use std::sync::Arc;

use fastbreak_core::epoch_secs;
use fastbreak_core::errors::StorageError;
use fastbreak_core::types::{
    PolicyMetrics, PolicyThresholds, RetrainJob, RetrainReason, RollbackPlan, RunDetails,
    TerminalStatus,
};
use fastbreak_storage::connection::writer::with_immediate_transaction;
use fastbreak_storage::queries::jobs::{self, NewJob};
use fastbreak_storage::DatabaseManager;

use crate::artifacts;

/// Durable FIFO-ish queue of retrain jobs.
pub struct RetrainQueue {
    db: Arc<DatabaseManager>,
    model_dir: PathBuf,
}

impl RetrainQueue {
    pub fn new(db: Arc<DatabaseManager>, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            model_dir: model_dir.into(),
        }
    }

    /// Enqueue a retrain job, capturing the current artifact listing and
    /// attaching the fixed rollback plan.
    pub fn create(
        &self,
        season: &str,
        trigger_source: &str,
        reasons: &[RetrainReason],
        metrics: &PolicyMetrics,
        thresholds: &PolicyThresholds,
    ) -> Result<RetrainJob, StorageError> {
        let artifact_snapshot = artifacts::capture_snapshot(&self.model_dir);
        let rollback_plan = RollbackPlan::default();
        let new_job = NewJob {
            season,
            trigger_source,
            reasons,
            metrics,
            thresholds,
            artifact_snapshot: &artifact_snapshot,
            rollback_plan: &rollback_plan,
            created_at: epoch_secs(),
        };

        let job = self
            .db
            .write_with_bootstrap(|conn| jobs::insert(conn, &new_job))?;
        tracing::info!(job_id = job.id, season = %job.season, "retrain job queued");
        Ok(job)
    }

    /// The most recent queued/running job for the season created within the
    /// trailing window, if any.
    pub fn find_recent_active(
        &self,
        season: &str,
        window_hours: i64,
    ) -> Result<Option<RetrainJob>, StorageError> {
        let now = epoch_secs();
        self.db
            .read_with_bootstrap(|conn| jobs::find_recent_active(conn, season, window_hours, now))
    }

    /// Exclusively claim the oldest queued job and transition it to running.
    /// Returns None immediately when nothing is claimable.
    pub fn claim_next(&self, season: Option<&str>) -> Result<Option<RetrainJob>, StorageError> {
        let now = epoch_secs();
        let claimed = self.db.write_with_bootstrap(|conn| {
            with_immediate_transaction(conn, |tx| jobs::claim_next(tx, season, now))
        })?;
        if let Some(job) = &claimed {
            tracing::info!(job_id = job.id, season = %job.season, "retrain job claimed");
        }
        Ok(claimed)
    }

    /// Finalize a running job into a terminal status, refreshing the
    /// artifact listing alongside the outcome.
    pub fn finalize(
        &self,
        job_id: i64,
        status: TerminalStatus,
        run_details: &RunDetails,
        error: Option<&str>,
    ) -> Result<RetrainJob, StorageError> {
        let artifact_snapshot = artifacts::capture_snapshot(&self.model_dir);
        let now = epoch_secs();
        let job = self.db.write_with_bootstrap(|conn| {
            jobs::finalize(
                conn,
                job_id,
                status,
                run_details,
                error,
                &artifact_snapshot,
                now,
            )
        })?;
        tracing::info!(job_id = job.id, status = job.status.as_str(), "retrain job finalized");
        Ok(job)
    }

    /// Job history for a season, most recent first.
    pub fn list(&self, season: &str, limit: usize) -> Result<Vec<RetrainJob>, StorageError> {
        self.db
            .read_with_bootstrap(|conn| jobs::list(conn, season, limit))
    }

    /// Fetch one job by id.
    pub fn find_by_id(&self, job_id: i64) -> Result<Option<RetrainJob>, StorageError> {
        self.db
            .read_with_bootstrap(|conn| jobs::find_by_id(conn, job_id))
    }
}
