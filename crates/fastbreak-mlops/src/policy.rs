//! RetrainPolicy — decides whether retraining is warranted and coordinates
//! enqueue with duplicate suppression.

use std::sync::Arc;

use fastbreak_core::config::MlopsConfig;
use fastbreak_core::epoch_secs;
use fastbreak_core::errors::{PolicyError, StorageError};
use fastbreak_core::traits::MetricsSource;
use fastbreak_core::types::{
    AuditStatus, PolicyMetrics, PolicyThresholds, ReasonCode, RetrainJob, RetrainReason,
};
use fastbreak_storage::queries::audit;
use fastbreak_storage::DatabaseManager;
use serde::Serialize;

use crate::metrics::compute_metrics;
use crate::queue::RetrainQueue;

const AUDIT_MODULE: &str = "retrain_policy";
const TRIGGER_SOURCE: &str = "policy";

/// What the evaluation decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyAction {
    DryRunNoop,
    Noop,
    AlreadyQueued,
    QueuedRetrain,
}

impl PolicyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DryRunNoop => "dry-run-noop",
            Self::Noop => "noop",
            Self::AlreadyQueued => "already-queued",
            Self::QueuedRetrain => "queued-retrain",
        }
    }
}

/// What actually happened on the queue side of a decision.
#[derive(Debug, Clone, Default)]
pub struct ExecutionBlock {
    pub duplicate_guard_triggered: bool,
    pub retrain_job: Option<RetrainJob>,
    pub rollback_strategy: Option<String>,
}

/// The full decision payload.
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub season: String,
    pub dry_run: bool,
    pub should_retrain: bool,
    pub action: PolicyAction,
    pub reasons: Vec<RetrainReason>,
    pub metrics: PolicyMetrics,
    pub thresholds: PolicyThresholds,
    pub execution: ExecutionBlock,
}

/// Evaluates retrain need for a season and, outside dry-run, enqueues
/// through the duplicate guard.
pub struct RetrainPolicy<S> {
    db: Arc<DatabaseManager>,
    source: S,
    queue: RetrainQueue,
    config: MlopsConfig,
}

impl<S: MetricsSource> RetrainPolicy<S> {
    pub fn new(
        db: Arc<DatabaseManager>,
        source: S,
        queue: RetrainQueue,
        config: MlopsConfig,
    ) -> Self {
        Self {
            db,
            source,
            queue,
            config,
        }
    }

    /// Evaluate whether retraining is warranted.
    ///
    /// Dry-run evaluations never touch the queue, whatever the verdict.
    pub fn evaluate(&self, season: &str, dry_run: bool) -> Result<PolicyDecision, PolicyError> {
        let now = epoch_secs();
        let model_metrics = compute_metrics(&self.source, season, now)?;
        let completed_items = self.source.completed_items(season)? as i64;
        let evaluated_predictions = model_metrics.evaluated_predictions;
        let new_labels_pending = (completed_items - evaluated_predictions).max(0);

        let thresholds = self.config.policy_thresholds();
        let mut reasons = Vec::new();

        if let Some(accuracy) = model_metrics.accuracy {
            if accuracy < thresholds.accuracy_min {
                reasons.push(RetrainReason {
                    code: ReasonCode::AccuracyBreach,
                    detail: format!("accuracy {accuracy:.3} < {:.3}", thresholds.accuracy_min),
                });
            }
        }
        if let Some(brier) = model_metrics.brier_score {
            if brier > thresholds.brier_max {
                reasons.push(RetrainReason {
                    code: ReasonCode::BrierBreach,
                    detail: format!("brier {brier:.3} > {:.3}", thresholds.brier_max),
                });
            }
        }
        if new_labels_pending >= thresholds.new_labels_min {
            reasons.push(RetrainReason {
                code: ReasonCode::NewLabelsThreshold,
                detail: format!(
                    "{new_labels_pending} new labels >= {}",
                    thresholds.new_labels_min
                ),
            });
        }

        let should_retrain = !reasons.is_empty();
        let metrics = PolicyMetrics {
            completed_items,
            evaluated_predictions,
            new_labels_pending,
            accuracy: model_metrics.accuracy,
            brier_score: model_metrics.brier_score,
        };

        let (action, execution) = if dry_run {
            (PolicyAction::DryRunNoop, ExecutionBlock::default())
        } else if !should_retrain {
            (PolicyAction::Noop, ExecutionBlock::default())
        } else {
            self.coordinate_enqueue(season, &reasons, &metrics, &thresholds)?
        };

        tracing::info!(
            season = %season,
            dry_run,
            should_retrain,
            action = action.as_str(),
            "retrain policy evaluated"
        );

        let status = if should_retrain {
            AuditStatus::Degraded
        } else {
            AuditStatus::Success
        };
        let audit_details = serde_json::json!({
            "season": season,
            "dry_run": dry_run,
            "action": action,
            "reasons": reasons,
            "thresholds": thresholds,
        });
        self.db.write_with_bootstrap(|conn| {
            audit::insert(
                conn,
                now,
                AUDIT_MODULE,
                status,
                new_labels_pending,
                None,
                &audit_details,
            )
        })?;

        Ok(PolicyDecision {
            season: season.to_string(),
            dry_run,
            should_retrain,
            action,
            reasons,
            metrics,
            thresholds,
            execution,
        })
    }

    /// The duplicate guard plus enqueue. The window check runs first; a
    /// create that still loses the race to the one-active-per-season index
    /// resolves to the already-queued branch instead of an error.
    fn coordinate_enqueue(
        &self,
        season: &str,
        reasons: &[RetrainReason],
        metrics: &PolicyMetrics,
        thresholds: &PolicyThresholds,
    ) -> Result<(PolicyAction, ExecutionBlock), PolicyError> {
        let window = self.config.policy.duplicate_window_hours;

        if let Some(active) = self.queue.find_recent_active(season, window)? {
            tracing::info!(
                season = %season,
                job_id = active.id,
                "duplicate guard: active retrain job already queued"
            );
            return Ok((
                PolicyAction::AlreadyQueued,
                ExecutionBlock {
                    duplicate_guard_triggered: true,
                    retrain_job: Some(active),
                    rollback_strategy: None,
                },
            ));
        }

        match self
            .queue
            .create(season, TRIGGER_SOURCE, reasons, metrics, thresholds)
        {
            Ok(job) => {
                let rollback_strategy = Some(job.rollback_plan.strategy.clone());
                Ok((
                    PolicyAction::QueuedRetrain,
                    ExecutionBlock {
                        duplicate_guard_triggered: false,
                        retrain_job: Some(job),
                        rollback_strategy,
                    },
                ))
            }
            Err(StorageError::DuplicateActiveJob { .. }) => {
                let active = self.queue.find_recent_active(season, window)?;
                Ok((
                    PolicyAction::AlreadyQueued,
                    ExecutionBlock {
                        duplicate_guard_triggered: true,
                        retrain_job: active,
                        rollback_strategy: None,
                    },
                ))
            }
            Err(e) => Err(e.into()),
        }
    }
}
