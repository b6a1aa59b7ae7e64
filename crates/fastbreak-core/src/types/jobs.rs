//! Retrain job queue types: status state machine, payload columns, rows.

use serde::{Deserialize, Serialize};

use crate::errors::StorageError;

/// Retrain job lifecycle status.
///
/// Transitions are strictly forward: `Queued` → `Running` via claim,
/// `Running` → `Completed`/`Failed` via finalize. Terminal states are
/// never re-entered and jobs are never deleted — the table is the audit
/// trail of every retrain decision that was acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, StorageError> {
        match s {
            "queued" => Ok(Self::Queued),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(StorageError::Sqlite {
                message: format!("unknown job status '{other}'"),
            }),
        }
    }

    /// Queued or running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// The two statuses finalize may write. Narrowing the type keeps
/// queued/running out of the finalize path entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Completed,
    Failed,
}

impl From<TerminalStatus> for JobStatus {
    fn from(t: TerminalStatus) -> Self {
        match t {
            TerminalStatus::Completed => JobStatus::Completed,
            TerminalStatus::Failed => JobStatus::Failed,
        }
    }
}

/// Why the policy decided to retrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    AccuracyBreach,
    BrierBreach,
    NewLabelsThreshold,
}

/// A single retrain reason with its human-readable detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainReason {
    pub code: ReasonCode,
    pub detail: String,
}

/// Metrics captured by the policy at decision time.
/// `serde(default)` keeps rows written before a field existed readable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyMetrics {
    pub completed_items: i64,
    pub evaluated_predictions: i64,
    pub new_labels_pending: i64,
    pub accuracy: Option<f64>,
    pub brier_score: Option<f64>,
}

/// Thresholds captured by the policy at decision time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyThresholds {
    pub accuracy_min: f64,
    pub brier_max: f64,
    pub new_labels_min: i64,
}

/// One model artifact file observed in the model directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: i64,
}

/// Read-only listing of current model artifacts, captured at job creation
/// and refreshed at finalize, for rollback reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSnapshot {
    pub available: bool,
    pub files: Vec<ArtifactFile>,
}

/// The fixed rollback plan attached to every retrain job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RollbackPlan {
    pub strategy: String,
    pub criteria: Vec<String>,
}

impl Default for RollbackPlan {
    fn default() -> Self {
        Self {
            strategy: "revert to previous artifact".to_string(),
            criteria: vec![
                "accuracy regression > 0.03".to_string(),
                "brier regression > 0.02".to_string(),
            ],
        }
    }
}

/// How a processed job was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Simulate,
    Execute,
}

/// Outcome payload written by the worker at finalize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDetails {
    pub mode: RunMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_summary: Option<super::training::TrainingSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RunDetails {
    /// Simulate-mode details: validates queue wiring without training cost.
    pub fn simulate() -> Self {
        Self {
            mode: RunMode::Simulate,
            training_summary: None,
            note: Some("training skipped; run validates job lifecycle".to_string()),
        }
    }
}

/// A retrain job row.
#[derive(Debug, Clone)]
pub struct RetrainJob {
    pub id: i64,
    pub season: String,
    pub status: JobStatus,
    pub trigger_source: String,
    pub reasons: Vec<RetrainReason>,
    pub metrics: PolicyMetrics,
    pub thresholds: Option<PolicyThresholds>,
    pub artifact_snapshot: ArtifactSnapshot,
    pub rollback_plan: RollbackPlan,
    pub run_details: Option<RunDetails>,
    pub error: Option<String>,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub updated_at: i64,
}
