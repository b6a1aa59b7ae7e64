//! Monitoring snapshot, alert, and escalation types.

use serde::{Deserialize, Serialize};

/// Point-in-time model quality and data freshness metrics for a season.
///
/// `accuracy` and `brier_score` are `None` when no evaluated predictions
/// exist — never NaN, never a divide-by-zero. Freshness fields are `None`
/// when the underlying timestamp has never been observed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub evaluated_predictions: i64,
    pub accuracy: Option<f64>,
    pub brier_score: Option<f64>,
    pub latest_game_date: Option<i64>,
    pub latest_pipeline_sync: Option<i64>,
    pub game_data_freshness_days: Option<i64>,
    pub pipeline_freshness_days: Option<i64>,
}

/// Monitoring alert thresholds, captured into each snapshot's details.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorThresholds {
    pub accuracy_min: f64,
    pub brier_max: f64,
    pub freshness_days_max: i64,
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Per-alert urgency tier derived from severity and breach streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationLevel {
    None,
    Watch,
    Incident,
}

/// Aggregate escalation state over all alerts in one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationState {
    None,
    Active,
    Watch,
    Incident,
}

/// A threshold breach detected during a monitoring evaluation.
/// Embedded in the snapshot's details column, not separately persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    /// Consecutive trailing evaluations (including this one) breaching the
    /// same threshold. A first-time breach has streak 1.
    pub breach_streak: u32,
    pub escalation_level: EscalationLevel,
    pub recommended_action: String,
}

/// JSON details column of a monitoring snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDetails {
    pub thresholds: MonitorThresholds,
    pub alerts: Vec<Alert>,
}

/// A persisted monitoring snapshot row. Append-only, immutable once written.
#[derive(Debug, Clone)]
pub struct MonitoringSnapshot {
    pub id: i64,
    pub season: String,
    pub captured_at: i64,
    pub evaluated_predictions: i64,
    pub accuracy: Option<f64>,
    pub brier_score: Option<f64>,
    pub game_data_freshness_days: Option<i64>,
    pub pipeline_freshness_days: Option<i64>,
    pub alert_count: i64,
    pub details: SnapshotDetails,
}

/// A trend query row — the snapshot metrics without the details payload.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub captured_at: i64,
    pub evaluated_predictions: i64,
    pub accuracy: Option<f64>,
    pub brier_score: Option<f64>,
    pub game_data_freshness_days: Option<i64>,
    pub pipeline_freshness_days: Option<i64>,
    pub alert_count: i64,
}

/// Status recorded on an audit-log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Degraded,
    Failed,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Degraded => "degraded",
            Self::Failed => "failed",
        }
    }
}
