//! ModelMonitor — the monitoring overview and trend surface.

use std::sync::Arc;

use fastbreak_core::config::MlopsConfig;
use fastbreak_core::epoch_secs;
use fastbreak_core::errors::MonitorError;
use fastbreak_core::traits::MetricsSource;
use fastbreak_core::types::{
    Alert, AuditStatus, EscalationState, ModelMetrics, MonitorThresholds, SnapshotDetails,
    TrendPoint,
};
use fastbreak_storage::queries::{audit, snapshots};
use fastbreak_storage::DatabaseManager;
use serde::Serialize;

use crate::alerts::evaluate_alerts;
use crate::metrics::compute_metrics;

const AUDIT_MODULE: &str = "monitoring";

/// The full monitoring payload for one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringOverview {
    pub season: String,
    pub metrics: ModelMetrics,
    pub thresholds: MonitorThresholds,
    pub alerts: Vec<Alert>,
    pub escalation: EscalationState,
}

/// Evaluates model quality for a season, persists the snapshot trail, and
/// serves windowed trend queries.
pub struct ModelMonitor<S> {
    db: Arc<DatabaseManager>,
    source: S,
    config: MlopsConfig,
}

impl<S: MetricsSource> ModelMonitor<S> {
    pub fn new(db: Arc<DatabaseManager>, source: S, config: MlopsConfig) -> Self {
        Self { db, source, config }
    }

    /// Evaluate current metrics and alerts, appending one snapshot and one
    /// audit record regardless of whether anything fired.
    pub fn overview(&self, season: &str) -> Result<MonitoringOverview, MonitorError> {
        self.overview_at(season, epoch_secs())
    }

    /// Deterministic-time variant of [`overview`].
    ///
    /// [`overview`]: ModelMonitor::overview
    pub fn overview_at(&self, season: &str, now: i64) -> Result<MonitoringOverview, MonitorError> {
        let metrics = compute_metrics(&self.source, season, now)?;
        let thresholds = self.config.monitor_thresholds();

        // History is read before the current snapshot is appended, so the
        // streak scan sees only prior evaluations.
        let lookback = self.config.monitor.streak_lookback;
        let history = self
            .db
            .read_with_bootstrap(|conn| snapshots::recent(conn, season, lookback))?;

        let (alerts, escalation) = evaluate_alerts(&metrics, &thresholds, &history);
        for alert in &alerts {
            tracing::warn!(
                season = %season,
                alert = %alert.id,
                severity = ?alert.severity,
                streak = alert.breach_streak,
                "monitoring alert"
            );
        }

        let details = SnapshotDetails {
            thresholds,
            alerts: alerts.clone(),
        };
        let new_snapshot = snapshots::NewSnapshot {
            season,
            captured_at: now,
            metrics: &metrics,
            alert_count: alerts.len() as i64,
            details: &details,
        };
        self.db
            .write_with_bootstrap(|conn| snapshots::insert(conn, &new_snapshot))?;

        let status = if alerts.is_empty() {
            AuditStatus::Success
        } else {
            AuditStatus::Degraded
        };
        let audit_details = serde_json::json!({
            "season": season,
            "alerts": alerts,
            "thresholds": thresholds,
            "escalation": escalation,
        });
        self.db.write_with_bootstrap(|conn| {
            audit::insert(
                conn,
                now,
                AUDIT_MODULE,
                status,
                metrics.evaluated_predictions,
                None,
                &audit_details,
            )
        })?;

        Ok(MonitoringOverview {
            season: season.to_string(),
            metrics,
            thresholds,
            alerts,
            escalation,
        })
    }

    /// Snapshots within the trailing day window, most recent first.
    pub fn trend(
        &self,
        season: &str,
        days: u32,
        limit: usize,
    ) -> Result<Vec<TrendPoint>, MonitorError> {
        let now = epoch_secs();
        self.db
            .read_with_bootstrap(|conn| snapshots::trend(conn, season, days, limit, now))
            .map_err(MonitorError::from)
    }
}
