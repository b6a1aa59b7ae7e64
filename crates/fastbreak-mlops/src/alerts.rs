//! The alert engine: threshold breaches, breach streaks, escalation.
//!
//! Pure over its inputs — the monitor service supplies current metrics and
//! the trailing snapshot history and persists the results.

use fastbreak_core::types::{
    Alert, EscalationLevel, EscalationState, ModelMetrics, MonitorThresholds,
    MonitoringSnapshot, Severity,
};

/// Margin below `accuracy_min` at which an accuracy breach is critical.
const ACCURACY_CRITICAL_MARGIN: f64 = 0.07;
/// Margin above `brier_max` at which a Brier breach becomes high severity.
const BRIER_HIGH_MARGIN: f64 = 0.08;
/// Days past `freshness_days_max` at which staleness becomes high severity.
const FRESHNESS_HIGH_MARGIN: i64 = 2;

/// Evaluate all alerts for the current metrics against the thresholds and
/// the trailing history (most recent first), and derive the aggregate
/// escalation state.
pub fn evaluate_alerts(
    metrics: &ModelMetrics,
    thresholds: &MonitorThresholds,
    history: &[MonitoringSnapshot],
) -> (Vec<Alert>, EscalationState) {
    let mut alerts = Vec::new();

    if let Some(accuracy) = metrics.accuracy {
        if accuracy < thresholds.accuracy_min {
            let streak = breach_streak(history, |s| {
                s.accuracy.map(|a| a < thresholds.accuracy_min)
            });
            let critical = accuracy < thresholds.accuracy_min - ACCURACY_CRITICAL_MARGIN;
            let message = if critical {
                format!(
                    "Accuracy {accuracy:.3} critically below threshold {:.3}",
                    thresholds.accuracy_min
                )
            } else {
                format!(
                    "Accuracy {accuracy:.3} below threshold {:.3}",
                    thresholds.accuracy_min
                )
            };
            alerts.push(build_alert("accuracy_breach", Severity::High, message, streak));
        }
    }

    if let Some(brier) = metrics.brier_score {
        if brier > thresholds.brier_max {
            let severity = if brier > thresholds.brier_max + BRIER_HIGH_MARGIN {
                Severity::High
            } else {
                Severity::Medium
            };
            let streak = breach_streak(history, |s| {
                s.brier_score.map(|b| b > thresholds.brier_max)
            });
            let message = format!(
                "Brier score {brier:.3} above threshold {:.3}",
                thresholds.brier_max
            );
            alerts.push(build_alert("brier_breach", severity, message, streak));
        }
    }

    if let Some(days) = metrics.game_data_freshness_days {
        if days > thresholds.freshness_days_max {
            let severity = staleness_severity(days, thresholds.freshness_days_max);
            let streak = breach_streak(history, |s| {
                s.game_data_freshness_days
                    .map(|d| d > thresholds.freshness_days_max)
            });
            let message = format!("Latest game data is {days} days old");
            alerts.push(build_alert("game_data_stale", severity, message, streak));
        }
    }

    if let Some(days) = metrics.pipeline_freshness_days {
        if days > thresholds.freshness_days_max {
            let severity = staleness_severity(days, thresholds.freshness_days_max);
            let streak = breach_streak(history, |s| {
                s.pipeline_freshness_days
                    .map(|d| d > thresholds.freshness_days_max)
            });
            let message = format!("Latest pipeline sync is {days} days old");
            alerts.push(build_alert("pipeline_stale", severity, message, streak));
        }
    }

    let state = aggregate_state(&alerts);
    (alerts, state)
}

/// Count consecutive trailing history points (most recent first) that breach
/// the same threshold, stopping at the first non-breaching or missing point,
/// plus one for the current breach itself.
fn breach_streak<F>(history: &[MonitoringSnapshot], breaches: F) -> u32
where
    F: Fn(&MonitoringSnapshot) -> Option<bool>,
{
    let mut streak = 1u32;
    for snapshot in history {
        match breaches(snapshot) {
            Some(true) => streak += 1,
            _ => break,
        }
    }
    streak
}

fn staleness_severity(days: i64, max_days: i64) -> Severity {
    if days > max_days + FRESHNESS_HIGH_MARGIN {
        Severity::High
    } else {
        Severity::Medium
    }
}

fn build_alert(id: &str, severity: Severity, message: String, streak: u32) -> Alert {
    let (escalation_level, recommended_action) = escalate(severity, streak);
    Alert {
        id: id.to_string(),
        severity,
        message,
        breach_streak: streak,
        escalation_level,
        recommended_action: recommended_action.to_string(),
    }
}

/// The severity × streak escalation table.
fn escalate(severity: Severity, streak: u32) -> (EscalationLevel, &'static str) {
    match severity {
        Severity::High if streak >= 2 => (EscalationLevel::Incident, "open_incident"),
        Severity::High => (EscalationLevel::Watch, "investigate_now"),
        Severity::Medium if streak >= 3 => (EscalationLevel::Watch, "investigate_now"),
        _ => (EscalationLevel::None, "monitor"),
    }
}

/// Aggregate state over one evaluation: the worst per-alert escalation, or
/// `Active` when alerts fired without reaching watch level.
fn aggregate_state(alerts: &[Alert]) -> EscalationState {
    if alerts
        .iter()
        .any(|a| a.escalation_level == EscalationLevel::Incident)
    {
        EscalationState::Incident
    } else if alerts
        .iter()
        .any(|a| a.escalation_level == EscalationLevel::Watch)
    {
        EscalationState::Watch
    } else if !alerts.is_empty() {
        EscalationState::Active
    } else {
        EscalationState::None
    }
}
