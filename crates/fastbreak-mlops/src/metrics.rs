//! Point-in-time model quality and data freshness aggregation.

use fastbreak_core::errors::SourceError;
use fastbreak_core::traits::MetricsSource;
use fastbreak_core::types::ModelMetrics;

/// Whole days between `then` and `now`, clamped at zero.
pub fn days_since(now: i64, then: i64) -> i64 {
    (now - then).max(0) / 86_400
}

/// Compute current metrics for a season from the metrics source.
///
/// With zero evaluated predictions, accuracy and Brier are `None` — there is
/// nothing to average. Source errors propagate unmodified; nothing here
/// zero-fills a failure.
pub fn compute_metrics<S: MetricsSource + ?Sized>(
    source: &S,
    season: &str,
    now: i64,
) -> Result<ModelMetrics, SourceError> {
    let outcomes = source.evaluated_outcomes(season)?;
    let evaluated_predictions = outcomes.len() as i64;

    let (accuracy, brier_score) = if outcomes.is_empty() {
        (None, None)
    } else {
        let n = outcomes.len() as f64;
        let correct = outcomes.iter().filter(|o| o.was_correct).count() as f64;
        let squared_error: f64 = outcomes
            .iter()
            .map(|o| {
                let realized = if o.home_win { 1.0 } else { 0.0 };
                (o.predicted_prob - realized).powi(2)
            })
            .sum();
        (Some(correct / n), Some(squared_error / n))
    };

    let latest_game_date = source.latest_game_date(season)?;
    let latest_pipeline_sync = source.latest_pipeline_sync()?;

    Ok(ModelMetrics {
        evaluated_predictions,
        accuracy,
        brier_score,
        latest_game_date,
        latest_pipeline_sync,
        game_data_freshness_days: latest_game_date.map(|t| days_since(now, t)),
        pipeline_freshness_days: latest_pipeline_sync.map(|t| days_since(now, t)),
    })
}
