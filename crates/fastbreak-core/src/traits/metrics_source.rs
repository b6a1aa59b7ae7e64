//! MetricsSource trait — the read side of the prediction ledger.
//!
//! Implemented outside this core by whatever owns the predictions and
//! game-results data. The aggregator computes accuracy/Brier itself from
//! raw outcomes so the zero-row behavior lives in one place.

use crate::errors::SourceError;

/// A scored prediction with a known outcome.
#[derive(Debug, Clone, Copy)]
pub struct EvaluatedOutcome {
    /// Whether the predicted winner matched the real winner.
    pub was_correct: bool,
    /// Predicted home-win probability at prediction time.
    pub predicted_prob: f64,
    /// Whether the home team actually won.
    pub home_win: bool,
}

/// Read access to evaluated predictions and data-freshness timestamps.
pub trait MetricsSource {
    /// All scored predictions with known outcomes for the season.
    fn evaluated_outcomes(&self, season: &str) -> Result<Vec<EvaluatedOutcome>, SourceError>;

    /// Count of games with ground truth available for the season,
    /// whether or not a prediction has been scored against them yet.
    fn completed_items(&self, season: &str) -> Result<u64, SourceError>;

    /// Most recent game date observed for the season, epoch seconds.
    fn latest_game_date(&self, season: &str) -> Result<Option<i64>, SourceError>;

    /// Most recent data pipeline sync, epoch seconds. Not season-scoped.
    fn latest_pipeline_sync(&self) -> Result<Option<i64>, SourceError>;
}
