//! Trainer trait — the external training routine.

use crate::errors::TrainingError;
use crate::types::TrainingOutput;

/// Runs the full training pipeline for a season and reports per-model
/// metrics. Long-running; the worker never holds a transaction across it.
pub trait Trainer {
    fn train(&self, season: &str) -> Result<TrainingOutput, TrainingError>;
}
