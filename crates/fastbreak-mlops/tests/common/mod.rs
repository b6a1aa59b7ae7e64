//! Shared fakes and fixtures for the mlops integration tests.

#![allow(dead_code)]

use fastbreak_core::errors::{SourceError, TrainingError};
use fastbreak_core::traits::{EvaluatedOutcome, MetricsSource, Trainer};
use fastbreak_core::types::{EnsembleScores, ModelScores, TrainingOutput};

/// Canned metrics source.
#[derive(Debug, Clone, Default)]
pub struct FakeSource {
    pub outcomes: Vec<EvaluatedOutcome>,
    pub completed_items: u64,
    pub latest_game_date: Option<i64>,
    pub latest_pipeline_sync: Option<i64>,
    pub fail: bool,
}

impl MetricsSource for FakeSource {
    fn evaluated_outcomes(&self, _season: &str) -> Result<Vec<EvaluatedOutcome>, SourceError> {
        if self.fail {
            return Err(SourceError::Unavailable {
                message: "predictions store offline".to_string(),
            });
        }
        Ok(self.outcomes.clone())
    }

    fn completed_items(&self, _season: &str) -> Result<u64, SourceError> {
        if self.fail {
            return Err(SourceError::Unavailable {
                message: "predictions store offline".to_string(),
            });
        }
        Ok(self.completed_items)
    }

    fn latest_game_date(&self, _season: &str) -> Result<Option<i64>, SourceError> {
        Ok(self.latest_game_date)
    }

    fn latest_pipeline_sync(&self) -> Result<Option<i64>, SourceError> {
        Ok(self.latest_pipeline_sync)
    }
}

pub fn outcome(was_correct: bool, predicted_prob: f64, home_win: bool) -> EvaluatedOutcome {
    EvaluatedOutcome {
        was_correct,
        predicted_prob,
        home_win,
    }
}

/// `total` outcomes of which `correct` were right. Correct predictions are
/// confident and close; misses are confident and wrong, so low accuracy
/// drags the Brier score up with it.
pub fn outcomes_with_accuracy(total: usize, correct: usize) -> Vec<EvaluatedOutcome> {
    (0..total)
        .map(|i| {
            if i < correct {
                outcome(true, 0.8, true)
            } else {
                outcome(false, 0.8, false)
            }
        })
        .collect()
}

/// Canned trainer.
pub enum FakeTrainer {
    Succeed,
    Fail(String),
}

impl Trainer for FakeTrainer {
    fn train(&self, _season: &str) -> Result<TrainingOutput, TrainingError> {
        match self {
            Self::Succeed => Ok(TrainingOutput {
                logistic_regression: Some(ModelScores {
                    cv_accuracy: Some(0.61),
                    cv_auc: Some(0.64),
                    train_accuracy: Some(0.66),
                    brier_score: Some(0.21),
                }),
                xgboost: Some(ModelScores {
                    cv_accuracy: Some(0.63),
                    cv_auc: Some(0.67),
                    train_accuracy: Some(0.71),
                    brier_score: Some(0.20),
                }),
                lightgbm: None,
                ensemble: Some(EnsembleScores {
                    train_accuracy: Some(0.69),
                    train_auc: Some(0.70),
                    brier_score: Some(0.19),
                }),
            }),
            Self::Fail(message) => Err(TrainingError::Failed {
                message: message.clone(),
            }),
        }
    }
}
