//! Training pipeline output and the summarized form stored on jobs.

use serde::{Deserialize, Serialize};

/// Cross-validated and training metrics for one model in the ensemble.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelScores {
    pub cv_accuracy: Option<f64>,
    pub cv_auc: Option<f64>,
    pub train_accuracy: Option<f64>,
    pub brier_score: Option<f64>,
}

/// Metrics for the blended ensemble.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnsembleScores {
    pub train_accuracy: Option<f64>,
    pub train_auc: Option<f64>,
    pub brier_score: Option<f64>,
}

/// Raw output returned by the training routine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingOutput {
    pub logistic_regression: Option<ModelScores>,
    pub xgboost: Option<ModelScores>,
    pub lightgbm: Option<ModelScores>,
    pub ensemble: Option<EnsembleScores>,
}

/// The per-model summary recorded in a job's run details.
/// Missing models summarize to empty scores rather than being omitted, so
/// the stored shape is stable across trainer versions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSummary {
    pub logistic_regression: ModelScores,
    pub xgboost: ModelScores,
    pub lightgbm: ModelScores,
    pub ensemble: EnsembleScores,
}

impl TrainingSummary {
    pub fn from_output(output: &TrainingOutput) -> Self {
        Self {
            logistic_regression: output.logistic_regression.clone().unwrap_or_default(),
            xgboost: output.xgboost.clone().unwrap_or_default(),
            lightgbm: output.lightgbm.clone().unwrap_or_default(),
            ensemble: output.ensemble.clone().unwrap_or_default(),
        }
    }
}
