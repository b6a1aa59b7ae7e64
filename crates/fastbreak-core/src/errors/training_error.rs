//! Training pipeline errors.

/// Errors raised by the external training routine.
/// The retrain worker catches these, records them on the job, and returns a
/// structured failed outcome — they never propagate past the worker.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("Training pipeline failed: {message}")]
    Failed { message: String },

    #[error("Training pipeline returned no output")]
    EmptyOutput,
}
