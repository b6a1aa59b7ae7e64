//! Retrain worker errors.

use super::StorageError;

/// Errors that can occur while processing a retrain job.
/// Training failures are not represented here — the worker finalizes the job
/// as failed and returns a structured outcome instead of raising.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
