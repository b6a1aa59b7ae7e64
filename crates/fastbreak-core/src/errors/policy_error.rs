//! Retrain policy errors.

use super::{SourceError, StorageError};

/// Errors that can occur while evaluating the retrain policy.
/// A duplicate-guard hit is a normal decision branch, not an error.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Metrics source error: {0}")]
    Source(#[from] SourceError),
}
