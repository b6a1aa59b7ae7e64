//! Monitoring errors.

use super::{SourceError, StorageError};

/// Errors that can occur while computing a monitoring overview or trend.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Metrics source error: {0}")]
    Source(#[from] SourceError),
}
