//! Storage errors.

/// Errors from the SQLite persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required table or index has not been provisioned yet.
    /// The storage layer bootstraps the schema and retries exactly once;
    /// a second occurrence propagates.
    #[error("Schema object missing: {object}")]
    SchemaMissing { object: String },

    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("Payload serialization failed: {message}")]
    Serialization { message: String },

    #[error("Retrain job {id} not found")]
    JobNotFound { id: i64 },

    /// Finalize was called on a job that is not `running` — either never
    /// claimed, or already terminal. Rejected, never a silent no-op.
    #[error("Retrain job {id} is '{status}' and cannot be finalized")]
    JobNotFinalizable { id: i64, status: String },

    /// The partial unique index on active jobs rejected an insert.
    /// The policy layer converts this into the already-queued branch.
    #[error("Season {season} already has an active retrain job")]
    DuplicateActiveJob { season: String },
}

impl StorageError {
    /// Convenience constructor for driver errors.
    pub fn sqlite(message: impl Into<String>) -> Self {
        Self::Sqlite {
            message: message.into(),
        }
    }
}
