//! Typed classification of driver errors.
//!
//! The storage layer never string-matches at call sites: missing-schema and
//! duplicate-active detection happen here, once, and everything downstream
//! matches on `StorageError` variants.

use fastbreak_core::errors::StorageError;

/// Map a rusqlite error to a `StorageError`, detecting unprovisioned schema
/// objects so callers can bootstrap and retry.
pub(crate) fn classify(e: rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(_, Some(ref message)) = e {
        if let Some(object) = message.strip_prefix("no such table: ") {
            return StorageError::SchemaMissing {
                object: object.to_string(),
            };
        }
    }
    StorageError::Sqlite {
        message: e.to_string(),
    }
}

/// True when an insert tripped the one-active-job-per-season unique index.
///
/// SQLite reports a unique-constraint violation by the conflicting column
/// (`UNIQUE constraint failed: retrain_jobs.season`) rather than the index
/// name, so the season column — the sole unique constraint on the table —
/// is what identifies the one-active conflict. The index name is still
/// accepted in case a SQLite build surfaces it instead.
pub(crate) fn is_active_job_conflict(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, Some(message)) => {
            err.code == rusqlite::ErrorCode::ConstraintViolation
                && (message.contains("retrain_jobs.season")
                    || message.contains("idx_retrain_jobs_one_active"))
        }
        _ => false,
    }
}
