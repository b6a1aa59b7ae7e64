//! Write connection utilities — BEGIN IMMEDIATE transactions.

use fastbreak_core::errors::StorageError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
/// This acquires the write lock at transaction start, preventing SQLITE_BUSY
/// mid-transaction; the job claim runs through here so the conditional
/// update and its RETURNING read are one atomic unit.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
{
    // Issues a single `BEGIN IMMEDIATE`, acquiring the write lock at start.
    // `unchecked_transaction()` would emit `BEGIN DEFERRED` on top of this,
    // so the immediate transaction is opened directly via `new_unchecked`.
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(|e| {
        StorageError::Sqlite {
            message: format!("failed to begin immediate transaction: {e}"),
        }
    })?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::Sqlite {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(result)
}
