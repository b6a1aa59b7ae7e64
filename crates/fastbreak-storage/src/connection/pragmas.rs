//! PRAGMA configuration applied to every SQLite connection.
//!
//! WAL mode, NORMAL sync, 5s busy_timeout, foreign_keys ON. The busy
//! timeout bounds lock acquisition for concurrent claimers; it never makes
//! a claimer wait for work to appear.

use fastbreak_core::errors::StorageError;
use rusqlite::Connection;

/// Apply performance and safety pragmas to a write-capable connection.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })
}

/// Apply pragmas to a read-only pooled connection.
pub fn apply_read_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA busy_timeout = 5000;
        PRAGMA query_only = ON;
        ",
    )
    .map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })
}
