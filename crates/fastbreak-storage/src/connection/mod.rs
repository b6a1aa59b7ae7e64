//! Connection management: write-serialized + read-pooled.

pub mod pool;
pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fastbreak_core::errors::StorageError;
use rusqlite::Connection;

use self::pool::ReadPool;
use self::pragmas::apply_pragmas;
use crate::schema;

/// Manages the single write connection and the read connection pool.
///
/// All writes serialize through one connection; reads round-robin over a
/// small pool. The database is the sole cross-process coordination point —
/// no locks exist outside it.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    /// None for in-memory databases, where separate connections would not
    /// see the writer's data; reads fall back to the writer connection.
    readers: Option<ReadPool>,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open a database at the given path, apply pragmas, provision schema.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let writer = Connection::open(path).map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;
        apply_pragmas(&writer)?;
        schema::provision(&writer)?;

        let readers = ReadPool::open(path, ReadPool::default_size())?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Some(readers),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory().map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;
        apply_pragmas(&writer)?;
        schema::provision(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: None,
            path: None,
        })
    }

    /// Execute a write operation with the serialized writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.writer.lock().map_err(|_| StorageError::Sqlite {
            message: "write lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Execute a read operation with a pooled read connection.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        match &self.readers {
            Some(pool) => pool.with_conn(f),
            None => self.with_writer(f),
        }
    }

    /// Execute a write operation, bootstrapping the schema and retrying
    /// exactly once if a required table has not been provisioned yet.
    /// Any other error propagates unmodified.
    pub fn write_with_bootstrap<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: Fn(&Connection) -> Result<T, StorageError>,
    {
        match self.with_writer(&f) {
            Err(StorageError::SchemaMissing { object }) => {
                tracing::warn!(object = %object, "schema object missing; provisioning and retrying once");
                self.with_writer(|conn| schema::provision(conn))?;
                self.with_writer(&f)
            }
            other => other,
        }
    }

    /// Read counterpart of [`write_with_bootstrap`]: provisioning still goes
    /// through the writer, the retry through the read path.
    ///
    /// [`write_with_bootstrap`]: DatabaseManager::write_with_bootstrap
    pub fn read_with_bootstrap<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: Fn(&Connection) -> Result<T, StorageError>,
    {
        match self.with_reader(&f) {
            Err(StorageError::SchemaMissing { object }) => {
                tracing::warn!(object = %object, "schema object missing; provisioning and retrying once");
                self.with_writer(|conn| schema::provision(conn))?;
                self.with_reader(&f)
            }
            other => other,
        }
    }

    /// Run a WAL checkpoint (TRUNCATE mode).
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(|e| StorageError::Sqlite {
                    message: e.to_string(),
                })
        })
    }

    /// Get the database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
