//! Queries for the shared audit_log table.
//!
//! Monitoring, policy, and worker each append one row per run; details is a
//! free-shape JSON payload because every module logs a different summary.

use fastbreak_core::errors::StorageError;
use fastbreak_core::types::AuditStatus;
use rusqlite::{params, Connection};

use crate::classify::classify;

/// A stored audit record.
#[derive(Debug, Clone)]
pub struct AuditRow {
    pub id: i64,
    pub logged_at: i64,
    pub module: String,
    pub status: String,
    pub records_processed: i64,
    pub errors: Option<String>,
    pub details: serde_json::Value,
}

/// Append an audit record.
pub fn insert(
    conn: &Connection,
    logged_at: i64,
    module: &str,
    status: AuditStatus,
    records_processed: i64,
    errors: Option<&str>,
    details: &serde_json::Value,
) -> Result<i64, StorageError> {
    let details = serde_json::to_string(details).map_err(|e| StorageError::Serialization {
        message: e.to_string(),
    })?;

    conn.execute(
        "INSERT INTO audit_log (logged_at, module, status, records_processed, errors, details)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            logged_at,
            module,
            status.as_str(),
            records_processed,
            errors,
            details,
        ],
    )
    .map_err(classify)?;
    Ok(conn.last_insert_rowid())
}

/// Recent audit records, most recent first, optionally filtered by module.
pub fn recent(
    conn: &Connection,
    module: Option<&str>,
    limit: usize,
) -> Result<Vec<AuditRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, logged_at, module, status, records_processed, errors, details
             FROM audit_log
             WHERE (?1 IS NULL OR module = ?1)
             ORDER BY logged_at DESC, id DESC
             LIMIT ?2",
        )
        .map_err(classify)?;

    let rows = stmt
        .query_map(params![module, limit as i64], |row| {
            let raw: String = row.get(6)?;
            let details = serde_json::from_str(&raw).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    6,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            Ok(AuditRow {
                id: row.get(0)?,
                logged_at: row.get(1)?,
                module: row.get(2)?,
                status: row.get(3)?,
                records_processed: row.get(4)?,
                errors: row.get(5)?,
                details,
            })
        })
        .map_err(classify)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(classify)
}

/// Count all audit records.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
        .map_err(classify)
}
