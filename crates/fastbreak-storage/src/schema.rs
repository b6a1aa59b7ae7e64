//! Lazy, idempotent schema provisioning.
//!
//! There is no migration runner: every table is created if absent, and
//! columns added after initial deployment are backfilled onto pre-existing
//! tables via `PRAGMA table_info`. This keeps legacy database volumes
//! compatible with current code, and lets any operation that hits an
//! unprovisioned table heal itself (see `DatabaseManager::write_with_bootstrap`).

use fastbreak_core::errors::StorageError;
use rusqlite::Connection;

pub const SCHEMA_SQL: &str = r#"
-- Monitoring snapshots: append-only log of model-quality evaluations.
-- Rows are never mutated after insert.
CREATE TABLE IF NOT EXISTS monitoring_snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    season TEXT NOT NULL,
    captured_at INTEGER NOT NULL,
    evaluated_predictions INTEGER NOT NULL DEFAULT 0,
    accuracy REAL,
    brier_score REAL,
    game_data_freshness_days INTEGER,
    pipeline_freshness_days INTEGER,
    alert_count INTEGER NOT NULL DEFAULT 0,
    details TEXT NOT NULL DEFAULT '{}'
) STRICT;

CREATE INDEX IF NOT EXISTS idx_snapshots_season_time
    ON monitoring_snapshots(season, captured_at DESC);

-- Retrain jobs: durable queue and audit trail. Jobs are never deleted;
-- status only moves forward (queued -> running -> completed|failed).
CREATE TABLE IF NOT EXISTS retrain_jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    season TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'queued',
    trigger_source TEXT NOT NULL DEFAULT 'policy',
    reasons TEXT NOT NULL DEFAULT '[]',
    metrics TEXT NOT NULL DEFAULT '{}',
    thresholds TEXT,
    artifact_snapshot TEXT NOT NULL DEFAULT '{}',
    rollback_plan TEXT NOT NULL DEFAULT '{}',
    run_details TEXT,
    error TEXT,
    created_at INTEGER NOT NULL,
    started_at INTEGER,
    completed_at INTEGER,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_retrain_jobs_season_status_time
    ON retrain_jobs(season, status, created_at DESC);

-- At most one queued/running job per season. The policy checks its window
-- first; this index closes the read-then-create race under concurrency.
CREATE UNIQUE INDEX IF NOT EXISTS idx_retrain_jobs_one_active
    ON retrain_jobs(season) WHERE status IN ('queued', 'running');

-- Shared audit log for monitoring, policy, and worker runs.
CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    logged_at INTEGER NOT NULL,
    module TEXT NOT NULL,
    status TEXT NOT NULL,
    records_processed INTEGER NOT NULL DEFAULT 0,
    errors TEXT,
    details TEXT NOT NULL DEFAULT '{}'
) STRICT;

CREATE INDEX IF NOT EXISTS idx_audit_module ON audit_log(module);
CREATE INDEX IF NOT EXISTS idx_audit_status ON audit_log(status);
"#;

/// Columns added to retrain_jobs after initial deployment. Volumes created
/// before the worker existed lack them.
const JOB_BACKFILL_COLUMNS: &[(&str, &str)] = &[
    ("run_details", "TEXT"),
    ("error", "TEXT"),
    ("started_at", "INTEGER"),
    ("completed_at", "INTEGER"),
];

/// Create all tables and indexes if absent, then backfill columns that
/// newer code expects on pre-existing tables. Idempotent.
pub fn provision(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| StorageError::Sqlite {
            message: format!("schema provisioning failed: {e}"),
        })?;
    backfill_job_columns(conn)?;
    Ok(())
}

fn backfill_job_columns(conn: &Connection) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('retrain_jobs')")
        .map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;
    let existing: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;

    for (name, column_type) in JOB_BACKFILL_COLUMNS {
        if !existing.iter().any(|c| c == name) {
            tracing::info!(column = name, "backfilling retrain_jobs column");
            conn.execute_batch(&format!(
                "ALTER TABLE retrain_jobs ADD COLUMN {name} {column_type}"
            ))
            .map_err(|e| StorageError::Sqlite {
                message: format!("backfill of retrain_jobs.{name} failed: {e}"),
            })?;
        }
    }
    Ok(())
}
