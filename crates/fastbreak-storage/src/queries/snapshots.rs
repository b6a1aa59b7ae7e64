//! Queries for the monitoring_snapshots table — append-only log of model
//! quality evaluations. There is deliberately no UPDATE in this module.

use fastbreak_core::errors::StorageError;
use fastbreak_core::types::{ModelMetrics, MonitoringSnapshot, SnapshotDetails, TrendPoint};
use rusqlite::{params, Connection};

use crate::classify::classify;

/// Payload for one snapshot row.
#[derive(Debug)]
pub struct NewSnapshot<'a> {
    pub season: &'a str,
    pub captured_at: i64,
    pub metrics: &'a ModelMetrics,
    pub alert_count: i64,
    pub details: &'a SnapshotDetails,
}

/// Append a snapshot. Returns the row id.
pub fn insert(conn: &Connection, snapshot: &NewSnapshot<'_>) -> Result<i64, StorageError> {
    let details = serde_json::to_string(snapshot.details).map_err(|e| {
        StorageError::Serialization {
            message: e.to_string(),
        }
    })?;

    conn.execute(
        "INSERT INTO monitoring_snapshots (
            season, captured_at, evaluated_predictions, accuracy, brier_score,
            game_data_freshness_days, pipeline_freshness_days, alert_count, details
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            snapshot.season,
            snapshot.captured_at,
            snapshot.metrics.evaluated_predictions,
            snapshot.metrics.accuracy,
            snapshot.metrics.brier_score,
            snapshot.metrics.game_data_freshness_days,
            snapshot.metrics.pipeline_freshness_days,
            snapshot.alert_count,
            details,
        ],
    )
    .map_err(classify)?;
    Ok(conn.last_insert_rowid())
}

/// The most recent snapshots for a season, most recent first.
/// Feeds the alert engine's breach-streak scan.
pub fn recent(
    conn: &Connection,
    season: &str,
    limit: usize,
) -> Result<Vec<MonitoringSnapshot>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, season, captured_at, evaluated_predictions, accuracy, brier_score,
                    game_data_freshness_days, pipeline_freshness_days, alert_count, details
             FROM monitoring_snapshots
             WHERE season = ?1
             ORDER BY captured_at DESC, id DESC
             LIMIT ?2",
        )
        .map_err(classify)?;

    let rows = stmt
        .query_map(params![season, limit as i64], |row| {
            let raw: String = row.get(9)?;
            let details: SnapshotDetails = serde_json::from_str(&raw).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    9,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            Ok(MonitoringSnapshot {
                id: row.get(0)?,
                season: row.get(1)?,
                captured_at: row.get(2)?,
                evaluated_predictions: row.get(3)?,
                accuracy: row.get(4)?,
                brier_score: row.get(5)?,
                game_data_freshness_days: row.get(6)?,
                pipeline_freshness_days: row.get(7)?,
                alert_count: row.get(8)?,
                details,
            })
        })
        .map_err(classify)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(classify)
}

/// Snapshots within the trailing day window, most recent first, capped at
/// `limit`. The details payload is left out — trend consumers chart the
/// numeric series.
pub fn trend(
    conn: &Connection,
    season: &str,
    days: u32,
    limit: usize,
    now: i64,
) -> Result<Vec<TrendPoint>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT captured_at, evaluated_predictions, accuracy, brier_score,
                    game_data_freshness_days, pipeline_freshness_days, alert_count
             FROM monitoring_snapshots
             WHERE season = ?1
               AND captured_at >= ?2 - (?3 * 86400)
             ORDER BY captured_at DESC, id DESC
             LIMIT ?4",
        )
        .map_err(classify)?;

    let rows = stmt
        .query_map(params![season, now, days, limit as i64], |row| {
            Ok(TrendPoint {
                captured_at: row.get(0)?,
                evaluated_predictions: row.get(1)?,
                accuracy: row.get(2)?,
                brier_score: row.get(3)?,
                game_data_freshness_days: row.get(4)?,
                pipeline_freshness_days: row.get(5)?,
                alert_count: row.get(6)?,
            })
        })
        .map_err(classify)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(classify)
}

/// Count all snapshots.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM monitoring_snapshots", [], |row| {
        row.get(0)
    })
    .map_err(classify)
}
