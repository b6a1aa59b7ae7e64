//! Queries for the retrain_jobs table — durable job queue with a strict
//! forward-only state machine.
//!
//! The claim is a single conditional UPDATE with RETURNING: two concurrent
//! claimers can never receive the same row, and a claimer that finds no
//! queued job gets None back immediately.

use fastbreak_core::errors::StorageError;
use fastbreak_core::types::{
    ArtifactSnapshot, JobStatus, PolicyMetrics, PolicyThresholds, RetrainJob, RetrainReason,
    RollbackPlan, RunDetails, TerminalStatus,
};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::classify::{classify, is_active_job_conflict};

const JOB_COLUMNS: &str = "id, season, status, trigger_source, reasons, metrics, thresholds, \
     artifact_snapshot, rollback_plan, run_details, error, \
     created_at, started_at, completed_at, updated_at";

/// Payload for a new queued job.
#[derive(Debug)]
pub struct NewJob<'a> {
    pub season: &'a str,
    pub trigger_source: &'a str,
    pub reasons: &'a [RetrainReason],
    pub metrics: &'a PolicyMetrics,
    pub thresholds: &'a PolicyThresholds,
    pub artifact_snapshot: &'a ArtifactSnapshot,
    pub rollback_plan: &'a RollbackPlan,
    pub created_at: i64,
}

/// Insert a new job with status 'queued'. Returns the stored row.
///
/// An insert that trips the one-active-per-season unique index surfaces as
/// `DuplicateActiveJob`; the policy converts it into its already-queued
/// branch instead of failing the evaluation.
pub fn insert(conn: &Connection, job: &NewJob<'_>) -> Result<RetrainJob, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "INSERT INTO retrain_jobs (
                season, status, trigger_source, reasons, metrics, thresholds,
                artifact_snapshot, rollback_plan, created_at, updated_at
             ) VALUES (?1, 'queued', ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             RETURNING {JOB_COLUMNS}"
        ))
        .map_err(classify)?;

    stmt.query_row(
        params![
            job.season,
            job.trigger_source,
            to_json(&job.reasons)?,
            to_json(job.metrics)?,
            to_json(job.thresholds)?,
            to_json(job.artifact_snapshot)?,
            to_json(job.rollback_plan)?,
            job.created_at,
        ],
        job_from_row,
    )
    .map_err(|e| {
        if is_active_job_conflict(&e) {
            StorageError::DuplicateActiveJob {
                season: job.season.to_string(),
            }
        } else {
            classify(e)
        }
    })
}

/// Most recent queued/running job for the season created within the trailing
/// window.
pub fn find_recent_active(
    conn: &Connection,
    season: &str,
    window_hours: i64,
    now: i64,
) -> Result<Option<RetrainJob>, StorageError> {
    let cutoff = now - window_hours * 3600;
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {JOB_COLUMNS} FROM retrain_jobs
             WHERE season = ?1
               AND status IN ('queued', 'running')
               AND created_at >= ?2
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        ))
        .map_err(classify)?;

    stmt.query_row(params![season, cutoff], job_from_row)
        .optional()
        .map_err(classify)
}

/// Atomically claim the oldest queued job (optionally season-filtered):
/// transition it to 'running' and stamp started_at. Returns None when
/// nothing is claimable, without waiting.
///
/// The subselect picks the oldest queued id and the outer UPDATE re-checks
/// `status = 'queued'`, so a row can only ever be claimed once even when
/// claimers race across processes.
pub fn claim_next(
    conn: &Connection,
    season: Option<&str>,
    now: i64,
) -> Result<Option<RetrainJob>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "UPDATE retrain_jobs
                SET status = 'running', started_at = ?1, updated_at = ?1
              WHERE id = (
                    SELECT id FROM retrain_jobs
                     WHERE status = 'queued'
                       AND (?2 IS NULL OR season = ?2)
                     ORDER BY created_at ASC, id ASC
                     LIMIT 1)
                AND status = 'queued'
              RETURNING {JOB_COLUMNS}"
        ))
        .map_err(classify)?;

    stmt.query_row(params![now, season], job_from_row)
        .optional()
        .map_err(classify)
}

/// Finalize a running job into a terminal status, stamping completed_at and
/// refreshing the artifact snapshot.
///
/// Unknown ids report `JobNotFound`; a job that exists but is not running
/// (never claimed, or already terminal) is rejected with `JobNotFinalizable`
/// — terminal states are never re-entered.
pub fn finalize(
    conn: &Connection,
    job_id: i64,
    status: TerminalStatus,
    run_details: &RunDetails,
    error: Option<&str>,
    artifact_snapshot: &ArtifactSnapshot,
    now: i64,
) -> Result<RetrainJob, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "UPDATE retrain_jobs
                SET status = ?2, run_details = ?3, error = ?4,
                    artifact_snapshot = ?5, completed_at = ?6, updated_at = ?6
              WHERE id = ?1 AND status = 'running'
              RETURNING {JOB_COLUMNS}"
        ))
        .map_err(classify)?;

    let updated = stmt
        .query_row(
            params![
                job_id,
                JobStatus::from(status).as_str(),
                to_json(run_details)?,
                error,
                to_json(artifact_snapshot)?,
                now,
            ],
            job_from_row,
        )
        .optional()
        .map_err(classify)?;

    match updated {
        Some(job) => Ok(job),
        None => match current_status(conn, job_id)? {
            None => Err(StorageError::JobNotFound { id: job_id }),
            Some(status) => Err(StorageError::JobNotFinalizable { id: job_id, status }),
        },
    }
}

/// Query recent jobs for a season, most recent first.
pub fn list(conn: &Connection, season: &str, limit: usize) -> Result<Vec<RetrainJob>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {JOB_COLUMNS} FROM retrain_jobs
             WHERE season = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2"
        ))
        .map_err(classify)?;

    let rows = stmt
        .query_map(params![season, limit as i64], job_from_row)
        .map_err(classify)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(classify)
}

/// Fetch a single job by id.
pub fn find_by_id(conn: &Connection, job_id: i64) -> Result<Option<RetrainJob>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {JOB_COLUMNS} FROM retrain_jobs WHERE id = ?1"
        ))
        .map_err(classify)?;

    stmt.query_row(params![job_id], job_from_row)
        .optional()
        .map_err(classify)
}

/// Count all jobs.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM retrain_jobs", [], |row| row.get(0))
        .map_err(classify)
}

fn current_status(conn: &Connection, job_id: i64) -> Result<Option<String>, StorageError> {
    conn.query_row(
        "SELECT status FROM retrain_jobs WHERE id = ?1",
        params![job_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(classify)
}

fn job_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RetrainJob> {
    let status: String = row.get(2)?;
    Ok(RetrainJob {
        id: row.get(0)?,
        season: row.get(1)?,
        status: JobStatus::parse(&status).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?,
        trigger_source: row.get(3)?,
        reasons: parse_json(row, 4)?,
        metrics: parse_json(row, 5)?,
        thresholds: parse_json_opt(row, 6)?,
        artifact_snapshot: parse_json(row, 7)?,
        rollback_plan: parse_json(row, 8)?,
        run_details: parse_json_opt(row, 9)?,
        error: row.get(10)?,
        created_at: row.get(11)?,
        started_at: row.get(12)?,
        completed_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn parse_json<T: DeserializeOwned>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_json_opt<T: DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        serde_json::from_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
    })
    .transpose()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization {
        message: e.to_string(),
    })
}
