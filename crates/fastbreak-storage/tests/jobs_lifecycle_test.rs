//! Tests for the retrain job state machine: create, claim, finalize, list.

use fastbreak_core::errors::StorageError;
use fastbreak_core::types::{
    ArtifactSnapshot, JobStatus, PolicyMetrics, PolicyThresholds, ReasonCode, RetrainJob,
    RetrainReason, RollbackPlan, RunDetails, TerminalStatus,
};
use fastbreak_storage::queries::jobs::{self, NewJob};
use fastbreak_storage::schema;
use rusqlite::Connection;

fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    schema::provision(&conn).unwrap();
    conn
}

fn queue_job(conn: &Connection, season: &str, created_at: i64) -> RetrainJob {
    let reasons = vec![RetrainReason {
        code: ReasonCode::AccuracyBreach,
        detail: "accuracy 0.500 < 0.550".to_string(),
    }];
    let metrics = PolicyMetrics {
        completed_items: 180,
        evaluated_predictions: 120,
        new_labels_pending: 60,
        accuracy: Some(0.50),
        brier_score: Some(0.22),
    };
    let thresholds = PolicyThresholds {
        accuracy_min: 0.55,
        brier_max: 0.25,
        new_labels_min: 40,
    };
    jobs::insert(
        conn,
        &NewJob {
            season,
            trigger_source: "policy",
            reasons: &reasons,
            metrics: &metrics,
            thresholds: &thresholds,
            artifact_snapshot: &ArtifactSnapshot::default(),
            rollback_plan: &RollbackPlan::default(),
            created_at,
        },
    )
    .unwrap()
}

#[test]
fn create_returns_queued_job_with_payloads() {
    let conn = setup_db();
    let job = queue_job(&conn, "2025-26", 1_700_000_000);

    assert!(job.id > 0);
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.trigger_source, "policy");
    assert_eq!(job.reasons.len(), 1);
    assert_eq!(job.reasons[0].code, ReasonCode::AccuracyBreach);
    assert_eq!(job.metrics.new_labels_pending, 60);
    assert_eq!(job.thresholds.unwrap().accuracy_min, 0.55);
    assert_eq!(job.rollback_plan.strategy, "revert to previous artifact");
    assert!(job.started_at.is_none());
    assert!(job.completed_at.is_none());
    assert_eq!(job.created_at, 1_700_000_000);
    assert_eq!(job.updated_at, 1_700_000_000);
}

#[test]
fn full_lifecycle_roundtrip() {
    let conn = setup_db();
    let created = queue_job(&conn, "2025-26", 1_700_000_000);

    let claimed = jobs::claim_next(&conn, None, 1_700_000_100).unwrap().unwrap();
    assert_eq!(claimed.id, created.id);
    assert_eq!(claimed.status, JobStatus::Running);
    assert_eq!(claimed.started_at, Some(1_700_000_100));

    let finalized = jobs::finalize(
        &conn,
        claimed.id,
        TerminalStatus::Completed,
        &RunDetails::simulate(),
        None,
        &ArtifactSnapshot::default(),
        1_700_000_200,
    )
    .unwrap();
    assert_eq!(finalized.status, JobStatus::Completed);
    assert_eq!(finalized.completed_at, Some(1_700_000_200));

    let listed = jobs::list(&conn, "2025-26", 10).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, JobStatus::Completed);
    assert!(listed[0].started_at.is_some());
    assert!(listed[0].completed_at.is_some());
    let run_details = listed[0].run_details.as_ref().unwrap();
    assert!(run_details.note.is_some());
}

#[test]
fn claim_takes_oldest_queued_first() {
    let conn = setup_db();
    queue_job(&conn, "2023-24", 1_700_000_300);
    let oldest = queue_job(&conn, "2024-25", 1_700_000_100);
    queue_job(&conn, "2025-26", 1_700_000_200);

    let claimed = jobs::claim_next(&conn, None, 1_700_001_000).unwrap().unwrap();
    assert_eq!(claimed.id, oldest.id);
}

#[test]
fn claim_respects_season_filter() {
    let conn = setup_db();
    queue_job(&conn, "2024-25", 1_700_000_000);
    let wanted = queue_job(&conn, "2025-26", 1_700_000_500);

    let claimed = jobs::claim_next(&conn, Some("2025-26"), 1_700_001_000)
        .unwrap()
        .unwrap();
    assert_eq!(claimed.id, wanted.id);
    assert_eq!(claimed.season, "2025-26");
}

#[test]
fn claim_on_empty_queue_returns_none() {
    let conn = setup_db();
    assert!(jobs::claim_next(&conn, None, 1_700_000_000).unwrap().is_none());
}

#[test]
fn claimed_job_is_not_claimable_again() {
    let conn = setup_db();
    queue_job(&conn, "2025-26", 1_700_000_000);

    assert!(jobs::claim_next(&conn, None, 1_700_000_100).unwrap().is_some());
    assert!(jobs::claim_next(&conn, None, 1_700_000_200).unwrap().is_none());
}

#[test]
fn finalize_unknown_job_reports_not_found() {
    let conn = setup_db();
    let err = jobs::finalize(
        &conn,
        9999,
        TerminalStatus::Completed,
        &RunDetails::simulate(),
        None,
        &ArtifactSnapshot::default(),
        1_700_000_000,
    )
    .unwrap_err();
    assert!(matches!(err, StorageError::JobNotFound { id: 9999 }));
}

#[test]
fn finalize_terminal_job_is_rejected() {
    let conn = setup_db();
    let job = queue_job(&conn, "2025-26", 1_700_000_000);
    jobs::claim_next(&conn, None, 1_700_000_100).unwrap().unwrap();
    jobs::finalize(
        &conn,
        job.id,
        TerminalStatus::Completed,
        &RunDetails::simulate(),
        None,
        &ArtifactSnapshot::default(),
        1_700_000_200,
    )
    .unwrap();

    let err = jobs::finalize(
        &conn,
        job.id,
        TerminalStatus::Failed,
        &RunDetails::simulate(),
        Some("late failure"),
        &ArtifactSnapshot::default(),
        1_700_000_300,
    )
    .unwrap_err();
    match err {
        StorageError::JobNotFinalizable { id, status } => {
            assert_eq!(id, job.id);
            assert_eq!(status, "completed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn finalize_unclaimed_job_is_rejected() {
    let conn = setup_db();
    let job = queue_job(&conn, "2025-26", 1_700_000_000);

    let err = jobs::finalize(
        &conn,
        job.id,
        TerminalStatus::Completed,
        &RunDetails::simulate(),
        None,
        &ArtifactSnapshot::default(),
        1_700_000_100,
    )
    .unwrap_err();
    match err {
        StorageError::JobNotFinalizable { status, .. } => assert_eq!(status, "queued"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn finalize_failed_records_error_message() {
    let conn = setup_db();
    let job = queue_job(&conn, "2025-26", 1_700_000_000);
    jobs::claim_next(&conn, None, 1_700_000_100).unwrap().unwrap();

    let failed = jobs::finalize(
        &conn,
        job.id,
        TerminalStatus::Failed,
        &RunDetails::simulate(),
        Some("trainer exploded"),
        &ArtifactSnapshot::default(),
        1_700_000_200,
    )
    .unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.error.as_deref(), Some("trainer exploded"));
}

#[test]
fn find_recent_active_honors_window() {
    let conn = setup_db();
    let now = 1_700_000_000;
    let job = queue_job(&conn, "2025-26", now - 13 * 3600);

    // 13 hours old: outside a 12h window, inside a 24h window.
    assert!(jobs::find_recent_active(&conn, "2025-26", 12, now)
        .unwrap()
        .is_none());
    let found = jobs::find_recent_active(&conn, "2025-26", 24, now)
        .unwrap()
        .unwrap();
    assert_eq!(found.id, job.id);
}

#[test]
fn find_recent_active_ignores_terminal_jobs() {
    let conn = setup_db();
    let now = 1_700_000_000;
    let job = queue_job(&conn, "2025-26", now - 600);
    jobs::claim_next(&conn, None, now - 500).unwrap().unwrap();
    jobs::finalize(
        &conn,
        job.id,
        TerminalStatus::Completed,
        &RunDetails::simulate(),
        None,
        &ArtifactSnapshot::default(),
        now - 400,
    )
    .unwrap();

    assert!(jobs::find_recent_active(&conn, "2025-26", 12, now)
        .unwrap()
        .is_none());
}

#[test]
fn second_active_job_per_season_is_rejected() {
    let conn = setup_db();
    let first = queue_job(&conn, "2025-26", 1_700_000_000);

    let reasons: Vec<RetrainReason> = Vec::new();
    let metrics = PolicyMetrics::default();
    let thresholds = PolicyThresholds {
        accuracy_min: 0.55,
        brier_max: 0.25,
        new_labels_min: 40,
    };
    let err = jobs::insert(
        &conn,
        &NewJob {
            season: "2025-26",
            trigger_source: "policy",
            reasons: &reasons,
            metrics: &metrics,
            thresholds: &thresholds,
            artifact_snapshot: &ArtifactSnapshot::default(),
            rollback_plan: &RollbackPlan::default(),
            created_at: 1_700_000_100,
        },
    )
    .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateActiveJob { .. }));

    // Once the first job is terminal the season can queue again.
    jobs::claim_next(&conn, None, 1_700_000_200).unwrap().unwrap();
    jobs::finalize(
        &conn,
        first.id,
        TerminalStatus::Completed,
        &RunDetails::simulate(),
        None,
        &ArtifactSnapshot::default(),
        1_700_000_300,
    )
    .unwrap();
    queue_job(&conn, "2025-26", 1_700_000_400);
    assert_eq!(jobs::count(&conn).unwrap(), 2);
}

#[test]
fn list_is_most_recent_first_with_limit() {
    let conn = setup_db();
    for i in 0..3 {
        let job = queue_job(&conn, "2025-26", 1_700_000_000 + i * 1000);
        jobs::claim_next(&conn, None, 1_700_000_100 + i * 1000)
            .unwrap()
            .unwrap();
        jobs::finalize(
            &conn,
            job.id,
            TerminalStatus::Completed,
            &RunDetails::simulate(),
            None,
            &ArtifactSnapshot::default(),
            1_700_000_200 + i * 1000,
        )
        .unwrap();
    }

    let listed = jobs::list(&conn, "2025-26", 2).unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].created_at > listed[1].created_at);
}
