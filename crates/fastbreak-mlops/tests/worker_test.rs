//! Tests for the retrain worker: simulate, execute, failure, noop.

mod common;

use std::sync::Arc;

use common::FakeTrainer;
use fastbreak_core::types::{
    JobStatus, PolicyMetrics, PolicyThresholds, RetrainReason, RunMode, TerminalStatus,
};
use fastbreak_mlops::{PredictorHandle, RetrainQueue, RetrainWorker, WorkerStatus};
use fastbreak_storage::queries::audit;
use fastbreak_storage::DatabaseManager;

fn setup(trainer: FakeTrainer) -> (Arc<DatabaseManager>, RetrainQueue, RetrainWorker<FakeTrainer>) {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    let model_dir = std::env::temp_dir().join("fastbreak-worker-test-models-missing");
    let queue = RetrainQueue::new(Arc::clone(&db), model_dir.clone());
    let worker_queue = RetrainQueue::new(Arc::clone(&db), model_dir);
    let worker = RetrainWorker::new(Arc::clone(&db), worker_queue, trainer);
    (db, queue, worker)
}

fn queue_job(queue: &RetrainQueue, season: &str) -> i64 {
    let reasons: Vec<RetrainReason> = Vec::new();
    let metrics = PolicyMetrics::default();
    let thresholds = PolicyThresholds {
        accuracy_min: 0.55,
        brier_max: 0.25,
        new_labels_min: 40,
    };
    queue
        .create(season, "policy", &reasons, &metrics, &thresholds)
        .unwrap()
        .id
}

#[test]
fn empty_queue_is_a_noop() {
    let (_db, _queue, worker) = setup(FakeTrainer::Succeed);
    let outcome = worker.process_next(None, false).unwrap();
    assert_eq!(outcome.status, WorkerStatus::Noop);
    assert!(outcome.job.is_none());
    assert!(outcome.run_details.is_none());
}

#[test]
fn simulate_completes_without_training() {
    // FakeTrainer::Fail proves the trainer is never invoked in simulate mode.
    let (_db, queue, worker) = setup(FakeTrainer::Fail("must not run".to_string()));
    let id = queue_job(&queue, "2025-26");

    let outcome = worker.process_next(None, false).unwrap();
    assert_eq!(outcome.status, WorkerStatus::Completed);

    let details = outcome.run_details.unwrap();
    assert_eq!(details.mode, RunMode::Simulate);
    assert!(details.training_summary.is_none());

    let job = outcome.job.unwrap();
    assert_eq!(job.id, id);
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.started_at.is_some());
    assert!(job.completed_at.is_some());

    // The processed job is visible through the history listing.
    let listed = queue.list("2025-26", 10).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, JobStatus::Completed);
    assert!(listed[0].run_details.is_some());
}

#[test]
fn execute_summarizes_per_model_metrics() {
    let (db, queue, worker) = setup(FakeTrainer::Succeed);
    queue_job(&queue, "2025-26");

    let outcome = worker.process_next(Some("2025-26"), true).unwrap();
    assert_eq!(outcome.status, WorkerStatus::Completed);

    let details = outcome.run_details.unwrap();
    assert_eq!(details.mode, RunMode::Execute);
    let summary = details.training_summary.unwrap();
    assert_eq!(summary.logistic_regression.cv_accuracy, Some(0.61));
    assert_eq!(summary.xgboost.cv_auc, Some(0.67));
    // Models the trainer skipped summarize to empty scores.
    assert!(summary.lightgbm.cv_accuracy.is_none());
    assert_eq!(summary.ensemble.brier_score, Some(0.19));

    let rows = db
        .read_with_bootstrap(|conn| audit::recent(conn, Some("retrain_worker"), 10))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, "success");
}

#[test]
fn training_failure_finalizes_failed_without_raising() {
    let (db, queue, worker) = setup(FakeTrainer::Fail("feature matrix empty".to_string()));
    queue_job(&queue, "2025-26");

    let outcome = worker.process_next(None, true).unwrap();
    assert_eq!(outcome.status, WorkerStatus::Failed);
    assert!(outcome.message.contains("feature matrix empty"));

    let job = outcome.job.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.as_deref().unwrap().contains("feature matrix empty"));
    assert!(job.completed_at.is_some());

    let rows = db
        .read_with_bootstrap(|conn| audit::recent(conn, Some("retrain_worker"), 10))
        .unwrap();
    assert_eq!(rows[0].status, "failed");
    assert!(rows[0].errors.as_deref().unwrap().contains("feature matrix empty"));
}

#[test]
fn failed_jobs_are_never_auto_retried() {
    let (_db, queue, worker) = setup(FakeTrainer::Fail("boom".to_string()));
    queue_job(&queue, "2025-26");

    assert_eq!(
        worker.process_next(None, true).unwrap().status,
        WorkerStatus::Failed
    );
    // The failed job stays terminal; nothing is claimable.
    assert_eq!(
        worker.process_next(None, true).unwrap().status,
        WorkerStatus::Noop
    );
}

#[test]
fn season_filter_skips_other_seasons() {
    let (_db, queue, worker) = setup(FakeTrainer::Succeed);
    queue_job(&queue, "2024-25");

    let outcome = worker.process_next(Some("2025-26"), false).unwrap();
    assert_eq!(outcome.status, WorkerStatus::Noop);

    let outcome = worker.process_next(Some("2024-25"), false).unwrap();
    assert_eq!(outcome.status, WorkerStatus::Completed);
}

#[test]
fn execute_marks_the_predictor_stale() {
    let (db, queue, _) = setup(FakeTrainer::Succeed);
    let model_dir = std::env::temp_dir().join("fastbreak-worker-test-models-missing");
    let worker_queue = RetrainQueue::new(Arc::clone(&db), model_dir);
    let predictor = Arc::new(PredictorHandle::new());
    predictor.mark_loaded(1_700_000_000);

    let worker = RetrainWorker::new(Arc::clone(&db), worker_queue, FakeTrainer::Succeed)
        .with_predictor(Arc::clone(&predictor));

    queue_job(&queue, "2025-26");
    assert!(!predictor.is_stale());
    worker.process_next(None, true).unwrap();
    assert!(predictor.is_stale());

    // An explicit reload clears the flag and bumps the generation.
    predictor.mark_loaded(1_700_000_100);
    assert!(!predictor.is_stale());
    assert_eq!(predictor.generation(), 2);
}

#[test]
fn simulate_leaves_the_predictor_alone() {
    let (db, queue, _) = setup(FakeTrainer::Succeed);
    let model_dir = std::env::temp_dir().join("fastbreak-worker-test-models-missing");
    let worker_queue = RetrainQueue::new(Arc::clone(&db), model_dir);
    let predictor = Arc::new(PredictorHandle::new());
    predictor.mark_loaded(1_700_000_000);

    let worker = RetrainWorker::new(Arc::clone(&db), worker_queue, FakeTrainer::Succeed)
        .with_predictor(Arc::clone(&predictor));

    queue_job(&queue, "2025-26");
    worker.process_next(None, false).unwrap();
    assert!(!predictor.is_stale());
}

#[test]
fn worker_refreshes_artifact_snapshot_at_finalize() {
    let db = Arc::new(DatabaseManager::open_in_memory().unwrap());
    let model_dir = tempfile::tempdir().unwrap();
    let queue = RetrainQueue::new(Arc::clone(&db), model_dir.path());

    // No artifacts at creation time.
    let id = queue_job(&queue, "2025-26");
    let created = queue.find_by_id(id).unwrap().unwrap();
    assert!(created.artifact_snapshot.files.is_empty());

    // Training drops a model file before the job finalizes.
    std::fs::write(model_dir.path().join("ensemble.bin"), b"weights").unwrap();
    let claimed = queue.claim_next(None).unwrap().unwrap();
    let finalized = queue
        .finalize(
            claimed.id,
            TerminalStatus::Completed,
            &fastbreak_core::types::RunDetails::simulate(),
            None,
        )
        .unwrap();

    assert!(finalized.artifact_snapshot.available);
    assert_eq!(finalized.artifact_snapshot.files.len(), 1);
    assert_eq!(finalized.artifact_snapshot.files[0].name, "ensemble.bin");
}
