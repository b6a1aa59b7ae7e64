//! Tests for metrics aggregation: means, zero-row behavior, freshness.

mod common;

use common::{outcome, FakeSource};
use fastbreak_core::errors::SourceError;
use fastbreak_mlops::metrics::{compute_metrics, days_since};

const NOW: i64 = 1_700_000_000;

#[test]
fn zero_predictions_yield_none_not_nan() {
    let source = FakeSource::default();
    let metrics = compute_metrics(&source, "2025-26", NOW).unwrap();
    assert_eq!(metrics.evaluated_predictions, 0);
    assert!(metrics.accuracy.is_none());
    assert!(metrics.brier_score.is_none());
}

#[test]
fn accuracy_and_brier_are_means_over_outcomes() {
    let source = FakeSource {
        outcomes: vec![
            outcome(true, 0.7, true),
            outcome(true, 0.6, true),
            outcome(false, 0.2, false),
        ],
        ..Default::default()
    };
    let metrics = compute_metrics(&source, "2025-26", NOW).unwrap();

    assert_eq!(metrics.evaluated_predictions, 3);
    let accuracy = metrics.accuracy.unwrap();
    assert!((accuracy - 2.0 / 3.0).abs() < 1e-9);

    // (0.3^2 + 0.4^2 + 0.2^2) / 3
    let brier = metrics.brier_score.unwrap();
    assert!((brier - 0.29 / 3.0).abs() < 1e-9);
}

#[test]
fn freshness_is_whole_days_clamped_at_zero() {
    assert_eq!(days_since(NOW, NOW - 2 * 86_400 - 43_200), 2);
    assert_eq!(days_since(NOW, NOW - 86_399), 0);
    // A timestamp in the future never goes negative.
    assert_eq!(days_since(NOW, NOW + 86_400), 0);
}

#[test]
fn missing_timestamps_leave_freshness_none() {
    let source = FakeSource {
        outcomes: vec![outcome(true, 0.7, true)],
        latest_game_date: None,
        latest_pipeline_sync: Some(NOW - 4 * 86_400),
        ..Default::default()
    };
    let metrics = compute_metrics(&source, "2025-26", NOW).unwrap();
    assert!(metrics.latest_game_date.is_none());
    assert!(metrics.game_data_freshness_days.is_none());
    assert_eq!(metrics.pipeline_freshness_days, Some(4));
}

#[test]
fn source_errors_propagate_unmodified() {
    let source = FakeSource {
        fail: true,
        ..Default::default()
    };
    let err = compute_metrics(&source, "2025-26", NOW).unwrap_err();
    assert!(matches!(err, SourceError::Unavailable { .. }));
}
