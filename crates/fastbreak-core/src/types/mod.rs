//! Domain types shared across the Fastbreak crates.
//!
//! Every JSON payload column in the store (reasons, metrics, thresholds,
//! artifact snapshots, rollback plans, run details) is a closed struct here;
//! serialization happens only at the storage boundary.

pub mod jobs;
pub mod monitoring;
pub mod training;

pub use jobs::{
    ArtifactFile, ArtifactSnapshot, JobStatus, PolicyMetrics, PolicyThresholds, ReasonCode,
    RetrainJob, RetrainReason, RollbackPlan, RunDetails, RunMode, TerminalStatus,
};
pub use monitoring::{
    Alert, AuditStatus, EscalationLevel, EscalationState, ModelMetrics, MonitorThresholds,
    MonitoringSnapshot, Severity, SnapshotDetails, TrendPoint,
};
pub use training::{EnsembleScores, ModelScores, TrainingOutput, TrainingSummary};
