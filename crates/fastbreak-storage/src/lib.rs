//! fastbreak-storage — SQLite persistence for the Fastbreak MLOps engine.
//!
//! Three tables: `monitoring_snapshots` (append-only evaluation log),
//! `retrain_jobs` (durable job queue with a strict state machine), and
//! `audit_log` (shared observability sink). Schemas are provisioned lazily
//! and idempotently; operations hitting a missing table bootstrap the schema
//! and retry exactly once.

pub mod connection;
pub mod queries;
pub mod schema;

mod classify;

pub use connection::DatabaseManager;
