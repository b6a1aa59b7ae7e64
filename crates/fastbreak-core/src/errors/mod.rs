//! Error handling for Fastbreak.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod monitor_error;
pub mod policy_error;
pub mod source_error;
pub mod storage_error;
pub mod training_error;
pub mod worker_error;

pub use config_error::ConfigError;
pub use monitor_error::MonitorError;
pub use policy_error::PolicyError;
pub use source_error::SourceError;
pub use storage_error::StorageError;
pub use training_error::TrainingError;
pub use worker_error::WorkerError;
