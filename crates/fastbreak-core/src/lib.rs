//! fastbreak-core — core types, traits, errors, config, and tracing for the
//! Fastbreak MLOps engine.
//!
//! This crate is dependency-light by design: the storage and engine crates
//! build on it, never the other way around.

pub mod config;
pub mod errors;
pub mod trace;
pub mod traits;
pub mod types;

/// Current unix time in whole seconds.
pub fn epoch_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
