//! Configuration system for Fastbreak.
//! TOML-based, layered resolution: env > config file > defaults.

pub mod mlops_config;

pub use mlops_config::{
    ArtifactConfig, MlopsConfig, MonitorConfig, PolicyConfig, ThresholdConfig,
};
