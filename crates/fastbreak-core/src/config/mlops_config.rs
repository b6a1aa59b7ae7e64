//! MLOps configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::{MonitorThresholds, PolicyThresholds};

/// Model-quality alert thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Alert when live accuracy drops below this.
    pub accuracy_min: f64,
    /// Alert when the Brier score rises above this.
    pub brier_max: f64,
    /// Alert when game data or pipeline syncs are older than this.
    pub freshness_days_max: i64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            accuracy_min: 0.55,
            brier_max: 0.25,
            freshness_days_max: 3,
        }
    }
}

/// Retrain policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Minimum newly labeled games before a label-driven retrain.
    pub new_labels_min: i64,
    /// Duplicate-guard window: no second enqueue for a season while an
    /// active job created within this many hours exists.
    pub duplicate_window_hours: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            new_labels_min: 40,
            duplicate_window_hours: 12,
        }
    }
}

/// Monitoring evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// How many trailing snapshots the alert engine scans for breach streaks.
    pub streak_lookback: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { streak_lookback: 30 }
    }
}

/// Model artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory holding the served model files.
    pub model_dir: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
        }
    }
}

/// Top-level MLOps configuration.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`FASTBREAK_*`)
/// 2. Config file (`fastbreak.toml`)
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MlopsConfig {
    pub thresholds: ThresholdConfig,
    pub policy: PolicyConfig,
    pub monitor: MonitorConfig,
    pub artifacts: ArtifactConfig,
}

impl MlopsConfig {
    /// Load configuration from `fastbreak.toml` under `root` (if present),
    /// then apply environment overrides and validate.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = root.join("fastbreak.toml");
        if path.exists() {
            let content =
                std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })?;
            config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply environment variable overrides.
    /// Pattern: `FASTBREAK_ACCURACY_MIN`, `FASTBREAK_NEW_LABELS_MIN`, etc.
    fn apply_env_overrides(config: &mut MlopsConfig) {
        if let Ok(val) = std::env::var("FASTBREAK_ACCURACY_MIN") {
            if let Ok(v) = val.parse::<f64>() {
                config.thresholds.accuracy_min = v;
            }
        }
        if let Ok(val) = std::env::var("FASTBREAK_BRIER_MAX") {
            if let Ok(v) = val.parse::<f64>() {
                config.thresholds.brier_max = v;
            }
        }
        if let Ok(val) = std::env::var("FASTBREAK_FRESHNESS_DAYS_MAX") {
            if let Ok(v) = val.parse::<i64>() {
                config.thresholds.freshness_days_max = v;
            }
        }
        if let Ok(val) = std::env::var("FASTBREAK_NEW_LABELS_MIN") {
            if let Ok(v) = val.parse::<i64>() {
                config.policy.new_labels_min = v;
            }
        }
        if let Ok(val) = std::env::var("FASTBREAK_DUPLICATE_WINDOW_HOURS") {
            if let Ok(v) = val.parse::<i64>() {
                config.policy.duplicate_window_hours = v;
            }
        }
        if let Ok(val) = std::env::var("FASTBREAK_STREAK_LOOKBACK") {
            if let Ok(v) = val.parse::<usize>() {
                config.monitor.streak_lookback = v;
            }
        }
        if let Ok(val) = std::env::var("FASTBREAK_MODEL_DIR") {
            config.artifacts.model_dir = PathBuf::from(val);
        }
    }

    /// Validate the configuration values.
    pub fn validate(config: &MlopsConfig) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&config.thresholds.accuracy_min) {
            return Err(ConfigError::ValidationFailed {
                field: "thresholds.accuracy_min".to_string(),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&config.thresholds.brier_max) {
            return Err(ConfigError::ValidationFailed {
                field: "thresholds.brier_max".to_string(),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if config.thresholds.freshness_days_max < 0 {
            return Err(ConfigError::ValidationFailed {
                field: "thresholds.freshness_days_max".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        if config.policy.new_labels_min < 1 {
            return Err(ConfigError::ValidationFailed {
                field: "policy.new_labels_min".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if config.policy.duplicate_window_hours < 1 {
            return Err(ConfigError::ValidationFailed {
                field: "policy.duplicate_window_hours".to_string(),
                message: "must be at least 1 hour".to_string(),
            });
        }
        if config.monitor.streak_lookback == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "monitor.streak_lookback".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// The thresholds captured into monitoring snapshots.
    pub fn monitor_thresholds(&self) -> MonitorThresholds {
        MonitorThresholds {
            accuracy_min: self.thresholds.accuracy_min,
            brier_max: self.thresholds.brier_max,
            freshness_days_max: self.thresholds.freshness_days_max,
        }
    }

    /// The thresholds captured into retrain decisions.
    pub fn policy_thresholds(&self) -> PolicyThresholds {
        PolicyThresholds {
            accuracy_min: self.thresholds.accuracy_min,
            brier_max: self.thresholds.brier_max,
            new_labels_min: self.policy.new_labels_min,
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
