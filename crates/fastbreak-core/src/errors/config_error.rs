//! Configuration errors.

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse configuration at {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid configuration for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}
