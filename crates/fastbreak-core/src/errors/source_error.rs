//! Metrics source errors.

/// Errors surfaced by the external metrics source.
/// These propagate to the caller unmodified — no silent zero-fill.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Metrics source unavailable: {message}")]
    Unavailable { message: String },

    #[error("Metrics query failed: {message}")]
    Query { message: String },
}
