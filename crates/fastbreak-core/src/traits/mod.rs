//! Seams to the external collaborators: the metrics source and the
//! training routine. Fastbreak never imports the serving or ingestion code.

pub mod metrics_source;
pub mod trainer;

pub use metrics_source::{EvaluatedOutcome, MetricsSource};
pub use trainer::Trainer;
