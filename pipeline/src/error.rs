//! Error types for report pipeline operations.
//!
//! The extraction engine itself never fails; these cover the outer layers:
//! reading input, parsing configuration, running the worker pool and writing
//! the report.

use thiserror::Error;

/// Errors that can occur while loading input or emitting a report.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Input parsed but is not a non-empty list of host records.
    #[error("{0}")]
    InvalidInput(String),

    /// The worker pool could not be built.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Convenience alias for results with [`PipelineError`].
pub type Result<T> = std::result::Result<T, PipelineError>;
