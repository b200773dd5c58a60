//! Error types for boxnms.

use thiserror::Error;

/// Result alias for boxnms operations.
pub type NmsResult<T> = std::result::Result<T, NmsError>;

/// Errors that can occur when running suppression.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NmsError {
    /// The score slice is not index-aligned with the boxes.
    #[error("score length {scores} does not match box count {boxes}")]
    ScoreLengthMismatch { boxes: usize, scores: usize },
    /// A flat coordinate buffer does not hold whole boxes.
    #[error("flat box buffer length {len} is not a multiple of 4")]
    FlatBufferLength { len: usize },
    /// The overlap threshold is NaN, or outside [0, 1] when strict validation is on.
    #[error("invalid overlap threshold {threshold}")]
    InvalidThreshold { threshold: f32 },
    /// Parallel execution was requested but the `rayon` feature is disabled.
    #[error("parallel execution requested but the `rayon` feature is not enabled")]
    ParallelUnavailable,
    /// A dedicated worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}
