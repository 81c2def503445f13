//! Error taxonomy for progress operations.

use quizprep_storage::StorageError;

/// Error type for progress operations.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Errors that can occur while tracking progress.
///
/// None of these are retried or swallowed here; retry policy belongs to the
/// calling layer.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// The persistence layer failed; the profile is left at its last-saved state.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The referenced learning path does not exist in the profile.
    #[error("learning path not found: {0}")]
    PathNotFound(String),

    /// A module or topic index is outside the path's bounds.
    #[error("module {module} / topic {topic} out of bounds for path {path_id}")]
    OutOfBounds {
        /// Path being addressed
        path_id: String,
        /// Offending module index
        module: usize,
        /// Offending topic index
        topic: usize,
    },

    /// The declared time budget yields a non-positive effective daily rate.
    #[error("invalid time budget: effective daily hours must be positive, got {0}")]
    InvalidTimeBudget(f64),
}
