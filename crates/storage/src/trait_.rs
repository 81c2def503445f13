//! Store trait abstraction.

use async_trait::async_trait;
use quizprep_core::{QuizAttempt, UserProfile};

/// Error type for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error while writing
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The user id cannot name a record in this backend.
    #[error("invalid user id: {0:?}")]
    InvalidId(String),

    /// A stored record failed to parse. This is surfaced as-is and never
    /// coerced to empty data.
    #[error("corrupt stored record ({record}): {detail}")]
    Corrupt {
        /// Which record set / key the bad data belongs to
        record: String,
        /// Parser message
        detail: String,
    },
}

impl StorageError {
    /// Build a `Corrupt` error for a named record.
    pub fn corrupt(record: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        StorageError::Corrupt {
            record: record.into(),
            detail: detail.to_string(),
        }
    }
}

/// Durable persistence for user profiles and quiz-attempt history.
///
/// Writes are read-modify-write cycles with no version check: the design
/// assumes at most one active writer per `user_id` at a time. Concurrent
/// writers for the same user can lose updates (last write wins). Operations
/// for different users are fully independent.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load the profile for `user_id`, creating one with default preferences
    /// if none exists. Absence is not an error for this operation.
    async fn load(&self, user_id: &str) -> Result<UserProfile>;

    /// Persist the full profile: preferences plus an upsert of every learning
    /// path, progress record, and quiz result. Safe to call repeatedly with
    /// unchanged data.
    async fn save(&self, profile: &UserProfile) -> Result<()>;

    /// Existence check for login-style flows.
    async fn exists(&self, user_id: &str) -> Result<bool>;

    /// Append one submitted quiz attempt to the user's history.
    async fn record_attempt(&self, user_id: &str, attempt: &QuizAttempt) -> Result<()>;

    /// List the user's quiz attempts, newest first.
    async fn list_attempts(&self, user_id: &str) -> Result<Vec<QuizAttempt>>;
}
