//! quizprep core data models.
//!
//! This crate defines the durable state owned by one user identifier:
//! preferences, learning paths, per-path progress, and quiz results.

#![warn(missing_docs)]

// Profile aggregate
mod profile;

// Curriculum structure
mod path;

// Progress and assessment
mod progress;
mod quiz;

// Re-exports
pub use profile::{
    EstimateRecord, Milestone, Preferences, TimeConstraints, Timeline, UserProfile,
};
pub use path::{topic_id, LearningPath, Module};
pub use progress::ProgressRecord;
pub use quiz::{Difficulty, Question, QuizAttempt, QuizResult, PASS_THRESHOLD};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
