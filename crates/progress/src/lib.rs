//! Progress tracking for quizprep.
//!
//! Learning-path progress, quiz-result recording, and timeline estimation
//! over a profile store.

#![warn(missing_docs)]

pub mod error;
pub mod tracker;
pub mod recorder;
pub mod timeline;

pub use error::{ProgressError, Result};
pub use tracker::{ProgressSummary, ProgressTracker};
pub use recorder::QuizResultRecorder;
pub use timeline::{parse_estimated_time, TimelineEstimator, TimelineStatus};
