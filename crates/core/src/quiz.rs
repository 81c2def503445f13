//! Quiz models - questions, per-topic results, and attempt history.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Time;

/// Minimum score (out of 100) that counts as passing.
pub const PASS_THRESHOLD: f64 = 70.0;

/// Question difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Warm-up / recall questions
    Easy,
    /// Applied questions
    Medium,
    /// Scenario questions
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// One multiple-choice question as produced by a question generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Question text
    pub question: String,

    /// Exactly four options
    pub options: Vec<String>,

    /// Index of the correct option (0-3)
    pub correct_option: usize,

    /// Why the correct answer is right
    pub explanation: String,

    /// Difficulty level
    pub difficulty: Difficulty,
}

/// The recorded outcome of a quiz for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Score 0-100
    pub score: f64,

    /// Always exactly `score >= PASS_THRESHOLD`
    pub passed: bool,

    /// When the result was recorded
    pub timestamp: Time,
}

impl QuizResult {
    /// Build a result; `passed` is derived from the score, never supplied.
    pub fn new(score: f64, now: Time) -> Self {
        Self {
            score,
            passed: score >= PASS_THRESHOLD,
            timestamp: now,
        }
    }
}

/// One submitted quiz attempt, kept as append-only history per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    /// Subject/topic the quiz was generated for
    pub subject: String,

    /// Number of easy questions in the quiz
    pub easy_count: u32,

    /// Number of medium questions in the quiz
    pub medium_count: u32,

    /// Number of hard questions in the quiz
    pub hard_count: u32,

    /// Score 0-100
    pub score: f64,

    /// Whether the attempt passed
    pub passed: bool,

    /// When the attempt was submitted
    pub timestamp: Time,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn passed_is_derived_from_score() {
        assert!(QuizResult::new(70.0, Utc::now()).passed);
        assert!(QuizResult::new(85.5, Utc::now()).passed);
        assert!(!QuizResult::new(69.9, Utc::now()).passed);
        assert!(!QuizResult::new(0.0, Utc::now()).passed);
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Easy).unwrap(), "\"easy\"");
        let d: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
    }
}
