//! Quiz generation and evaluation for quizprep.
//!
//! The question-generation capability is a trait; callers cannot tell a
//! model-backed source from the deterministic fallback.

#![warn(missing_docs)]

pub mod generator;
pub mod eval;

pub use generator::{FallbackGenerator, GenerateError, QuestionGenerator};
pub use eval::{difficulty_counts, evaluate, AnswerFeedback, QuizOutcome, UNANSWERED};
