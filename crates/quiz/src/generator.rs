//! Question generation capability.

use async_trait::async_trait;
use quizprep_core::{Difficulty, Question};
use tracing::debug;

/// Errors from a question source.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The backing source could not produce questions.
    #[error("question source unavailable: {0}")]
    Unavailable(String),
}

/// Produces categorized multiple-choice questions for a topic.
///
/// May be backed by a model call or a deterministic fallback; the core does
/// not distinguish them.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Generate `easy + medium + hard` questions for `topic`, ordered easy
    /// first, then medium, then hard.
    async fn generate(
        &self,
        topic: &str,
        easy: u32,
        medium: u32,
        hard: u32,
    ) -> Result<Vec<Question>, GenerateError>;
}

/// Deterministic placeholder generator used when no model is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    fn batch(topic: &str, difficulty: Difficulty, count: u32) -> impl Iterator<Item = Question> + '_ {
        // One recognizable correct slot per difficulty: 0 / 1 / 2.
        let (label, correct_option) = match difficulty {
            Difficulty::Easy => ("Easy", 0),
            Difficulty::Medium => ("Medium", 1),
            Difficulty::Hard => ("Hard", 2),
        };
        (1..=count).map(move |i| Question {
            question: format!("{} Question {} about {}?", label, i, topic),
            options: vec![
                "Option A".to_string(),
                "Option B".to_string(),
                "Option C".to_string(),
                "Option D".to_string(),
            ],
            correct_option,
            explanation: format!("Explanation for {} Question {}", label, i),
            difficulty,
        })
    }
}

#[async_trait]
impl QuestionGenerator for FallbackGenerator {
    async fn generate(
        &self,
        topic: &str,
        easy: u32,
        medium: u32,
        hard: u32,
    ) -> Result<Vec<Question>, GenerateError> {
        let mut questions = Vec::with_capacity((easy + medium + hard) as usize);
        questions.extend(Self::batch(topic, Difficulty::Easy, easy));
        questions.extend(Self::batch(topic, Difficulty::Medium, medium));
        questions.extend(Self::batch(topic, Difficulty::Hard, hard));
        debug!(topic, count = questions.len(), "generated fallback questions");
        Ok(questions)
    }
}
