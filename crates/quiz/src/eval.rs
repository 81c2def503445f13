//! Quiz evaluation - scoring and per-question feedback.

use quizprep_core::{Difficulty, Question, PASS_THRESHOLD};
use serde::Serialize;

/// Sentinel answer index for a question the user never answered.
/// Unanswered questions count as incorrect.
pub const UNANSWERED: i32 = -1;

/// Feedback for one question after submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerFeedback {
    /// Question text
    pub question: String,

    /// Text of the option the user chose, or "Not answered"
    pub user_answer: String,

    /// Text of the correct option
    pub correct_answer: String,

    /// Whether the user's answer matched
    pub is_correct: bool,

    /// Why the correct answer is right
    pub explanation: String,
}

/// The graded outcome of a submitted quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizOutcome {
    /// Score 0-100
    pub score: f64,

    /// Whether the score meets the pass threshold
    pub passed: bool,

    /// Per-question feedback, in question order
    pub feedback: Vec<AnswerFeedback>,
}

/// Grade `answers` against `questions`.
///
/// `answers[i]` is the chosen option index for question `i`, or `UNANSWERED`.
/// Answers beyond the question list are ignored; missing answers count as
/// unanswered.
pub fn evaluate(questions: &[Question], answers: &[i32]) -> QuizOutcome {
    let mut correct = 0usize;
    let mut feedback = Vec::with_capacity(questions.len());

    for (i, question) in questions.iter().enumerate() {
        let answer = answers.get(i).copied().unwrap_or(UNANSWERED);
        let chosen = usize::try_from(answer)
            .ok()
            .and_then(|idx| question.options.get(idx));
        // A generator may emit a correct_option past the option list; treat
        // such a question as unanswerable rather than indexing out of range.
        let correct_text = question.options.get(question.correct_option);
        let is_correct = correct_text.is_some()
            && answer >= 0
            && answer as usize == question.correct_option;
        if is_correct {
            correct += 1;
        }
        feedback.push(AnswerFeedback {
            question: question.question.clone(),
            user_answer: chosen
                .cloned()
                .unwrap_or_else(|| "Not answered".to_string()),
            correct_answer: correct_text.cloned().unwrap_or_default(),
            is_correct,
            explanation: question.explanation.clone(),
        });
    }

    let score = if questions.is_empty() {
        0.0
    } else {
        correct as f64 / questions.len() as f64 * 100.0
    };

    QuizOutcome {
        score,
        passed: score >= PASS_THRESHOLD,
        feedback,
    }
}

/// Count questions per difficulty, in (easy, medium, hard) order.
pub fn difficulty_counts(questions: &[Question]) -> (u32, u32, u32) {
    let mut counts = (0, 0, 0);
    for question in questions {
        match question.difficulty {
            Difficulty::Easy => counts.0 += 1,
            Difficulty::Medium => counts.1 += 1,
            Difficulty::Hard => counts.2 += 1,
        }
    }
    counts
}
