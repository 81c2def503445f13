//! Quiz result recording.

use chrono::Utc;
use quizprep_core::{topic_id, QuizResult, UserProfile};
use quizprep_storage::ProfileStore;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ProgressError, Result};
use crate::tracker::ProgressTracker;

/// Records quiz attempts against a (path, module, topic) key.
///
/// Passing a topic's quiz is the sole signal that marks the topic complete;
/// no other pathway advances progress.
pub struct QuizResultRecorder<S: ProfileStore> {
    store: Arc<S>,
    tracker: ProgressTracker<S>,
}

impl<S: ProfileStore> QuizResultRecorder<S> {
    /// Create a new recorder over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            tracker: ProgressTracker::new(Arc::clone(&store)),
            store,
        }
    }

    /// Upsert the quiz result for one topic, then advance progress if the
    /// score passes.
    ///
    /// Persists once for the result and, on a pass, again for the progress
    /// update. If the progress save fails after the result save succeeded,
    /// the error propagates; the partial write is not masked.
    pub async fn record_result(
        &self,
        profile: &mut UserProfile,
        path_id: &str,
        module_index: usize,
        topic_index: usize,
        score: f64,
    ) -> Result<()> {
        let path = profile
            .learning_paths
            .get(path_id)
            .ok_or_else(|| ProgressError::PathNotFound(path_id.to_string()))?;
        let in_bounds = path
            .modules
            .get(module_index)
            .is_some_and(|m| topic_index < m.topics.len());
        if !in_bounds {
            return Err(ProgressError::OutOfBounds {
                path_id: path_id.to_string(),
                module: module_index,
                topic: topic_index,
            });
        }

        let result = QuizResult::new(score, Utc::now());
        let passed = result.passed;
        profile
            .quiz_results
            .entry(path_id.to_string())
            .or_default()
            .insert(topic_id(module_index, topic_index), result);
        self.store.save(profile).await?;
        debug!(path_id, module_index, topic_index, score, passed, "quiz result recorded");

        if passed {
            self.tracker
                .update_progress(profile, path_id, module_index, topic_index, true)
                .await?;
        }
        Ok(())
    }
}
