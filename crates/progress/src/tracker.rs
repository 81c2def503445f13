//! Progress tracking service.

use chrono::Utc;
use quizprep_core::{topic_id, LearningPath, ProgressRecord, Time, UserProfile};
use quizprep_storage::ProfileStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ProgressError, Result};

/// Tracks a user's movement through learning paths.
///
/// Operates on an in-memory profile snapshot and persists synchronously
/// after each mutation.
pub struct ProgressTracker<S: ProfileStore> {
    store: Arc<S>,
}

impl<S: ProfileStore> Clone for ProgressTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

/// Counts and position for one path, derived from the profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    /// Modules in the path
    pub total_modules: usize,

    /// Fully completed modules
    pub completed_modules: usize,

    /// Topics in the path
    pub total_topics: usize,

    /// Completed topics
    pub completed_topics: usize,

    /// Completed / total topics, in [0, 100]; 0 when the path has no topics
    pub percentage_complete: f64,

    /// Current module index
    pub current_module: usize,

    /// Current topic index
    pub current_topic: usize,

    /// Last time the path was touched
    pub last_accessed: Time,
}

impl<S: ProfileStore> ProgressTracker<S> {
    /// Create a new progress tracker over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Insert a learning path and a fresh progress record positioned at
    /// module 0 / topic 0, then persist.
    pub async fn add_learning_path(
        &self,
        profile: &mut UserProfile,
        path_id: &str,
        path: LearningPath,
    ) -> Result<()> {
        profile.learning_paths.insert(path_id.to_string(), path);
        profile
            .progress
            .insert(path_id.to_string(), ProgressRecord::new(Utc::now()));
        self.store.save(profile).await?;
        Ok(())
    }

    /// Update the user's position in a path, or mark a topic complete.
    ///
    /// With `completed = false` this is manual navigation: the current
    /// module/topic indices are set as given. With `completed = true` the
    /// topic is added to the completed set (idempotent), and when every
    /// topic of the module is complete the module is marked complete and
    /// the position advances to the next module if one exists.
    pub async fn update_progress(
        &self,
        profile: &mut UserProfile,
        path_id: &str,
        module_index: usize,
        topic_index: usize,
        completed: bool,
    ) -> Result<()> {
        let path = profile
            .learning_paths
            .get(path_id)
            .ok_or_else(|| ProgressError::PathNotFound(path_id.to_string()))?;

        let out_of_bounds = || ProgressError::OutOfBounds {
            path_id: path_id.to_string(),
            module: module_index,
            topic: topic_index,
        };
        let module = path.modules.get(module_index).ok_or_else(out_of_bounds)?;
        if topic_index >= module.topics.len() {
            return Err(out_of_bounds());
        }
        let module_topics = module.topics.len();
        let module_count = path.modules.len();

        let record = profile
            .progress
            .get_mut(path_id)
            .ok_or_else(|| ProgressError::PathNotFound(path_id.to_string()))?;

        if completed {
            record
                .completed_topics
                .insert(topic_id(module_index, topic_index));

            let module_done = (0..module_topics)
                .all(|i| record.completed_topics.contains(&topic_id(module_index, i)));

            // Advance only when the module flips to complete; re-completing
            // topics of an already-complete module moves nothing.
            if module_done && record.completed_modules.insert(module_index) {
                debug!(path_id, module_index, "module completed");
                if module_index + 1 < module_count {
                    record.current_module = module_index + 1;
                    record.current_topic = 0;
                }
            }
        } else {
            record.current_module = module_index;
            record.current_topic = topic_index;
        }

        record.last_accessed = Utc::now();
        self.store.save(profile).await?;
        Ok(())
    }

    /// Summarize progress for a path, or `None` if no progress exists.
    pub fn progress_summary(
        &self,
        profile: &UserProfile,
        path_id: &str,
    ) -> Option<ProgressSummary> {
        let record = profile.progress.get(path_id)?;
        let path = profile.learning_paths.get(path_id)?;

        let total_topics = path.total_topics();
        let completed_topics = record.completed_topics.len();
        let percentage_complete = if total_topics > 0 {
            completed_topics as f64 / total_topics as f64 * 100.0
        } else {
            0.0
        };

        Some(ProgressSummary {
            total_modules: path.modules.len(),
            completed_modules: record.completed_modules.len(),
            total_topics,
            completed_topics,
            percentage_complete,
            current_module: record.current_module,
            current_topic: record.current_topic,
            last_accessed: record.last_accessed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizprep_core::Module;
    use quizprep_storage::SqliteProfileStore;

    fn two_by_two_path() -> LearningPath {
        LearningPath {
            title: "Rust".to_string(),
            modules: vec![
                Module {
                    title: "Basics".to_string(),
                    topics: vec!["ownership".into(), "borrowing".into()],
                    estimated_time: "2 hours".to_string(),
                },
                Module {
                    title: "Async".to_string(),
                    topics: vec!["futures".into(), "pinning".into()],
                    estimated_time: "2 hours".to_string(),
                },
            ],
        }
    }

    async fn setup() -> (ProgressTracker<SqliteProfileStore>, UserProfile) {
        let store = Arc::new(SqliteProfileStore::in_memory().await.unwrap());
        let tracker = ProgressTracker::new(store.clone());
        let mut profile = store.load("alice").await.unwrap();
        tracker
            .add_learning_path(&mut profile, "rust", two_by_two_path())
            .await
            .unwrap();
        (tracker, profile)
    }

    #[tokio::test]
    async fn add_path_initializes_progress() {
        let (tracker, profile) = setup().await;

        let summary = tracker.progress_summary(&profile, "rust").unwrap();
        assert_eq!(summary.total_modules, 2);
        assert_eq!(summary.total_topics, 4);
        assert_eq!(summary.completed_topics, 0);
        assert_eq!(summary.percentage_complete, 0.0);
        assert_eq!(summary.current_module, 0);
    }

    #[tokio::test]
    async fn manual_navigation_moves_position_only() {
        let (tracker, mut profile) = setup().await;

        tracker
            .update_progress(&mut profile, "rust", 1, 1, false)
            .await
            .unwrap();

        let record = &profile.progress["rust"];
        assert_eq!(record.current_module, 1);
        assert_eq!(record.current_topic, 1);
        assert!(record.completed_topics.is_empty());
    }

    #[tokio::test]
    async fn completing_all_topics_completes_module_and_advances() {
        let (tracker, mut profile) = setup().await;

        tracker
            .update_progress(&mut profile, "rust", 0, 0, true)
            .await
            .unwrap();
        assert!(profile.progress["rust"].completed_modules.is_empty());

        tracker
            .update_progress(&mut profile, "rust", 0, 1, true)
            .await
            .unwrap();

        let record = &profile.progress["rust"];
        assert!(record.completed_modules.contains(&0));
        assert_eq!(record.current_module, 1);
        assert_eq!(record.current_topic, 0);
    }

    #[tokio::test]
    async fn module_completion_is_idempotent() {
        let (tracker, mut profile) = setup().await;

        for _ in 0..3 {
            tracker
                .update_progress(&mut profile, "rust", 0, 0, true)
                .await
                .unwrap();
            tracker
                .update_progress(&mut profile, "rust", 0, 1, true)
                .await
                .unwrap();
        }

        let record = &profile.progress["rust"];
        assert_eq!(record.completed_modules.len(), 1);
        assert_eq!(record.completed_topics.len(), 2);
        assert_eq!(record.current_module, 1);
    }

    #[tokio::test]
    async fn finishing_last_module_does_not_advance_past_end() {
        let (tracker, mut profile) = setup().await;

        for (m, t) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            tracker
                .update_progress(&mut profile, "rust", m, t, true)
                .await
                .unwrap();
        }

        let record = &profile.progress["rust"];
        assert_eq!(record.completed_modules.len(), 2);
        assert_eq!(record.current_module, 1);

        let summary = tracker.progress_summary(&profile, "rust").unwrap();
        assert_eq!(summary.percentage_complete, 100.0);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (tracker, mut profile) = setup().await;

        let err = tracker
            .update_progress(&mut profile, "go", 0, 0, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::PathNotFound(_)));
    }

    #[tokio::test]
    async fn out_of_range_indices_are_bounds_errors() {
        let (tracker, mut profile) = setup().await;

        let err = tracker
            .update_progress(&mut profile, "rust", 5, 0, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::OutOfBounds { .. }));

        let err = tracker
            .update_progress(&mut profile, "rust", 0, 9, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::OutOfBounds { .. }));
    }

    #[tokio::test]
    async fn summary_is_none_without_progress() {
        let (tracker, profile) = setup().await;
        assert!(tracker.progress_summary(&profile, "missing").is_none());
    }

    #[tokio::test]
    async fn empty_path_percentage_is_zero() {
        let store = Arc::new(SqliteProfileStore::in_memory().await.unwrap());
        let tracker = ProgressTracker::new(store.clone());
        let mut profile = store.load("bob").await.unwrap();
        tracker
            .add_learning_path(
                &mut profile,
                "empty",
                LearningPath {
                    title: "Empty".to_string(),
                    modules: vec![],
                },
            )
            .await
            .unwrap();

        let summary = tracker.progress_summary(&profile, "empty").unwrap();
        assert_eq!(summary.total_topics, 0);
        assert_eq!(summary.percentage_complete, 0.0);
    }

    #[tokio::test]
    async fn summary_serializes_for_reporting() {
        let (tracker, mut profile) = setup().await;
        tracker
            .update_progress(&mut profile, "rust", 0, 0, true)
            .await
            .unwrap();

        let summary = tracker.progress_summary(&profile, "rust").unwrap();
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"completed_topics\":1"));
        assert!(json.contains("\"percentage_complete\":25.0"));
    }

    #[tokio::test]
    async fn mutations_survive_reload() {
        let store = Arc::new(SqliteProfileStore::in_memory().await.unwrap());
        let tracker = ProgressTracker::new(store.clone());
        let mut profile = store.load("carol").await.unwrap();
        tracker
            .add_learning_path(&mut profile, "rust", two_by_two_path())
            .await
            .unwrap();
        tracker
            .update_progress(&mut profile, "rust", 0, 0, true)
            .await
            .unwrap();

        let reloaded = store.load("carol").await.unwrap();
        assert!(reloaded.progress["rust"].completed_topics.contains("0_0"));
    }
}
