//! User profile aggregate - all durable state for one user identifier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::path::LearningPath;
use crate::progress::ProgressRecord;
use crate::quiz::{Difficulty, QuizResult};
use crate::Time;

/// All durable state owned by one user identifier.
///
/// Loaded as a whole, mutated in place by the trackers, and persisted
/// synchronously after each mutation. The profile is never deleted by the
/// core; deletion is an external operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque unique identifier; immutable after creation
    pub user_id: String,

    /// User preferences, including time budget and timeline
    pub preferences: Preferences,

    /// Learning paths by path id (externally authored, read-mostly)
    pub learning_paths: BTreeMap<String, LearningPath>,

    /// Per-path progress; an entry exists iff the path exists
    pub progress: BTreeMap<String, ProgressRecord>,

    /// Quiz results by path id, then topic id (one result per topic, upserted)
    pub quiz_results: BTreeMap<String, BTreeMap<String, QuizResult>>,
}

impl UserProfile {
    /// Create a fresh profile with default preferences.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            preferences: Preferences::default(),
            learning_paths: BTreeMap::new(),
            progress: BTreeMap::new(),
            quiz_results: BTreeMap::new(),
        }
    }

    /// Partially update preferences; `None` fields are left unchanged.
    /// The caller persists.
    pub fn update_preferences(
        &mut self,
        learning_level: Option<&str>,
        daily_hours: Option<f64>,
        weekly_hours: Option<f64>,
        target_completion_date: Option<Time>,
    ) {
        if let Some(level) = learning_level {
            self.preferences.learning_level = level.to_string();
        }
        let constraints = &mut self.preferences.time_constraints;
        if let Some(hours) = daily_hours {
            constraints.daily_hours = hours;
        }
        if let Some(hours) = weekly_hours {
            constraints.weekly_hours = hours;
        }
        if let Some(date) = target_completion_date {
            constraints.target_completion_date = Some(date);
        }
    }
}

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Preferred question difficulty
    pub difficulty: Difficulty,

    /// Free-text learning style (e.g. "visual")
    pub learning_style: String,

    /// Free-text learning level (e.g. "intermediate")
    pub learning_level: String,

    /// Declared time budget
    pub time_constraints: TimeConstraints,

    /// Timeline state: start date, milestones, completion estimates
    pub timeline: Timeline,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            learning_style: "visual".to_string(),
            learning_level: "intermediate".to_string(),
            time_constraints: TimeConstraints::default(),
            timeline: Timeline::default(),
        }
    }
}

/// Declared daily/weekly hour budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeConstraints {
    /// Hours available per day
    pub daily_hours: f64,

    /// Hours available per week
    pub weekly_hours: f64,

    /// Optional target date set by the user
    pub target_completion_date: Option<Time>,
}

impl Default for TimeConstraints {
    fn default() -> Self {
        Self {
            daily_hours: 2.0,
            weekly_hours: 10.0,
            target_completion_date: None,
        }
    }
}

/// Timeline state for a user's learning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Timeline {
    /// When the user started; estimates are relative to this
    pub start_date: Option<Time>,

    /// Recorded milestones, in insertion order
    pub milestones: Vec<Milestone>,

    /// Completion estimates by path id
    pub completion_estimates: BTreeMap<String, EstimateRecord>,
}

/// A timestamped milestone note for a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// When the milestone was recorded
    pub date: Time,

    /// Free-text description
    pub description: String,

    /// Path this milestone belongs to
    pub path_id: String,
}

/// Derived completion estimate for one path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    /// Total estimated hours across all modules
    pub total_hours: f64,

    /// Days needed at the effective daily budget
    pub days_needed: f64,

    /// Estimated completion date
    pub estimated_completion: Time,

    /// min(daily_hours, weekly_hours / 7)
    pub effective_daily_hours: f64,
}
