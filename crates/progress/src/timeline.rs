//! Timeline estimation - completion dates and on-track detection.

use chrono::{Duration, Utc};
use quizprep_core::{EstimateRecord, Milestone, Time, UserProfile};
use quizprep_storage::ProfileStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ProgressError, Result};

/// Parse a free-text module time estimate into hours.
///
/// The accepted shapes are a documented contract, not an implementation
/// detail: a range like "6-8 hours" averages its bounds, "2 hours" and
/// "30 minutes" take the first token, and anything else (including parse
/// failures) is 1.0 hour. Ambiguous input never errors.
///
/// TODO: the upstream path format should grow a structured minutes field so
/// this parser can be retired.
pub fn parse_estimated_time(text: &str) -> f64 {
    if text.contains('-') {
        let parsed = text.split_whitespace().next().and_then(|token| {
            let mut bounds = token.split('-');
            let lower = bounds.next()?.trim().parse::<f64>().ok()?;
            let upper = bounds.next()?.trim().parse::<f64>().ok()?;
            Some((lower + upper) / 2.0)
        });
        parsed.unwrap_or(1.0)
    } else if text.contains("hour") {
        text.split_whitespace()
            .next()
            .and_then(|token| token.parse::<f64>().ok())
            .unwrap_or(1.0)
    } else if text.contains("minute") {
        text.split_whitespace()
            .next()
            .and_then(|token| token.parse::<f64>().ok())
            .map(|minutes| minutes / 60.0)
            .unwrap_or(1.0)
    } else {
        1.0
    }
}

/// Derives completion estimates from per-module time estimates and the
/// user's declared hour budget, and compares actual vs. expected progress.
pub struct TimelineEstimator<S: ProfileStore> {
    store: Arc<S>,
}

/// Current timeline standing for one path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineStatus {
    /// Declared start date
    pub start_date: Time,

    /// Estimated completion date
    pub estimated_completion: Time,

    /// Whole days since the start date
    pub days_elapsed: i64,

    /// Whole days until the estimated completion, never negative
    pub days_remaining: i64,

    /// Percentage of the schedule that has elapsed, capped at 100
    pub expected_progress_pct: f64,

    /// Percentage of topics actually completed
    pub actual_progress_pct: f64,

    /// Whether actual progress meets or exceeds expected progress
    pub is_on_track: bool,
}

impl<S: ProfileStore> TimelineEstimator<S> {
    /// Create a new estimator over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Set the timeline start date and recompute the estimate for `path_id`.
    pub async fn set_start_date(
        &self,
        profile: &mut UserProfile,
        path_id: &str,
        start_date: Time,
    ) -> Result<EstimateRecord> {
        if !profile.progress.contains_key(path_id) {
            return Err(ProgressError::PathNotFound(path_id.to_string()));
        }
        profile.preferences.timeline.start_date = Some(start_date);
        let estimate = self.compute_estimate(profile, path_id).await?;
        // The start date was just set, so an estimate is always produced.
        estimate.ok_or_else(|| ProgressError::PathNotFound(path_id.to_string()))
    }

    /// Append a timestamped milestone note. Does not affect estimates.
    pub async fn record_milestone(
        &self,
        profile: &mut UserProfile,
        path_id: &str,
        description: &str,
    ) -> Result<()> {
        if !profile.progress.contains_key(path_id) {
            return Err(ProgressError::PathNotFound(path_id.to_string()));
        }
        profile.preferences.timeline.milestones.push(Milestone {
            date: Utc::now(),
            description: description.to_string(),
            path_id: path_id.to_string(),
        });
        self.store.save(profile).await?;
        Ok(())
    }

    /// Compute and store the completion estimate for `path_id`.
    ///
    /// Returns `Ok(None)` when no start date has been set yet; nothing is
    /// recorded in that case.
    pub async fn compute_estimate(
        &self,
        profile: &mut UserProfile,
        path_id: &str,
    ) -> Result<Option<EstimateRecord>> {
        let path = profile
            .learning_paths
            .get(path_id)
            .ok_or_else(|| ProgressError::PathNotFound(path_id.to_string()))?;
        let Some(start_date) = profile.preferences.timeline.start_date else {
            return Ok(None);
        };

        let total_hours: f64 = path
            .modules
            .iter()
            .map(|m| parse_estimated_time(&m.estimated_time))
            .sum();

        let constraints = &profile.preferences.time_constraints;
        // The more restrictive of the daily and weekly budgets.
        let effective_daily_hours = constraints.daily_hours.min(constraints.weekly_hours / 7.0);
        if effective_daily_hours <= 0.0 {
            return Err(ProgressError::InvalidTimeBudget(effective_daily_hours));
        }

        let days_needed = total_hours / effective_daily_hours;
        let estimated_completion =
            start_date + Duration::seconds((days_needed * 86_400.0).round() as i64);

        let record = EstimateRecord {
            total_hours,
            days_needed,
            estimated_completion,
            effective_daily_hours,
        };
        debug!(path_id, total_hours, days_needed, "computed completion estimate");
        profile
            .preferences
            .timeline
            .completion_estimates
            .insert(path_id.to_string(), record.clone());
        self.store.save(profile).await?;
        Ok(Some(record))
    }

    /// Timeline standing for `path_id` as of now.
    ///
    /// `None` until both a start date and an estimate exist.
    pub fn timeline_status(&self, profile: &UserProfile, path_id: &str) -> Option<TimelineStatus> {
        self.timeline_status_at(profile, path_id, Utc::now())
    }

    /// Timeline standing as of an explicit point in time.
    pub fn timeline_status_at(
        &self,
        profile: &UserProfile,
        path_id: &str,
        now: Time,
    ) -> Option<TimelineStatus> {
        let record = profile.progress.get(path_id)?;
        let path = profile.learning_paths.get(path_id)?;
        let timeline = &profile.preferences.timeline;
        let start_date = timeline.start_date?;
        let estimate = timeline.completion_estimates.get(path_id)?;

        let total_days = (estimate.estimated_completion - start_date).num_days();
        let days_elapsed = (now - start_date).num_days();
        let expected_progress_pct = if total_days > 0 {
            (days_elapsed as f64 / total_days as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        let total_topics = path.total_topics();
        let actual_progress_pct = if total_topics > 0 {
            record.completed_topics.len() as f64 / total_topics as f64 * 100.0
        } else {
            0.0
        };

        Some(TimelineStatus {
            start_date,
            estimated_completion: estimate.estimated_completion,
            days_elapsed,
            days_remaining: (estimate.estimated_completion - now).num_days().max(0),
            expected_progress_pct,
            actual_progress_pct,
            is_on_track: actual_progress_pct >= expected_progress_pct,
        })
    }
}
