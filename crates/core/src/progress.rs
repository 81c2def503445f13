//! Per-path progress record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::Time;

/// Progress through one learning path.
///
/// Completed sets are monotonically non-decreasing once topics are marked
/// complete; nothing in the core un-completes a topic or module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Index of the module the user is currently on
    pub current_module: usize,

    /// Index of the topic the user is currently on
    pub current_topic: usize,

    /// Indices of fully completed modules
    pub completed_modules: BTreeSet<usize>,

    /// Completed topic ids (`"<module_index>_<topic_index>"`)
    pub completed_topics: BTreeSet<String>,

    /// Last time this path was touched
    pub last_accessed: Time,
}

impl ProgressRecord {
    /// Fresh record positioned at module 0, topic 0.
    pub fn new(now: Time) -> Self {
        Self {
            current_module: 0,
            current_topic: 0,
            completed_modules: BTreeSet::new(),
            completed_topics: BTreeSet::new(),
            last_accessed: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn fresh_record_starts_at_origin() {
        let record = ProgressRecord::new(Utc::now());
        assert_eq!(record.current_module, 0);
        assert_eq!(record.current_topic, 0);
        assert!(record.completed_modules.is_empty());
        assert!(record.completed_topics.is_empty());
    }

    #[test]
    fn completed_topics_have_set_semantics() {
        let mut record = ProgressRecord::new(Utc::now());
        record.completed_topics.insert("0_0".to_string());
        record.completed_topics.insert("0_0".to_string());
        assert_eq!(record.completed_topics.len(), 1);
    }
}
