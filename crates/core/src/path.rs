//! Learning path structure - externally authored curriculum.

use serde::{Deserialize, Serialize};

/// An externally authored curriculum: ordered modules, each with ordered
/// topics and a free-text time estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    /// Path title
    #[serde(default)]
    pub title: String,

    /// Ordered modules
    pub modules: Vec<Module>,
}

impl LearningPath {
    /// Total topic count across all modules.
    pub fn total_topics(&self) -> usize {
        self.modules.iter().map(|m| m.topics.len()).sum()
    }
}

/// One module within a learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Module title
    #[serde(default)]
    pub title: String,

    /// Ordered topic names
    pub topics: Vec<String>,

    /// Free-text time estimate, e.g. "2 hours", "30 minutes", "6-8 hours".
    /// Weakly typed external input; see the estimator's parsing policy.
    #[serde(default)]
    pub estimated_time: String,
}

/// Composite key identifying one topic within a path.
pub fn topic_id(module_index: usize, topic_index: usize) -> String {
    format!("{}_{}", module_index, topic_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_id_format() {
        assert_eq!(topic_id(0, 0), "0_0");
        assert_eq!(topic_id(3, 12), "3_12");
    }

    #[test]
    fn total_topics_sums_modules() {
        let path = LearningPath {
            title: "Rust".to_string(),
            modules: vec![
                Module {
                    title: "Basics".to_string(),
                    topics: vec!["ownership".into(), "borrowing".into()],
                    estimated_time: "2 hours".to_string(),
                },
                Module {
                    title: "Async".to_string(),
                    topics: vec!["futures".into()],
                    estimated_time: "3 hours".to_string(),
                },
            ],
        };
        assert_eq!(path.total_topics(), 3);
    }

    #[test]
    fn missing_estimated_time_defaults_to_empty() {
        let json = r#"{"title": "T", "modules": [{"topics": ["a"]}]}"#;
        let path: LearningPath = serde_json::from_str(json).unwrap();
        assert_eq!(path.modules[0].estimated_time, "");
    }
}
