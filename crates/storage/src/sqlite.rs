//! SQLite store backend.
//!
//! Persists profiles across four record sets (`users`, `learning_paths`,
//! `progress`, `quiz_results`) plus append-only `quiz_attempts` history.
//! This is the recommended backend for production use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quizprep_core::{
    LearningPath, ProgressRecord, QuizAttempt, QuizResult, Time, UserProfile,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::collections::BTreeMap;
use std::path::Path;

use super::trait_::{ProfileStore, Result, StorageError};

/// SQLite store implementation.
#[derive(Clone)]
pub struct SqliteProfileStore {
    /// Database connection pool
    pool: sqlx::SqlitePool,
}

impl SqliteProfileStore {
    /// Open (or create) a database file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    /// Create an in-memory store for testing.
    pub async fn in_memory() -> Result<Self> {
        // A single connection keeps every operation on the same :memory: db.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    /// Initialize the database schema.
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                preferences TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS learning_paths (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                path_id TEXT NOT NULL,
                path_data TEXT NOT NULL,
                UNIQUE(user_id, path_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS progress (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                path_id TEXT NOT NULL,
                current_module INTEGER NOT NULL,
                current_topic INTEGER NOT NULL,
                completed_modules TEXT NOT NULL,
                completed_topics TEXT NOT NULL,
                last_accessed TEXT NOT NULL,
                UNIQUE(user_id, path_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS quiz_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                path_id TEXT NOT NULL,
                topic_id TEXT NOT NULL,
                score REAL NOT NULL,
                passed INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                UNIQUE(user_id, path_id, topic_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS quiz_attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                subject TEXT NOT NULL,
                easy_count INTEGER NOT NULL,
                medium_count INTEGER NOT NULL,
                hard_count INTEGER NOT NULL,
                score REAL NOT NULL,
                passed INTEGER NOT NULL,
                timestamp TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_attempts_user ON quiz_attempts(user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Parse a stored RFC 3339 timestamp, surfacing bad data as `Corrupt`.
    fn parse_time(record: &str, value: &str) -> Result<Time> {
        value
            .parse::<DateTime<Utc>>()
            .map_err(|e| StorageError::corrupt(record, e))
    }

    fn get_string(row: &SqliteRow, column: &str) -> String {
        row.try_get(column).unwrap_or_default()
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn load(&self, user_id: &str) -> Result<UserProfile> {
        let user_row = sqlx::query("SELECT preferences FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(user_row) = user_row else {
            // First access: register the user with default preferences.
            let profile = UserProfile::new(user_id);
            let preferences = serde_json::to_string(&profile.preferences)?;
            let now = Utc::now().to_rfc3339();
            sqlx::query(
                "INSERT OR IGNORE INTO users (user_id, preferences, created_at, updated_at)
                VALUES (?, ?, ?, ?)",
            )
            .bind(user_id)
            .bind(preferences)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await?;
            return Ok(profile);
        };

        let mut profile = UserProfile::new(user_id);
        let prefs_json = Self::get_string(&user_row, "preferences");
        profile.preferences = serde_json::from_str(&prefs_json)
            .map_err(|e| StorageError::corrupt(format!("users/{}", user_id), e))?;

        let rows = sqlx::query("SELECT path_id, path_data FROM learning_paths WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        for row in rows {
            let path_id = Self::get_string(&row, "path_id");
            let data = Self::get_string(&row, "path_data");
            let path: LearningPath = serde_json::from_str(&data)
                .map_err(|e| StorageError::corrupt(format!("learning_paths/{}", path_id), e))?;
            profile.learning_paths.insert(path_id, path);
        }

        let rows = sqlx::query(
            "SELECT path_id, current_module, current_topic, completed_modules,
                completed_topics, last_accessed
            FROM progress WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            let path_id = Self::get_string(&row, "path_id");
            let record = format!("progress/{}", path_id);
            let completed_modules = serde_json::from_str(&Self::get_string(&row, "completed_modules"))
                .map_err(|e| StorageError::corrupt(&record, e))?;
            let completed_topics = serde_json::from_str(&Self::get_string(&row, "completed_topics"))
                .map_err(|e| StorageError::corrupt(&record, e))?;
            let last_accessed = Self::parse_time(&record, &Self::get_string(&row, "last_accessed"))?;
            profile.progress.insert(
                path_id,
                ProgressRecord {
                    current_module: row.try_get::<i64, _>("current_module").unwrap_or(0) as usize,
                    current_topic: row.try_get::<i64, _>("current_topic").unwrap_or(0) as usize,
                    completed_modules,
                    completed_topics,
                    last_accessed,
                },
            );
        }

        let rows = sqlx::query(
            "SELECT path_id, topic_id, score, passed, timestamp
            FROM quiz_results WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            let path_id = Self::get_string(&row, "path_id");
            let topic_id = Self::get_string(&row, "topic_id");
            let record = format!("quiz_results/{}/{}", path_id, topic_id);
            let timestamp = Self::parse_time(&record, &Self::get_string(&row, "timestamp"))?;
            profile
                .quiz_results
                .entry(path_id)
                .or_insert_with(BTreeMap::new)
                .insert(
                    topic_id,
                    QuizResult {
                        score: row.try_get::<f64, _>("score").unwrap_or(0.0),
                        passed: row.try_get::<i64, _>("passed").unwrap_or(0) != 0,
                        timestamp,
                    },
                );
        }

        Ok(profile)
    }

    async fn save(&self, profile: &UserProfile) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let preferences = serde_json::to_string(&profile.preferences)?;

        let updated = sqlx::query("UPDATE users SET preferences = ?, updated_at = ? WHERE user_id = ?")
            .bind(&preferences)
            .bind(&now)
            .bind(&profile.user_id)
            .execute(&self.pool)
            .await?;
        if updated.rows_affected() == 0 {
            sqlx::query(
                "INSERT INTO users (user_id, preferences, created_at, updated_at)
                VALUES (?, ?, ?, ?)",
            )
            .bind(&profile.user_id)
            .bind(&preferences)
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await?;
        }

        for (path_id, path) in &profile.learning_paths {
            let data = serde_json::to_string(path)?;
            sqlx::query(
                "INSERT OR REPLACE INTO learning_paths (user_id, path_id, path_data)
                VALUES (?, ?, ?)",
            )
            .bind(&profile.user_id)
            .bind(path_id)
            .bind(data)
            .execute(&self.pool)
            .await?;
        }

        for (path_id, record) in &profile.progress {
            sqlx::query(
                "INSERT OR REPLACE INTO progress
                (user_id, path_id, current_module, current_topic,
                 completed_modules, completed_topics, last_accessed)
                VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&profile.user_id)
            .bind(path_id)
            .bind(record.current_module as i64)
            .bind(record.current_topic as i64)
            .bind(serde_json::to_string(&record.completed_modules)?)
            .bind(serde_json::to_string(&record.completed_topics)?)
            .bind(record.last_accessed.to_rfc3339())
            .execute(&self.pool)
            .await?;
        }

        for (path_id, topics) in &profile.quiz_results {
            for (topic_id, result) in topics {
                sqlx::query(
                    "INSERT OR REPLACE INTO quiz_results
                    (user_id, path_id, topic_id, score, passed, timestamp)
                    VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(&profile.user_id)
                .bind(path_id)
                .bind(topic_id)
                .bind(result.score)
                .bind(if result.passed { 1i64 } else { 0i64 })
                .bind(result.timestamp.to_rfc3339())
                .execute(&self.pool)
                .await?;
            }
        }

        Ok(())
    }

    async fn exists(&self, user_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn record_attempt(&self, user_id: &str, attempt: &QuizAttempt) -> Result<()> {
        sqlx::query(
            "INSERT INTO quiz_attempts
            (user_id, subject, easy_count, medium_count, hard_count, score, passed, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&attempt.subject)
        .bind(attempt.easy_count as i64)
        .bind(attempt.medium_count as i64)
        .bind(attempt.hard_count as i64)
        .bind(attempt.score)
        .bind(if attempt.passed { 1i64 } else { 0i64 })
        .bind(attempt.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_attempts(&self, user_id: &str) -> Result<Vec<QuizAttempt>> {
        let rows = sqlx::query(
            "SELECT subject, easy_count, medium_count, hard_count, score, passed, timestamp
            FROM quiz_attempts WHERE user_id = ? ORDER BY timestamp DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let timestamp =
                    Self::parse_time("quiz_attempts", &Self::get_string(&row, "timestamp"))?;
                Ok(QuizAttempt {
                    subject: Self::get_string(&row, "subject"),
                    easy_count: row.try_get::<i64, _>("easy_count").unwrap_or(0) as u32,
                    medium_count: row.try_get::<i64, _>("medium_count").unwrap_or(0) as u32,
                    hard_count: row.try_get::<i64, _>("hard_count").unwrap_or(0) as u32,
                    score: row.try_get::<f64, _>("score").unwrap_or(0.0),
                    passed: row.try_get::<i64, _>("passed").unwrap_or(0) != 0,
                    timestamp,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizprep_core::{topic_id, Module};

    fn sample_path() -> LearningPath {
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
                    estimated_time: "6-8 hours".to_string(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn load_creates_profile_with_defaults() {
        let store = SqliteProfileStore::in_memory().await.unwrap();

        assert!(!store.exists("alice").await.unwrap());
        let profile = store.load("alice").await.unwrap();
        assert_eq!(profile.user_id, "alice");
        assert_eq!(profile.preferences.time_constraints.daily_hours, 2.0);
        assert!(store.exists("alice").await.unwrap());
    }

    #[tokio::test]
    async fn save_load_round_trip() {
        let store = SqliteProfileStore::in_memory().await.unwrap();

        let mut profile = store.load("bob").await.unwrap();
        profile
            .learning_paths
            .insert("rust".to_string(), sample_path());
        profile
            .progress
            .insert("rust".to_string(), ProgressRecord::new(Utc::now()));
        let mut results = BTreeMap::new();
        results.insert(topic_id(0, 0), QuizResult::new(85.0, Utc::now()));
        profile.quiz_results.insert("rust".to_string(), results);
        profile.preferences.time_constraints.daily_hours = 3.0;

        store.save(&profile).await.unwrap();
        let loaded = store.load("bob").await.unwrap();

        assert_eq!(loaded, profile);
    }

    #[tokio::test]
    async fn save_is_idempotent() {
        let store = SqliteProfileStore::in_memory().await.unwrap();

        let mut profile = store.load("carol").await.unwrap();
        profile
            .learning_paths
            .insert("rust".to_string(), sample_path());
        profile
            .progress
            .insert("rust".to_string(), ProgressRecord::new(Utc::now()));

        store.save(&profile).await.unwrap();
        store.save(&profile).await.unwrap();

        let loaded = store.load("carol").await.unwrap();
        assert_eq!(loaded.learning_paths.len(), 1);
        assert_eq!(loaded.progress.len(), 1);
    }

    #[tokio::test]
    async fn save_without_prior_load_registers_user() {
        let store = SqliteProfileStore::in_memory().await.unwrap();

        let profile = UserProfile::new("dave");
        store.save(&profile).await.unwrap();

        assert!(store.exists("dave").await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_path_data_surfaces_as_error() {
        let store = SqliteProfileStore::in_memory().await.unwrap();
        store.load("eve").await.unwrap();

        sqlx::query(
            "INSERT INTO learning_paths (user_id, path_id, path_data) VALUES (?, ?, ?)",
        )
        .bind("eve")
        .bind("broken")
        .bind("{not json")
        .execute(&store.pool)
        .await
        .unwrap();

        let err = store.load("eve").await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn attempts_are_listed_newest_first() {
        let store = SqliteProfileStore::in_memory().await.unwrap();

        let older = QuizAttempt {
            subject: "Python".to_string(),
            easy_count: 3,
            medium_count: 4,
            hard_count: 3,
            score: 60.0,
            passed: false,
            timestamp: Utc::now() - chrono::Duration::hours(1),
        };
        let newer = QuizAttempt {
            subject: "Rust".to_string(),
            score: 90.0,
            passed: true,
            timestamp: Utc::now(),
            ..older.clone()
        };

        store.record_attempt("frank", &older).await.unwrap();
        store.record_attempt("frank", &newer).await.unwrap();

        let attempts = store.list_attempts("frank").await.unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].subject, "Rust");
        assert_eq!(attempts[1].subject, "Python");
    }
}
