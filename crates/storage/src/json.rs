//! JSON file store backend.
//!
//! Keeps one pretty-printed file per user under per-kind subdirectories:
//! `profiles/<user_id>.json` and `attempts/<user_id>.json`. Useful for small
//! installs and as the migration source for the SQLite backend.

use async_trait::async_trait;
use quizprep_core::{QuizAttempt, UserProfile};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use super::trait_::{ProfileStore, Result, StorageError};

const PROFILES_DIR: &str = "profiles";
const ATTEMPTS_DIR: &str = "attempts";

/// File-based JSON store backend.
pub struct JsonProfileStore {
    root: PathBuf,
}

impl JsonProfileStore {
    /// Create the store, creating the root directories if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(PROFILES_DIR)).await?;
        fs::create_dir_all(root.join(ATTEMPTS_DIR)).await?;
        Ok(Self { root })
    }

    /// User ids become file names, so anything that could walk out of the
    /// store root is rejected.
    fn user_file(&self, dir: &str, user_id: &str) -> Result<PathBuf> {
        if user_id.is_empty()
            || user_id.contains(['/', '\\'])
            || user_id.contains("..")
        {
            return Err(StorageError::InvalidId(user_id.to_string()));
        }
        Ok(self.root.join(dir).join(format!("{}.json", user_id)))
    }

    fn profile_path(&self, user_id: &str) -> Result<PathBuf> {
        self.user_file(PROFILES_DIR, user_id)
    }

    fn attempts_path(&self, user_id: &str) -> Result<PathBuf> {
        self.user_file(ATTEMPTS_DIR, user_id)
    }

    /// Write a value as pretty JSON via a temp file and rename, so readers
    /// never observe a half-written profile.
    async fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes()).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Migrate every profile in this store into `target`.
    ///
    /// Per-file failures are logged and skipped so one bad file does not block
    /// the rest. Returns the number of profiles migrated.
    pub async fn migrate_to<S: ProfileStore>(&self, target: &S) -> Result<usize> {
        let mut migrated = 0;
        let mut entries = fs::read_dir(self.root.join(PROFILES_DIR)).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(user_id) = name.strip_suffix(".json") else {
                continue;
            };

            match self.load(user_id).await {
                Ok(profile) => {
                    target.save(&profile).await?;
                    for attempt in self.list_attempts(user_id).await?.into_iter().rev() {
                        target.record_attempt(user_id, &attempt).await?;
                    }
                    info!(user_id = %user_id, "migrated profile");
                    migrated += 1;
                }
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "skipping unreadable profile");
                }
            }
        }
        Ok(migrated)
    }
}

#[async_trait]
impl ProfileStore for JsonProfileStore {
    async fn load(&self, user_id: &str) -> Result<UserProfile> {
        let path = self.profile_path(user_id)?;
        match fs::read_to_string(&path).await {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| StorageError::corrupt(format!("profile/{}", user_id), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let profile = UserProfile::new(user_id);
                self.write_json(&path, &profile).await?;
                Ok(profile)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, profile: &UserProfile) -> Result<()> {
        let path = self.profile_path(&profile.user_id)?;
        self.write_json(&path, profile).await
    }

    async fn exists(&self, user_id: &str) -> Result<bool> {
        Ok(fs::try_exists(self.profile_path(user_id)?).await?)
    }

    async fn record_attempt(&self, user_id: &str, attempt: &QuizAttempt) -> Result<()> {
        let path = self.attempts_path(user_id)?;
        let mut attempts: Vec<QuizAttempt> = match fs::read_to_string(&path).await {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| StorageError::corrupt(format!("attempts/{}", user_id), e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        attempts.push(attempt.clone());
        self.write_json(&path, &attempts).await
    }

    async fn list_attempts(&self, user_id: &str) -> Result<Vec<QuizAttempt>> {
        let path = self.attempts_path(user_id)?;
        let mut attempts: Vec<QuizAttempt> = match fs::read_to_string(&path).await {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| StorageError::corrupt(format!("attempts/{}", user_id), e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        attempts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteProfileStore;
    use chrono::Utc;
    use quizprep_core::{LearningPath, Module, ProgressRecord};

    fn sample_path() -> LearningPath {
        LearningPath {
            title: "SQL".to_string(),
            modules: vec![Module {
                title: "Joins".to_string(),
                topics: vec!["inner".into(), "outer".into()],
                estimated_time: "30 minutes".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn load_creates_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path()).await.unwrap();

        let mut profile = store.load("alice").await.unwrap();
        assert!(store.exists("alice").await.unwrap());

        profile
            .learning_paths
            .insert("sql".to_string(), sample_path());
        profile
            .progress
            .insert("sql".to_string(), ProgressRecord::new(Utc::now()));
        store.save(&profile).await.unwrap();

        let loaded = store.load("alice").await.unwrap();
        assert_eq!(loaded, profile);
    }

    #[tokio::test]
    async fn corrupt_profile_is_an_error_not_empty_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path()).await.unwrap();

        fs::write(dir.path().join("profiles/bob.json"), b"{oops")
            .await
            .unwrap();

        let err = store.load("bob").await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn user_id_with_path_separators_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path()).await.unwrap();

        for id in ["../escape", "a/b", "a\\b", ""] {
            let err = store.load(id).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidId(_)), "id: {:?}", id);
        }
        // Nothing may have been written outside the store directories.
        assert!(!fs::try_exists(dir.path().join("escape.json")).await.unwrap());
    }

    #[tokio::test]
    async fn dotted_user_id_does_not_collide_with_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path()).await.unwrap();

        let attempt = QuizAttempt {
            subject: "sql".to_string(),
            easy_count: 1,
            medium_count: 0,
            hard_count: 0,
            score: 100.0,
            passed: true,
            timestamp: Utc::now(),
        };
        store.record_attempt("bob", &attempt).await.unwrap();

        // A profile for "bob.attempts" lives in its own namespace.
        let profile = store.load("bob.attempts").await.unwrap();
        assert_eq!(profile.user_id, "bob.attempts");
        assert_eq!(store.list_attempts("bob").await.unwrap().len(), 1);
        assert!(store.list_attempts("bob.attempts").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn migrates_profiles_into_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonProfileStore::new(dir.path()).await.unwrap();

        let mut profile = source.load("carol").await.unwrap();
        profile
            .learning_paths
            .insert("sql".to_string(), sample_path());
        profile
            .progress
            .insert("sql".to_string(), ProgressRecord::new(Utc::now()));
        source.save(&profile).await.unwrap();

        // A bad file must be skipped, not abort the migration.
        fs::write(dir.path().join("profiles/mallory.json"), b"not json")
            .await
            .unwrap();

        let target = SqliteProfileStore::in_memory().await.unwrap();
        let migrated = source.migrate_to(&target).await.unwrap();

        assert_eq!(migrated, 1);
        let loaded = target.load("carol").await.unwrap();
        assert_eq!(loaded.learning_paths.len(), 1);
    }
}
