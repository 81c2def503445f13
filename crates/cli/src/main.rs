//! quizprep CLI - quiz-based interview preparation.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use quizprep_core::{LearningPath, QuizAttempt};
use quizprep_progress::{ProgressTracker, QuizResultRecorder, TimelineEstimator};
use quizprep_quiz::{difficulty_counts, evaluate, FallbackGenerator, QuestionGenerator, UNANSWERED};
use quizprep_storage::{JsonProfileStore, ProfileStore, SqliteProfileStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(name = "quizprep")]
#[command(about = "Quiz-based interview preparation", long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, default_value = "quizprep.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a user's profile (created on first access)
    Profile {
        /// User identifier
        user: String,
    },
    /// Update preferences
    Prefs {
        user: String,
        /// Learning level, e.g. beginner/intermediate/advanced
        #[arg(long)]
        level: Option<String>,
        /// Hours available per day
        #[arg(long)]
        daily: Option<f64>,
        /// Hours available per week
        #[arg(long)]
        weekly: Option<f64>,
    },
    /// Add a learning path from a JSON file
    AddPath {
        user: String,
        path_id: String,
        /// Path definition file ({"title": ..., "modules": [...]})
        file: PathBuf,
    },
    /// Show progress through a path
    Progress { user: String, path_id: String },
    /// Jump to a module/topic without marking anything complete
    Goto {
        user: String,
        path_id: String,
        module: usize,
        topic: usize,
    },
    /// Record a quiz score for a topic (passing advances progress)
    Record {
        user: String,
        path_id: String,
        module: usize,
        topic: usize,
        /// Score 0-100
        score: f64,
    },
    /// Set the timeline start date and compute the completion estimate
    StartDate {
        user: String,
        path_id: String,
        /// Start date, YYYY-MM-DD
        date: String,
    },
    /// Record a milestone note
    Milestone {
        user: String,
        path_id: String,
        description: String,
    },
    /// Show timeline status for a path
    Status { user: String, path_id: String },
    /// Generate a quiz and optionally grade submitted answers
    Quiz {
        user: String,
        /// Subject to generate questions for
        subject: String,
        #[arg(long, default_value = "3")]
        easy: u32,
        #[arg(long, default_value = "4")]
        medium: u32,
        #[arg(long, default_value = "3")]
        hard: u32,
        /// Comma-separated option indices, -1 for unanswered (e.g. "0,1,-1")
        #[arg(long)]
        answers: Option<String>,
    },
    /// Show quiz attempt history, newest first
    History { user: String },
    /// Migrate JSON profiles from a directory into the SQLite database
    Migrate {
        /// Directory of <user_id>.json profile files
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();
    let store = Arc::new(SqliteProfileStore::open(&cli.db).await?);
    let tracker = ProgressTracker::new(store.clone());
    let recorder = QuizResultRecorder::new(store.clone());
    let estimator = TimelineEstimator::new(store.clone());

    match cli.command {
        Commands::Profile { user } => {
            let profile = store.load(&user).await?;
            println!("User: {}", profile.user_id);
            println!("  Level: {}", profile.preferences.learning_level);
            println!("  Style: {}", profile.preferences.learning_style);
            println!(
                "  Budget: {}h/day, {}h/week",
                profile.preferences.time_constraints.daily_hours,
                profile.preferences.time_constraints.weekly_hours,
            );
            println!("  Paths: {}", profile.learning_paths.len());
            for (path_id, path) in &profile.learning_paths {
                println!("    {} - {} ({} modules)", path_id, path.title, path.modules.len());
            }
        }
        Commands::Prefs {
            user,
            level,
            daily,
            weekly,
        } => {
            let mut profile = store.load(&user).await?;
            profile.update_preferences(level.as_deref(), daily, weekly, None);
            store.save(&profile).await?;
            println!("Preferences updated for {}", user);
        }
        Commands::AddPath { user, path_id, file } => {
            let json = std::fs::read_to_string(&file)?;
            let path: LearningPath = serde_json::from_str(&json)?;
            let mut profile = store.load(&user).await?;
            tracker.add_learning_path(&mut profile, &path_id, path).await?;
            println!("Added path {} for {}", path_id, user);
        }
        Commands::Progress { user, path_id } => {
            let profile = store.load(&user).await?;
            let Some(summary) = tracker.progress_summary(&profile, &path_id) else {
                println!("No progress for path {}", path_id);
                return Ok(());
            };
            println!("Path: {}", path_id);
            println!(
                "  Modules: {}/{}",
                summary.completed_modules, summary.total_modules
            );
            println!(
                "  Topics: {}/{} ({:.1}%)",
                summary.completed_topics, summary.total_topics, summary.percentage_complete
            );
            println!(
                "  Position: module {}, topic {}",
                summary.current_module, summary.current_topic
            );
            println!("  Last accessed: {}", summary.last_accessed);
        }
        Commands::Goto {
            user,
            path_id,
            module,
            topic,
        } => {
            let mut profile = store.load(&user).await?;
            tracker
                .update_progress(&mut profile, &path_id, module, topic, false)
                .await?;
            println!("Now at module {}, topic {}", module, topic);
        }
        Commands::Record {
            user,
            path_id,
            module,
            topic,
            score,
        } => {
            let mut profile = store.load(&user).await?;
            recorder
                .record_result(&mut profile, &path_id, module, topic, score)
                .await?;
            let result = &profile.quiz_results[&path_id][&quizprep_core::topic_id(module, topic)];
            println!(
                "Recorded {:.1}% for {}/{}_{}: {}",
                score,
                path_id,
                module,
                topic,
                if result.passed { "passed" } else { "failed" }
            );
        }
        Commands::StartDate { user, path_id, date } => {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")?
                .and_time(chrono::NaiveTime::MIN)
                .and_utc();
            let mut profile = store.load(&user).await?;
            let estimate = estimator.set_start_date(&mut profile, &path_id, date).await?;
            println!(
                "Estimated completion: {} ({:.1} days at {:.2}h/day)",
                estimate.estimated_completion.date_naive(),
                estimate.days_needed,
                estimate.effective_daily_hours
            );
        }
        Commands::Milestone {
            user,
            path_id,
            description,
        } => {
            let mut profile = store.load(&user).await?;
            estimator
                .record_milestone(&mut profile, &path_id, &description)
                .await?;
            println!("Milestone recorded");
        }
        Commands::Status { user, path_id } => {
            let profile = store.load(&user).await?;
            let Some(status) = estimator.timeline_status(&profile, &path_id) else {
                println!("No timeline yet; set a start date first");
                return Ok(());
            };
            println!("Start: {}", status.start_date.date_naive());
            println!(
                "Estimated completion: {}",
                status.estimated_completion.date_naive()
            );
            println!(
                "  {} days elapsed, {} remaining",
                status.days_elapsed, status.days_remaining
            );
            println!(
                "  Expected {:.1}% / actual {:.1}% - {}",
                status.expected_progress_pct,
                status.actual_progress_pct,
                if status.is_on_track { "on track" } else { "behind" }
            );
        }
        Commands::Quiz {
            user,
            subject,
            easy,
            medium,
            hard,
            answers,
        } => {
            let generator = FallbackGenerator;
            let questions = generator.generate(&subject, easy, medium, hard).await?;

            let Some(answers) = answers else {
                for (i, q) in questions.iter().enumerate() {
                    println!("Q{} ({}): {}", i + 1, q.difficulty, q.question);
                    for (j, option) in q.options.iter().enumerate() {
                        println!("  {}. {}", j, option);
                    }
                }
                return Ok(());
            };

            let answers: Vec<i32> = answers
                .split(',')
                .map(|a| a.trim().parse().unwrap_or(UNANSWERED))
                .collect();
            let outcome = evaluate(&questions, &answers);
            let (easy_count, medium_count, hard_count) = difficulty_counts(&questions);
            store
                .record_attempt(
                    &user,
                    &QuizAttempt {
                        subject: subject.clone(),
                        easy_count,
                        medium_count,
                        hard_count,
                        score: outcome.score,
                        passed: outcome.passed,
                        timestamp: Utc::now(),
                    },
                )
                .await?;

            println!(
                "Score: {:.1}% - {}",
                outcome.score,
                if outcome.passed { "passed" } else { "failed" }
            );
            for feedback in &outcome.feedback {
                println!(
                    "  [{}] {} (you: {}, correct: {})",
                    if feedback.is_correct { "ok" } else { "x " },
                    feedback.question,
                    feedback.user_answer,
                    feedback.correct_answer
                );
            }
        }
        Commands::History { user } => {
            let attempts = store.list_attempts(&user).await?;
            if attempts.is_empty() {
                println!("No quiz history yet");
                return Ok(());
            }
            println!("Attempts ({})", attempts.len());
            for attempt in attempts {
                println!(
                    "  {} | {} | {:.1}% | {} | e{}/m{}/h{}",
                    attempt.timestamp.format("%Y-%m-%d %H:%M"),
                    attempt.subject,
                    attempt.score,
                    if attempt.passed { "passed" } else { "failed" },
                    attempt.easy_count,
                    attempt.medium_count,
                    attempt.hard_count,
                );
            }
        }
        Commands::Migrate { dir } => {
            let source = JsonProfileStore::new(&dir).await?;
            let migrated = source.migrate_to(store.as_ref()).await?;
            println!("Migrated {} profile(s)", migrated);
        }
    }

    Ok(())
}
