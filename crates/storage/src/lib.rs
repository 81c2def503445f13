//! Profile persistence for quizprep.
//!
//! This crate provides a trait-based store interface with a SQLite backend
//! (recommended) and a JSON-file backend, plus JSON-to-SQLite migration.

#![warn(missing_docs)]

pub mod trait_;
pub mod sqlite;
pub mod json;

pub use trait_::{ProfileStore, Result, StorageError};
pub use sqlite::SqliteProfileStore;
pub use json::JsonProfileStore;
