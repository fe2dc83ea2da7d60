//! Durable reminder log.
//!
//! Every reminder the user sets is appended here. The log is never consulted
//! for triggering; the [`Scheduler`](crate::scheduler::Scheduler) owns that.

mod schema;
pub mod sqlite;

use serde::{Deserialize, Serialize};

pub use sqlite::ReminderStore;

/// Database filename used when no explicit path is configured.
pub const DB_FILENAME: &str = "assistant.db";

/// A stored reminder. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Row id, ascending in insertion order.
    pub id: i64,
    /// Free-text time of day as the user said it.
    pub fire_spec: String,
    /// What to remind about.
    pub message: String,
    /// Unix epoch seconds at insertion.
    pub created_at: u64,
}

/// Errors raised by the reminder store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("lock poisoned")]
    LockPoisoned,
}
