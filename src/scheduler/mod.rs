//! Daily callback scheduler.
//!
//! Reminders register a callback for a wall-clock time of day; a background
//! tokio task polls the table and fires whatever has come due, independently
//! of the conversation loop.

pub mod runner;
pub mod tasks;

pub use runner::{DEFAULT_POLL_INTERVAL, JobCallback, Scheduler};
pub use tasks::{DailyJob, FireRecord, JobId, ScheduleError, TimeOfDay};
