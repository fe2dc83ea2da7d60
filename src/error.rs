//! Error types for the assistant.
//!
//! Subsystems carry their own error enums ([`RecognitionError`],
//! [`ReminderParseError`], [`ScheduleError`], [`CollaboratorError`],
//! [`StoreError`]); all of them convert into [`AssistantError`].
//!
//! [`RecognitionError`]: crate::speech::RecognitionError
//! [`ReminderParseError`]: crate::intent::ReminderParseError
//! [`ScheduleError`]: crate::scheduler::ScheduleError
//! [`CollaboratorError`]: crate::services::CollaboratorError
//! [`StoreError`]: crate::store::StoreError

use crate::intent::ReminderParseError;
use crate::scheduler::ScheduleError;
use crate::services::CollaboratorError;
use crate::speech::RecognitionError;
use crate::store::StoreError;

/// Top-level error type for the assistant.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Speech capture or recognition service failure.
    #[error("recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// Malformed reminder text.
    #[error("parse error: {0}")]
    Parse(#[from] ReminderParseError),

    /// External API, auth, network or launch failure.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// Invalid time of day at registration.
    #[error("schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Reminder log failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AssistantError>;
