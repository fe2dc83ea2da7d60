//! Conversation states.
//!
//! ```text
//! Idle → Dispatching → Idle
//! Idle → Dispatching → CollectingTitle → CollectingStart → CollectingEnd → Submitting → Idle
//! ```
//!
//! Only event creation uses the collecting states. Fields captured so far
//! travel inside the state, so at most one draft can exist.

use std::fmt;

use crate::services::NewEvent;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversationState {
    /// Waiting for a command.
    #[default]
    Idle,
    /// A command is being classified and handled.
    Dispatching,
    /// Waiting for the event title.
    CollectingTitle,
    /// Waiting for the event start.
    CollectingStart { title: String },
    /// Waiting for the event end.
    CollectingEnd { title: String, start: String },
    /// The collected event is being sent to the calendar.
    Submitting,
}

impl ConversationState {
    /// Returns `true` while an event-creation sub-dialogue is collecting input.
    pub fn is_collecting(&self) -> bool {
        matches!(
            self,
            Self::CollectingTitle | Self::CollectingStart { .. } | Self::CollectingEnd { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dispatching => "dispatching",
            Self::CollectingTitle => "collecting_title",
            Self::CollectingStart { .. } => "collecting_start",
            Self::CollectingEnd { .. } => "collecting_end",
            Self::Submitting => "submitting",
        }
    }

    /// Feed one captured answer into a collecting state.
    ///
    /// Returns the next state and, once the end time arrives, the completed
    /// event. Non-collecting states are returned unchanged.
    pub fn advance(self, answer: &str) -> (Self, Option<NewEvent>) {
        match self {
            Self::CollectingTitle => (
                Self::CollectingStart {
                    title: answer.to_owned(),
                },
                None,
            ),
            Self::CollectingStart { title } => (
                Self::CollectingEnd {
                    title,
                    start: answer.to_owned(),
                },
                None,
            ),
            Self::CollectingEnd { title, start } => (
                Self::Submitting,
                Some(NewEvent {
                    summary: title,
                    start,
                    end: answer.to_owned(),
                    description: String::new(),
                }),
            ),
            other => (other, None),
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
