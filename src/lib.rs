//! Aide: a voice-driven personal assistant loop.
//!
//! Spoken commands flow through a fixed pipeline:
//! Listener → IntentDispatcher → ActionHandler → Speaker
//!
//! # Architecture
//!
//! Two timelines share the speaker and the reminder store:
//! - **Turn loop**: [`ConversationController`] blocks on one capture per turn,
//!   classifies it with [`IntentDispatcher`] and runs the matching handler,
//!   or feeds it to the event-creation sub-dialogue
//! - **Scheduler**: [`Scheduler`] polls daily reminder callbacks on a tokio
//!   task and fires them whenever due, regardless of the turn loop
//!
//! External collaborators (speech, weather, news, calendar, launcher,
//! browser) sit behind traits in [`speech`] and [`services`].

pub mod actions;
pub mod aide_dirs;
pub mod config;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod scheduler;
pub mod services;
pub mod speech;
pub mod store;
pub mod testing;

pub use actions::{ActionContext, Reply};
pub use config::AssistantConfig;
pub use conversation::{ConversationController, ConversationState};
pub use error::{AssistantError, Result};
pub use intent::{Intent, IntentDispatcher};
pub use scheduler::Scheduler;
pub use store::ReminderStore;
