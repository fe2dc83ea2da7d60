//! The turn loop: capture → classify → act → speak.

pub mod controller;
pub mod state;

pub use controller::ConversationController;
pub use state::ConversationState;
