//! Calendar handlers: reading upcoming events and submitting a new one.
//!
//! Event creation spans several turns; the prompts live here while the
//! conversation controller drives the sub-dialogue.

use tracing::{info, warn};

use super::{ActionContext, Reply};
use crate::services::NewEvent;

pub const TITLE_PROMPT: &str = "What is the title of the event?";
pub const START_PROMPT: &str = "When does it start? Please say the date and time.";
pub const END_PROMPT: &str = "When does it end?";

/// Read upcoming events, one per line.
pub fn list_events(ctx: &ActionContext) -> Reply {
    match ctx.calendar.list_events() {
        Ok(events) if events.is_empty() => Reply::say("You have no upcoming events."),
        Ok(events) => std::iter::once("Here are your upcoming events:".to_owned())
            .chain(events)
            .collect(),
        Err(e) => {
            warn!("cannot list calendar events: {e}");
            Reply::say("Sorry, I couldn't fetch your calendar events.")
        }
    }
}

/// Create the collected event. Times are passed through as spoken.
pub fn add_event(ctx: &ActionContext, event: &NewEvent) -> Reply {
    match ctx.calendar.add_event(event) {
        Ok(link) => {
            info!("created calendar event {link}");
            Reply::say(format!("I've added {} to your calendar.", event.summary))
        }
        Err(e) => {
            warn!("cannot create calendar event: {e}");
            Reply::say("Sorry, I couldn't add that event to your calendar.")
        }
    }
}
