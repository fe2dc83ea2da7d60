//! Application launch and web search handlers.

use tracing::warn;

use super::{ActionContext, Reply};
use crate::services::search_url;

/// Launch an allow-listed application. Unknown names are refused politely.
pub fn open_app(ctx: &ActionContext, app: &str) -> Reply {
    let Some(binary) = ctx.apps.get(app) else {
        return Reply::say("Sorry, I don't know how to open that application");
    };
    match ctx.launcher.launch(binary) {
        Ok(()) => Reply::say(format!("Opening {app}")),
        Err(e) => {
            warn!("cannot open {app}: {e}");
            Reply::say("Sorry, I couldn't open that application")
        }
    }
}

/// Open a browser search for `query`.
pub fn search(ctx: &ActionContext, query: &str) -> Reply {
    let url = search_url(&ctx.search_url_template, query);
    match ctx.browser.open_url(&url) {
        Ok(()) => Reply::say(format!("Searching for {query}")),
        Err(e) => {
            warn!("cannot open browser for {query:?}: {e}");
            Reply::say("Sorry, I couldn't open the browser for that search")
        }
    }
}
