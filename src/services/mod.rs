//! External collaborators: HTTP APIs, process launching, the browser.
//!
//! Each collaborator sits behind a small `Send + Sync` trait so handlers can
//! be exercised with the in-memory doubles in [`crate::testing`]. The real
//! clients are blocking (`ureq`), matching the blocking turn loop.

pub mod browser;
pub mod calendar;
pub mod launcher;
pub mod news;
pub mod weather;


use std::time::Duration;

use serde::Deserialize;

pub use browser::{Browser, SystemBrowser, search_url};
pub use calendar::{CalendarService, GoogleCalendarClient, NewEvent};
pub use launcher::{AppLauncher, ProcessLauncher};
pub use news::{NEWS_FALLBACK_HEADLINE, NewsApiClient, NewsService};
pub use weather::{OpenWeatherClient, Temperature, WeatherReport, WeatherService};

/// Failure talking to an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// Transport failure (DNS, connect, timeout).
    #[error("HTTP error: {0}")]
    Http(String),
    /// Credentials rejected (401/403).
    #[error("authorization failed: {0}")]
    Auth(String),
    /// The API answered with an error status.
    #[error("API error: {0}")]
    Api(String),
    /// A local program could not be started.
    #[error("launch failed: {0}")]
    Launch(String),
    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
    /// A required setting (API key, token) is missing.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

const USER_AGENT: &str = concat!("aide/", env!("CARGO_PKG_VERSION"));

pub(crate) fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(Duration::from_secs(20))
        .timeout_write(Duration::from_secs(20))
        .user_agent(USER_AGENT)
        .build()
}

pub(crate) fn map_http_error(err: ureq::Error) -> CollaboratorError {
    match err {
        ureq::Error::Status(code @ (401 | 403), resp) => {
            CollaboratorError::Auth(format!("{code} {}", resp.status_text()))
        }
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            CollaboratorError::Api(format!("{code}: {}", body.trim()))
        }
        ureq::Error::Transport(t) => CollaboratorError::Http(t.to_string()),
    }
}

pub(crate) fn read_json<T: for<'de> Deserialize<'de>>(
    resp: ureq::Response,
) -> Result<T, CollaboratorError> {
    let body = resp
        .into_string()
        .map_err(|e| CollaboratorError::Http(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| CollaboratorError::Decode(e.to_string()))
}

/// Treat a blank configured secret as absent.
pub(crate) fn require_secret<'a>(
    value: Option<&'a str>,
    name: &'static str,
) -> Result<&'a str, CollaboratorError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(CollaboratorError::NotConfigured(name))
}
