//! Google Calendar collaborator: list upcoming events, create events.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CollaboratorError, http_agent, map_http_error, read_json, require_secret};
use crate::config::CalendarConfig;

/// Fields of an event to create. Times are passed through unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewEvent {
    pub summary: String,
    /// ISO-8601 start, e.g. `2025-01-12T10:00:00`.
    pub start: String,
    /// ISO-8601 end.
    pub end: String,
    pub description: String,
}

pub trait CalendarService: Send + Sync {
    /// Upcoming events formatted as `"<start>: <summary>"`.
    fn list_events(&self) -> Result<Vec<String>, CollaboratorError>;

    /// Create an event and return its HTML link.
    fn add_event(&self, event: &NewEvent) -> Result<String, CollaboratorError>;
}

/// Blocking Google Calendar v3 client authenticated with a bearer token.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    config: CalendarConfig,
    agent: ureq::Agent,
}

#[derive(Deserialize)]
struct EventListWire {
    #[serde(default)]
    items: Vec<EventWire>,
}

#[derive(Deserialize)]
struct EventWire {
    summary: Option<String>,
    start: Option<EventTimeWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTimeWire {
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertEventWire<'a> {
    summary: &'a str,
    description: &'a str,
    start: InsertTimeWire<'a>,
    end: InsertTimeWire<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertTimeWire<'a> {
    date_time: &'a str,
    time_zone: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedWire {
    html_link: String,
}

impl GoogleCalendarClient {
    pub fn new(config: CalendarConfig) -> Self {
        Self {
            config,
            agent: http_agent(),
        }
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.calendar_id)
        )
    }

    fn bearer(&self) -> Result<String, CollaboratorError> {
        let token = require_secret(self.config.access_token.as_deref(), "calendar access token")?;
        Ok(format!("Bearer {token}"))
    }
}

impl CalendarService for GoogleCalendarClient {
    fn list_events(&self) -> Result<Vec<String>, CollaboratorError> {
        let auth = self.bearer()?;
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

        let resp = self
            .agent
            .get(&self.events_url())
            .set("Authorization", &auth)
            .query("timeMin", &now)
            .query("maxResults", &self.config.max_events.to_string())
            .query("singleEvents", "true")
            .query("orderBy", "startTime")
            .call()
            .map_err(map_http_error)?;
        let wire: EventListWire = read_json(resp)?;

        debug!("calendar returned {} events", wire.items.len());
        Ok(wire
            .items
            .into_iter()
            .take(self.config.max_events)
            .map(|item| {
                let start = item
                    .start
                    .and_then(|s| s.date_time.or(s.date))
                    .unwrap_or_default();
                let summary = item.summary.unwrap_or_else(|| "(no title)".to_owned());
                format!("{start}: {summary}")
            })
            .collect())
    }

    fn add_event(&self, event: &NewEvent) -> Result<String, CollaboratorError> {
        let auth = self.bearer()?;
        let body = InsertEventWire {
            summary: &event.summary,
            description: &event.description,
            start: InsertTimeWire {
                date_time: &event.start,
                time_zone: &self.config.time_zone,
            },
            end: InsertTimeWire {
                date_time: &event.end,
                time_zone: &self.config.time_zone,
            },
        };
        let json =
            serde_json::to_string(&body).map_err(|e| CollaboratorError::Decode(e.to_string()))?;

        let resp = self
            .agent
            .post(&self.events_url())
            .set("Authorization", &auth)
            .set("Content-Type", "application/json")
            .send_string(&json)
            .map_err(map_http_error)?;
        let inserted: InsertedWire = read_json(resp)?;
        Ok(inserted.html_link)
    }
}
