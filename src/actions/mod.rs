//! Action handlers: one per [`Intent`], each turning parameters into a reply.
//!
//! Handlers are total. Collaborator failures are caught here and turned into
//! a spoken apology, so nothing a handler does can end the conversation.

pub mod calendar;
pub mod info;
pub mod reminder;
pub mod system;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use crate::config::AssistantConfig;
use crate::intent::Intent;
use crate::scheduler::Scheduler;
use crate::services::{
    AppLauncher, Browser, CalendarService, GoogleCalendarClient, NewsApiClient, NewsService,
    OpenWeatherClient, ProcessLauncher, SystemBrowser, WeatherService,
};
use crate::speech::{ConsoleVoice, Speaker};
use crate::store::ReminderStore;

pub use reminder::ReminderAction;

/// Spoken at start-up.
pub const GREETING: &str = "Hello! How can I help you today?";
/// Spoken on exit.
pub const FAREWELL: &str = "Goodbye!";
/// Spoken when the recognition backend fails.
pub const RECOGNITION_APOLOGY: &str =
    "Sorry, there was an error with the speech recognition service.";

/// Source of the current local time.
pub type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Lines to speak in response to a command, in order. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    lines: Vec<String>,
}

impl Reply {
    /// Nothing to say.
    pub fn silent() -> Self {
        Self::default()
    }

    /// A single line.
    pub fn say(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
        }
    }

    /// Append another line.
    pub fn then(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    /// Lines in speaking order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True when there is nothing to say.
    pub fn is_silent(&self) -> bool {
        self.lines.is_empty()
    }

    /// Speak every line through `speaker`.
    pub fn speak(&self, speaker: &Speaker) {
        for line in &self.lines {
            speaker.say(line);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Reply {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything a handler may touch. Passed explicitly to the turn loop and
/// every handler; there is no global state.
#[derive(Clone)]
pub struct ActionContext {
    /// Output shared with scheduled reminders.
    pub speaker: Speaker,
    /// Daily reminder timeline.
    pub scheduler: Scheduler,
    /// Append-only reminder log.
    pub store: Arc<ReminderStore>,
    pub weather: Arc<dyn WeatherService>,
    pub news: Arc<dyn NewsService>,
    pub calendar: Arc<dyn CalendarService>,
    /// Starts allow-listed applications.
    pub launcher: Arc<dyn AppLauncher>,
    /// Opens search URLs.
    pub browser: Arc<dyn Browser>,
    /// Spoken application name → binary.
    pub apps: BTreeMap<String, String>,
    /// Search URL with a `{query}` placeholder.
    pub search_url_template: String,
    /// Used when a weather request names no location.
    pub default_location: Option<String>,
    /// Suffix for spoken temperatures, matching the configured units.
    pub temperature_unit: &'static str,
    /// Headlines read aloud per news request.
    pub spoken_headlines: usize,
    /// Source of "now" for the time reply and reminder registration.
    pub clock: Clock,
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("scheduler", &self.scheduler)
            .field("store", &self.store)
            .field("apps", &self.apps)
            .finish_non_exhaustive()
    }
}

impl ActionContext {
    /// Start building a context from configuration. Collaborators default to
    /// the real clients; override any of them on the builder.
    pub fn builder(config: &AssistantConfig, store: Arc<ReminderStore>) -> ActionContextBuilder {
        ActionContextBuilder {
            config: config.clone(),
            store,
            speaker: None,
            scheduler: None,
            weather: None,
            news: None,
            calendar: None,
            launcher: None,
            browser: None,
            clock: local_now,
        }
    }

    /// Current local time according to the context clock.
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}

/// Builder for [`ActionContext`].
pub struct ActionContextBuilder {
    config: AssistantConfig,
    store: Arc<ReminderStore>,
    speaker: Option<Speaker>,
    scheduler: Option<Scheduler>,
    weather: Option<Arc<dyn WeatherService>>,
    news: Option<Arc<dyn NewsService>>,
    calendar: Option<Arc<dyn CalendarService>>,
    launcher: Option<Arc<dyn AppLauncher>>,
    browser: Option<Arc<dyn Browser>>,
    clock: Clock,
}

impl ActionContextBuilder {
    /// Output device. Defaults to the console.
    pub fn speaker(mut self, speaker: Speaker) -> Self {
        self.speaker = Some(speaker);
        self
    }

    /// Share an existing scheduler. Defaults to a fresh one.
    pub fn scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Weather lookup. Defaults to OpenWeatherMap.
    pub fn weather(mut self, weather: Arc<dyn WeatherService>) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Headline source. Defaults to NewsAPI.
    pub fn news(mut self, news: Arc<dyn NewsService>) -> Self {
        self.news = Some(news);
        self
    }

    /// Calendar backend. Defaults to Google Calendar.
    pub fn calendar(mut self, calendar: Arc<dyn CalendarService>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Application launcher. Defaults to spawning the binary.
    pub fn launcher(mut self, launcher: Arc<dyn AppLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Browser. Defaults to the platform opener.
    pub fn browser(mut self, browser: Arc<dyn Browser>) -> Self {
        self.browser = Some(browser);
        self
    }

    /// Time source. Defaults to local wall-clock time.
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Finish the context, filling unset collaborators with the real clients.
    pub fn build(self) -> ActionContext {
        let config = self.config;
        ActionContext {
            speaker: self
                .speaker
                .unwrap_or_else(|| Speaker::new(ConsoleVoice::stdout())),
            scheduler: self.scheduler.unwrap_or_default(),
            store: self.store,
            weather: self
                .weather
                .unwrap_or_else(|| Arc::new(OpenWeatherClient::new(config.weather.clone()))),
            news: self
                .news
                .unwrap_or_else(|| Arc::new(NewsApiClient::new(config.news.clone()))),
            calendar: self
                .calendar
                .unwrap_or_else(|| Arc::new(GoogleCalendarClient::new(config.calendar.clone()))),
            launcher: self.launcher.unwrap_or_else(|| Arc::new(ProcessLauncher)),
            browser: self.browser.unwrap_or_else(|| Arc::new(SystemBrowser)),
            apps: config.apps.allow_list,
            search_url_template: config.search.url_template,
            temperature_unit: config.weather.temperature_suffix(),
            default_location: config.weather.default_location,
            spoken_headlines: config.news.spoken_headlines,
            clock: self.clock,
        }
    }
}

/// Run the handler for `intent`.
///
/// [`Intent::CalendarAdd`] only opens the sub-dialogue; the conversation
/// controller collects the fields and calls [`calendar::add_event`].
pub fn execute(ctx: &ActionContext, intent: &Intent) -> Reply {
    match intent {
        Intent::Weather { location } => info::weather(ctx, location),
        Intent::News => info::news(ctx),
        Intent::SetReminder { command } => ReminderAction::new(ctx).set(command),
        Intent::OpenApp { app } => system::open_app(ctx, app),
        Intent::Search { query } => system::search(ctx, query),
        Intent::Time => info::time(ctx),
        Intent::Exit => Reply::say(FAREWELL),
        Intent::CalendarList => calendar::list_events(ctx),
        Intent::CalendarAdd => Reply::say(calendar::TITLE_PROMPT),
        Intent::NoOp => Reply::silent(),
    }
}
