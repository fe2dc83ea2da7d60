//! In-memory collaborator doubles for exercising the conversation loop and
//! action handlers without audio, network or process access.
//!
//! [`TestHarness`] wires every double into an [`ActionContext`] with a fixed
//! clock and an in-memory reminder store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime};

use crate::actions::ActionContext;
use crate::config::AssistantConfig;
use crate::scheduler::Scheduler;
use crate::services::{
    AppLauncher, Browser, CalendarService, CollaboratorError, NEWS_FALLBACK_HEADLINE, NewEvent,
    NewsService, Temperature, WeatherReport, WeatherService,
};
use crate::speech::{RecognitionError, SpeechInput, SpeechOutput, Speaker};
use crate::store::ReminderStore;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ─── Speech ───────────────────────────────────────────────────────────────────

/// Replays a fixed script of capture results, then reports the input closed.
#[derive(Debug, Default)]
pub struct ScriptedListener {
    script: VecDeque<Result<String, RecognitionError>>,
}

impl ScriptedListener {
    /// Script of successful captures.
    pub fn new<I, S>(utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_results(utterances.into_iter().map(|u| Ok(u.into())))
    }

    /// Script mixing captures and recognition failures.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, RecognitionError>>,
    {
        Self {
            script: results.into_iter().collect(),
        }
    }

    /// Captures not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl SpeechInput for ScriptedListener {
    fn capture(&mut self) -> Result<String, RecognitionError> {
        self.script
            .pop_front()
            .unwrap_or(Err(RecognitionError::InputClosed))
    }
}

/// Records every spoken line. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingVoice {
    spoken: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingVoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records lines but reports every render as failed.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Everything spoken so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        lock(&self.spoken).clone()
    }

    /// Forget recorded lines.
    pub fn clear(&self) {
        lock(&self.spoken).clear();
    }
}

impl SpeechOutput for RecordingVoice {
    fn speak(&mut self, text: &str) -> std::io::Result<()> {
        lock(&self.spoken).push(text.to_owned());
        if self.fail {
            return Err(std::io::Error::other("mock voice failure"));
        }
        Ok(())
    }
}

// ─── Services ─────────────────────────────────────────────────────────────────

/// Weather double returning a fixed report and recording queried locations.
#[derive(Debug)]
pub struct MockWeather {
    report: WeatherReport,
    queries: Mutex<Vec<String>>,
}

impl MockWeather {
    pub fn new(temperature: f64, description: &str) -> Self {
        Self::returning(WeatherReport {
            temperature: Temperature::Reported(temperature),
            description: description.to_owned(),
        })
    }

    pub fn returning(report: WeatherReport) -> Self {
        Self {
            report,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Behaves like a failed lookup.
    pub fn unavailable() -> Self {
        Self::returning(WeatherReport::unavailable())
    }

    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

impl WeatherService for MockWeather {
    fn get_weather(&self, location: &str) -> WeatherReport {
        lock(&self.queries).push(location.to_owned());
        self.report.clone()
    }
}

/// News double returning fixed headlines.
#[derive(Debug, Clone)]
pub struct MockNews {
    headlines: Vec<String>,
}

impl MockNews {
    pub fn new<I, S>(headlines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headlines: headlines.into_iter().map(Into::into).collect(),
        }
    }

    /// Behaves like a failed lookup.
    pub fn unavailable() -> Self {
        Self::new([NEWS_FALLBACK_HEADLINE])
    }
}

impl NewsService for MockNews {
    fn get_headlines(&self) -> Vec<String> {
        self.headlines.clone()
    }
}

/// Calendar double with scripted outcomes and a record of created events.
#[derive(Debug)]
pub struct MockCalendar {
    events: Result<Vec<String>, CollaboratorError>,
    add_result: Result<String, CollaboratorError>,
    added: Mutex<Vec<NewEvent>>,
}

impl MockCalendar {
    /// Lists `events`; every creation succeeds.
    pub fn new<I, S>(events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            events: Ok(events.into_iter().map(Into::into).collect()),
            add_result: Ok("https://calendar.example/event/1".to_owned()),
            added: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with `err`. Attempted creations are still recorded.
    pub fn failing(err: CollaboratorError) -> Self {
        Self {
            events: Err(err.clone()),
            add_result: Err(err),
            added: Mutex::new(Vec::new()),
        }
    }

    /// Events passed to `add_event`, in call order.
    pub fn added(&self) -> Vec<NewEvent> {
        lock(&self.added).clone()
    }
}

impl CalendarService for MockCalendar {
    fn list_events(&self) -> Result<Vec<String>, CollaboratorError> {
        self.events.clone()
    }

    fn add_event(&self, event: &NewEvent) -> Result<String, CollaboratorError> {
        lock(&self.added).push(event.clone());
        self.add_result.clone()
    }
}

/// Launcher double recording requested binaries.
#[derive(Debug, Default)]
pub struct MockLauncher {
    launched: Mutex<Vec<String>>,
    fail: bool,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn launched(&self) -> Vec<String> {
        lock(&self.launched).clone()
    }
}

impl AppLauncher for MockLauncher {
    fn launch(&self, binary: &str) -> Result<(), CollaboratorError> {
        lock(&self.launched).push(binary.to_owned());
        if self.fail {
            return Err(CollaboratorError::Launch(format!("{binary}: not found")));
        }
        Ok(())
    }
}

/// Browser double recording opened URLs.
#[derive(Debug, Default)]
pub struct MockBrowser {
    opened: Mutex<Vec<String>>,
    fail: bool,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<String> {
        lock(&self.opened).clone()
    }
}

impl Browser for MockBrowser {
    fn open_url(&self, url: &str) -> Result<(), CollaboratorError> {
        lock(&self.opened).push(url.to_owned());
        if self.fail {
            return Err(CollaboratorError::Launch("no browser".to_owned()));
        }
        Ok(())
    }
}

// ─── Harness ──────────────────────────────────────────────────────────────────

/// Fixed instant used as "now" by [`TestHarness`]: 2025-01-12 14:05.
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 12)
        .and_then(|d| d.and_hms_opt(14, 5, 0))
        .unwrap_or_default()
}

/// Every collaborator double, plus the context built from them.
pub struct TestHarness {
    pub voice: RecordingVoice,
    pub weather: Arc<MockWeather>,
    pub news: Arc<MockNews>,
    pub calendar: Arc<MockCalendar>,
    pub launcher: Arc<MockLauncher>,
    pub browser: Arc<MockBrowser>,
    pub scheduler: Scheduler,
    pub store: Arc<ReminderStore>,
    pub config: AssistantConfig,
}

impl TestHarness {
    /// Harness with succeeding collaborators and default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory SQLite database cannot be opened.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            voice: RecordingVoice::new(),
            weather: Arc::new(MockWeather::new(21.5, "clear sky")),
            news: Arc::new(MockNews::new([
                "Headline one",
                "Headline two",
                "Headline three",
                "Headline four",
                "Headline five",
            ])),
            calendar: Arc::new(MockCalendar::new(["2025-01-12T09:00:00Z: Standup"])),
            launcher: Arc::new(MockLauncher::new()),
            browser: Arc::new(MockBrowser::new()),
            scheduler: Scheduler::new(),
            store: Arc::new(ReminderStore::open_in_memory().expect("in-memory reminder store")),
            config: AssistantConfig::default(),
        }
    }

    pub fn with_weather(mut self, weather: MockWeather) -> Self {
        self.weather = Arc::new(weather);
        self
    }

    pub fn with_news(mut self, news: MockNews) -> Self {
        self.news = Arc::new(news);
        self
    }

    pub fn with_calendar(mut self, calendar: MockCalendar) -> Self {
        self.calendar = Arc::new(calendar);
        self
    }

    pub fn with_launcher(mut self, launcher: MockLauncher) -> Self {
        self.launcher = Arc::new(launcher);
        self
    }

    pub fn with_browser(mut self, browser: MockBrowser) -> Self {
        self.browser = Arc::new(browser);
        self
    }

    pub fn with_config(mut self, config: AssistantConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a context sharing this harness's doubles, clocked at
    /// [`fixed_now`].
    pub fn context(&self) -> ActionContext {
        ActionContext::builder(&self.config, Arc::clone(&self.store))
            .speaker(Speaker::new(self.voice.clone()))
            .scheduler(self.scheduler.clone())
            .weather(Arc::clone(&self.weather) as Arc<dyn WeatherService>)
            .news(Arc::clone(&self.news) as Arc<dyn NewsService>)
            .calendar(Arc::clone(&self.calendar) as Arc<dyn CalendarService>)
            .launcher(Arc::clone(&self.launcher) as Arc<dyn AppLauncher>)
            .browser(Arc::clone(&self.browser) as Arc<dyn Browser>)
            .clock(fixed_now)
            .build()
    }

    /// Lines spoken so far.
    pub fn spoken(&self) -> Vec<String> {
        self.voice.spoken()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
