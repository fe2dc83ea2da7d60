//! Configuration types for the assistant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{AssistantError, Result};

/// Environment variable holding the OpenWeatherMap API key.
pub const WEATHER_API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Environment variable holding the NewsAPI key.
pub const NEWS_API_KEY_ENV: &str = "NEWS_API_KEY";

/// Environment variable holding a Google Calendar OAuth access token.
pub const CALENDAR_TOKEN_ENV: &str = "GOOGLE_CALENDAR_TOKEN";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Text-to-speech settings.
    pub voice: VoiceConfig,
    /// Speech capture settings.
    pub listener: ListenerConfig,
    /// Weather API settings.
    pub weather: WeatherConfig,
    /// News API settings.
    pub news: NewsConfig,
    /// Calendar API settings.
    pub calendar: CalendarConfig,
    /// Applications the assistant may launch.
    pub apps: AppsConfig,
    /// Web search settings.
    pub search: SearchConfig,
    /// Reminder scheduler settings.
    pub scheduler: SchedulerConfig,
    /// Reminder log settings.
    pub store: StoreConfig,
}

/// Which speech output backend to use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceEngine {
    /// Print replies to stdout only.
    #[default]
    Console,
    /// Print replies and render them through an external TTS program.
    Command,
}

/// Text-to-speech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Output backend.
    pub engine: VoiceEngine,
    /// TTS program for [`VoiceEngine::Command`] (`espeak`, `say`, ...).
    pub command: String,
    /// Speaking rate in words per minute.
    pub rate: u32,
    /// Output volume in `[0.0, 1.0]`.
    pub volume: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            engine: VoiceEngine::Console,
            command: "espeak".to_owned(),
            rate: 175,
            volume: 1.0,
        }
    }
}

/// Speech capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Prompt shown before each capture.
    pub prompt: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            prompt: "Listening...".to_owned(),
        }
    }
}

/// OpenWeatherMap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// API key (falls back to `WEATHER_API_KEY`).
    pub api_key: Option<String>,
    /// Current-weather endpoint.
    pub base_url: String,
    /// Unit system passed to the API.
    pub units: String,
    /// Location queried when the utterance names none.
    pub default_location: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "http://api.openweathermap.org/data/2.5/weather".to_owned(),
            units: "metric".to_owned(),
            default_location: None,
        }
    }
}

impl WeatherConfig {
    /// Suffix for spoken temperatures in the configured unit system.
    /// OpenWeatherMap reports `imperial` in Fahrenheit, `standard` in Kelvin
    /// and `metric` in Celsius.
    pub fn temperature_suffix(&self) -> &'static str {
        match self.units.trim().to_ascii_lowercase().as_str() {
            "imperial" => "°F",
            "standard" => " K",
            _ => "°C",
        }
    }
}

/// NewsAPI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// API key (falls back to `NEWS_API_KEY`).
    pub api_key: Option<String>,
    /// Top-headlines endpoint.
    pub base_url: String,
    /// Two-letter country code.
    pub country: String,
    /// Headline category.
    pub category: String,
    /// Headlines fetched per request.
    pub max_headlines: usize,
    /// Headlines read aloud per digest.
    pub spoken_headlines: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://newsapi.org/v2/top-headlines".to_owned(),
            country: "us".to_owned(),
            category: "general".to_owned(),
            max_headlines: 5,
            spoken_headlines: 3,
        }
    }
}

/// Google Calendar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Calendar API v3 root.
    pub base_url: String,
    /// Calendar to read and write.
    pub calendar_id: String,
    /// OAuth access token (falls back to `GOOGLE_CALENDAR_TOKEN`).
    pub access_token: Option<String>,
    /// Events returned by a listing.
    pub max_events: usize,
    /// IANA zone attached to created events whose times carry no offset.
    pub time_zone: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/calendar/v3".to_owned(),
            calendar_id: "primary".to_owned(),
            access_token: None,
            max_events: 5,
            time_zone: "UTC".to_owned(),
        }
    }
}

/// Application launch allow-list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppsConfig {
    /// Spoken application name → binary to launch. Lookup is case-sensitive.
    pub allow_list: BTreeMap<String, String>,
}

impl Default for AppsConfig {
    fn default() -> Self {
        let allow_list = [
            ("chrome", "google-chrome"),
            ("firefox", "firefox"),
            ("word", "winword"),
            ("excel", "excel"),
            ("notepad", "notepad"),
        ]
        .into_iter()
        .map(|(name, bin)| (name.to_owned(), bin.to_owned()))
        .collect();
        Self { allow_list }
    }
}

/// Web search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search URL; `{query}` is replaced by the URL-encoded query.
    pub url_template: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url_template: "https://www.google.com/search?q={query}".to_owned(),
        }
    }
}

/// Reminder scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Poll interval of the scheduler timeline in milliseconds.
    pub poll_interval_ms: u64,
    /// Fire-history entries kept in memory.
    pub history_limit: usize,
    /// Re-register stored reminders at start-up.
    pub restore_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            history_limit: 200,
            restore_on_start: false,
        }
    }
}

/// Reminder log configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database path (`None` = `data_dir()/assistant.db`).
    pub db_path: Option<PathBuf>,
}

impl StoreConfig {
    /// Effective database path.
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(crate::aide_dirs::reminder_db_file)
    }
}

impl AssistantConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AssistantError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AssistantError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `config_dir()/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::aide_dirs::config_file()
    }

    /// Fill unset secrets from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if self.weather.api_key.is_none() {
            self.weather.api_key = non_empty(WEATHER_API_KEY_ENV);
        }
        if self.news.api_key.is_none() {
            self.news.api_key = non_empty(NEWS_API_KEY_ENV);
        }
        if self.calendar.access_token.is_none() {
            self.calendar.access_token = non_empty(CALENDAR_TOKEN_ENV);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AssistantConfig::default();
        assert_eq!(config.voice.rate, 175);
        assert_eq!(config.listener.prompt, "Listening...");
        assert_eq!(config.news.country, "us");
        assert_eq!(config.news.max_headlines, 5);
        assert_eq!(config.news.spoken_headlines, 3);
        assert_eq!(config.scheduler.poll_interval_ms, 1000);
        assert!(!config.scheduler.restore_on_start);
    }

    #[test]
    fn default_allow_list_maps_spoken_names() {
        let apps = AppsConfig::default();
        assert_eq!(apps.allow_list.get("chrome").unwrap(), "google-chrome");
        assert_eq!(apps.allow_list.get("word").unwrap(), "winword");
        assert_eq!(apps.allow_list.get("notepad").unwrap(), "notepad");
        assert!(!apps.allow_list.contains_key("slack"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AssistantConfig = toml::from_str(
            r#"
            [news]
            country = "gb"

            [voice]
            engine = "command"
            command = "say"
            "#,
        )
        .unwrap();
        assert_eq!(config.news.country, "gb");
        assert_eq!(config.news.category, "general");
        assert_eq!(config.voice.engine, VoiceEngine::Command);
        assert_eq!(config.voice.command, "say");
        assert_eq!(config.voice.rate, 175);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AssistantConfig::default();
        config.weather.default_location = Some("Lisbon".to_owned());
        config.scheduler.restore_on_start = true;
        config.save_to_file(&path).unwrap();

        let loaded = AssistantConfig::from_file(&path).unwrap();
        assert_eq!(loaded.weather.default_location.as_deref(), Some("Lisbon"));
        assert!(loaded.scheduler.restore_on_start);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = AssistantConfig::from_file(std::path::Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn from_file_invalid_toml_returns_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        let result = AssistantConfig::from_file(&path);
        assert!(matches!(result, Err(AssistantError::Config(_))));
    }

    #[test]
    fn env_overrides_fill_only_missing_secrets() {
        let mut config = AssistantConfig::default();
        config.news.api_key = Some("from-file".to_owned());

        config.apply_overrides_from(|key| match key {
            WEATHER_API_KEY_ENV => Some("weather-env".to_owned()),
            NEWS_API_KEY_ENV => Some("news-env".to_owned()),
            CALENDAR_TOKEN_ENV => Some("   ".to_owned()),
            _ => None,
        });

        assert_eq!(config.weather.api_key.as_deref(), Some("weather-env"));
        assert_eq!(config.news.api_key.as_deref(), Some("from-file"));
        assert!(config.calendar.access_token.is_none());
    }

    #[test]
    fn store_path_defaults_under_data_dir() {
        let store = StoreConfig::default();
        assert!(store.resolved_db_path().ends_with("assistant.db"));

        let custom = StoreConfig {
            db_path: Some(PathBuf::from("/var/lib/aide/r.db")),
        };
        assert_eq!(custom.resolved_db_path(), PathBuf::from("/var/lib/aide/r.db"));
    }

    #[test]
    fn temperature_suffix_follows_units() {
        let mut weather = WeatherConfig::default();
        assert_eq!(weather.temperature_suffix(), "°C");
        weather.units = "imperial".to_owned();
        assert_eq!(weather.temperature_suffix(), "°F");
        weather.units = "standard".to_owned();
        assert_eq!(weather.temperature_suffix(), " K");
    }
}
