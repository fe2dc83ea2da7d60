//! Current-weather lookup (OpenWeatherMap).

use std::fmt;

use serde::Deserialize;
use tracing::warn;

use super::{CollaboratorError, http_agent, map_http_error, read_json, require_secret};
use crate::config::WeatherConfig;

/// Temperature reading, or `unknown` when the lookup failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Temperature {
    /// Value in the unit system requested from the API.
    Reported(f64),
    Unknown,
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reported(t) => write!(f, "{t}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Result of a weather lookup. Always present, even on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub temperature: Temperature,
    pub description: String,
}

impl WeatherReport {
    /// Placeholder reported when the lookup fails.
    pub fn unavailable() -> Self {
        Self {
            temperature: Temperature::Unknown,
            description: "unavailable".to_owned(),
        }
    }
}

pub trait WeatherService: Send + Sync {
    /// Current conditions at `location`. Never fails; errors yield
    /// [`WeatherReport::unavailable`].
    fn get_weather(&self, location: &str) -> WeatherReport;
}

/// Blocking client for the OpenWeatherMap current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    config: WeatherConfig,
    agent: ureq::Agent,
}

#[derive(Deserialize)]
struct WeatherWire {
    main: MainWire,
    weather: Vec<ConditionWire>,
}

#[derive(Deserialize)]
struct MainWire {
    temp: f64,
}

#[derive(Deserialize)]
struct ConditionWire {
    description: String,
}

impl OpenWeatherClient {
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            config,
            agent: http_agent(),
        }
    }

    /// Fetch conditions, surfacing failures.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] on missing key, transport, status or
    /// decode failure.
    pub fn fetch(&self, location: &str) -> Result<WeatherReport, CollaboratorError> {
        let key = require_secret(self.config.api_key.as_deref(), "weather API key")?;

        let resp = self
            .agent
            .get(&self.config.base_url)
            .query("q", location)
            .query("appid", key)
            .query("units", &self.config.units)
            .call()
            .map_err(map_http_error)?;
        let wire: WeatherWire = read_json(resp)?;

        let description = wire
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| CollaboratorError::Decode("empty weather list".to_owned()))?;

        Ok(WeatherReport {
            temperature: Temperature::Reported(wire.main.temp),
            description,
        })
    }
}

impl WeatherService for OpenWeatherClient {
    fn get_weather(&self, location: &str) -> WeatherReport {
        self.fetch(location).unwrap_or_else(|e| {
            warn!("weather lookup for {location:?} failed: {e}");
            WeatherReport::unavailable()
        })
    }
}
