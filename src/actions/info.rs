//! Weather, news and time handlers.

use tracing::debug;

use super::{ActionContext, Reply};

/// Speak current conditions at `location`.
///
/// An empty location falls back to the configured default, if any; otherwise
/// the lookup runs with the empty string and the collaborator reports it
/// unavailable.
pub fn weather(ctx: &ActionContext, location: &str) -> Reply {
    let location = match (location.is_empty(), ctx.default_location.as_deref()) {
        (true, Some(default)) => default,
        _ => location,
    };
    let report = ctx.weather.get_weather(location);
    Reply::say(format!(
        "The weather in {location} is {} with a temperature of {}{}",
        report.description, report.temperature, ctx.temperature_unit
    ))
}

/// Announce the digest, then read the first few headlines one per line.
pub fn news(ctx: &ActionContext) -> Reply {
    let headlines = ctx.news.get_headlines();
    debug!("fetched {} headlines", headlines.len());
    std::iter::once("Here are today's top headlines:".to_owned())
        .chain(headlines.into_iter().take(ctx.spoken_headlines))
        .collect()
}

/// Current time on a 12-hour clock, e.g. "The current time is 02:05 PM".
pub fn time(ctx: &ActionContext) -> Reply {
    Reply::say(format!("The current time is {}", ctx.now().format("%I:%M %p")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::AssistantConfig;
    use crate::testing::{MockNews, MockWeather, TestHarness};

    #[test]
    fn weather_reply_includes_report() {
        let harness = TestHarness::new().with_weather(MockWeather::new(21.5, "clear sky"));
        let reply = weather(&harness.context(), "boston");
        assert_eq!(
            reply.lines(),
            ["The weather in boston is clear sky with a temperature of 21.5°C"]
        );
        assert_eq!(harness.weather.queries(), vec!["boston"]);
    }

    #[test]
    fn weather_failure_still_replies() {
        let harness = TestHarness::new().with_weather(MockWeather::unavailable());
        let reply = weather(&harness.context(), "atlantis");
        assert_eq!(
            reply.lines(),
            ["The weather in atlantis is unavailable with a temperature of unknown°C"]
        );
    }

    #[test]
    fn empty_location_is_passed_through_without_default() {
        let harness = TestHarness::new();
        weather(&harness.context(), "");
        assert_eq!(harness.weather.queries(), vec![""]);
    }

    #[test]
    fn empty_location_uses_configured_default() {
        let mut config = AssistantConfig::default();
        config.weather.default_location = Some("New York".to_owned());
        let harness = TestHarness::new().with_config(config);
        let reply = weather(&harness.context(), "");
        assert!(reply.lines()[0].starts_with("The weather in New York is"));
        assert_eq!(harness.weather.queries(), vec!["New York"]);
    }

    #[test]
    fn imperial_units_are_spoken_in_fahrenheit() {
        let mut config = AssistantConfig::default();
        config.weather.units = "imperial".to_owned();
        let harness = TestHarness::new()
            .with_config(config)
            .with_weather(MockWeather::new(70.0, "sunny"));
        let reply = weather(&harness.context(), "miami");
        assert_eq!(
            reply.lines(),
            ["The weather in miami is sunny with a temperature of 70°F"]
        );
    }

    #[test]
    fn news_reads_three_headlines() {
        let harness = TestHarness::new();
        let reply = news(&harness.context());
        assert_eq!(
            reply.lines(),
            [
                "Here are today's top headlines:",
                "Headline one",
                "Headline two",
                "Headline three"
            ]
        );
    }

    #[test]
    fn news_failure_reads_fallback() {
        let harness = TestHarness::new().with_news(MockNews::unavailable());
        let reply = news(&harness.context());
        assert_eq!(
            reply.lines(),
            [
                "Here are today's top headlines:",
                "Unable to fetch news headlines"
            ]
        );
    }

    #[test]
    fn time_uses_twelve_hour_clock() {
        let harness = TestHarness::new();
        let reply = time(&harness.context());
        assert_eq!(reply.lines(), ["The current time is 02:05 PM"]);
    }
}
