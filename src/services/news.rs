//! Top-headlines digest (NewsAPI).

use serde::Deserialize;
use tracing::warn;

use super::{CollaboratorError, http_agent, map_http_error, read_json, require_secret};
use crate::config::NewsConfig;

/// Single headline returned when the lookup fails.
pub const NEWS_FALLBACK_HEADLINE: &str = "Unable to fetch news headlines";

pub trait NewsService: Send + Sync {
    /// Up to the configured number of headlines. Never fails; errors yield
    /// [`NEWS_FALLBACK_HEADLINE`].
    fn get_headlines(&self) -> Vec<String>;
}

/// Blocking client for the NewsAPI top-headlines endpoint.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    config: NewsConfig,
    agent: ureq::Agent,
}

#[derive(Deserialize)]
struct HeadlinesWire {
    articles: Vec<ArticleWire>,
}

#[derive(Deserialize)]
struct ArticleWire {
    title: Option<String>,
}

impl NewsApiClient {
    pub fn new(config: NewsConfig) -> Self {
        Self {
            config,
            agent: http_agent(),
        }
    }

    /// Fetch headlines, surfacing failures.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] on missing key, transport, status or
    /// decode failure.
    pub fn fetch(&self) -> Result<Vec<String>, CollaboratorError> {
        let key = require_secret(self.config.api_key.as_deref(), "news API key")?;

        let resp = self
            .agent
            .get(&self.config.base_url)
            .query("country", &self.config.country)
            .query("category", &self.config.category)
            .query("apiKey", key)
            .call()
            .map_err(map_http_error)?;
        let wire: HeadlinesWire = read_json(resp)?;

        Ok(wire
            .articles
            .into_iter()
            .filter_map(|a| a.title)
            .filter(|t| !t.trim().is_empty())
            .take(self.config.max_headlines)
            .collect())
    }
}

impl NewsService for NewsApiClient {
    fn get_headlines(&self) -> Vec<String> {
        self.fetch().unwrap_or_else(|e| {
            warn!("news lookup failed: {e}");
            vec![NEWS_FALLBACK_HEADLINE.to_owned()]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_yields_fallback() {
        let client = NewsApiClient::new(NewsConfig::default());
        assert_eq!(
            client.get_headlines(),
            vec![NEWS_FALLBACK_HEADLINE.to_owned()]
        );
    }
}
