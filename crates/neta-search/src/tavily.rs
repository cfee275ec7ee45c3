//! Tavily search API backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use neta_types::SearchSettings;

use crate::error::{is_quota_message, SearchError};
use crate::result::SearchHit;
use crate::web::SearchBackend;

/// Recency window sent with every request.
pub const TAVILY_TIME_RANGE: &str = "month";

/// Tavily accepts at most 20 results per request.
pub const TAVILY_MAX_RESULTS: u32 = 20;

/// Configuration for [`TavilySearch`].
#[derive(Debug, Clone)]
pub struct TavilySearchConfig {
    /// API host (e.g., "https://api.tavily.com")
    pub base_url: String,
    pub api_key: SecretString,
    pub timeout: Duration,
}

impl TavilySearchConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(10),
        }
    }

    /// `None` unless the API key is set.
    pub fn from_settings(settings: &SearchSettings) -> Option<Self> {
        let api_key = settings.tavily_api_key.as_deref().filter(|k| !k.is_empty())?;
        let mut config = Self::new(settings.tavily_base_url.clone(), api_key);
        config.timeout = Duration::from_secs(settings.timeout_secs);
        Some(config)
    }
}

/// Results plus the optional synthesized answer.
#[derive(Debug, Clone, Default)]
pub struct TavilyAnswer {
    pub answer: Option<String>,
    pub hits: Vec<SearchHit>,
}

/// Secondary web search backend.
pub struct TavilySearch {
    client: Client,
    config: TavilySearchConfig,
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    topic: &'static str,
    search_depth: &'static str,
    max_results: u32,
    include_answer: bool,
    time_range: &'static str,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyItem>,
}

#[derive(Debug, Deserialize)]
struct TavilyItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Host part of a URL, used as the site label.
fn site_label(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

impl TavilySearch {
    pub fn new(config: TavilySearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::NotConfigured(format!("Tavily search client ({e})")))?;

        Ok(Self { client, config })
    }

    /// Run a search, optionally in advanced depth and with an answer summary.
    pub async fn search_with(
        &self,
        query: &str,
        num_results: u32,
        advanced: bool,
        include_answer: bool,
    ) -> Result<TavilyAnswer, SearchError> {
        let request = TavilyRequest {
            query,
            topic: "general",
            search_depth: if advanced { "advanced" } else { "basic" },
            max_results: num_results.clamp(1, TAVILY_MAX_RESULTS),
            include_answer,
            time_range: TAVILY_TIME_RANGE,
        };

        debug!(query, advanced, max_results = request.max_results, "Calling Tavily search");

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::TOO_MANY_REQUESTS || is_quota_message(&body) {
                return Err(SearchError::Quota(body));
            }
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.without_url().to_string()))?;

        let hits = body
            .results
            .into_iter()
            .map(|item| {
                let link = item.url.unwrap_or_default();
                let label = site_label(&link);
                SearchHit::new(
                    item.title.unwrap_or_default(),
                    link,
                    item.content.unwrap_or_default(),
                    label,
                )
            })
            .collect();

        Ok(TavilyAnswer {
            answer: body.answer.filter(|a| !a.trim().is_empty()),
            hits,
        })
    }
}

#[async_trait]
impl SearchBackend for TavilySearch {
    fn name(&self) -> &str {
        "Tavily"
    }

    async fn search(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>, SearchError> {
        Ok(self.search_with(query, num_results, false, false).await?.hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_label() {
        assert_eq!(site_label("https://zenn.dev/articles/abc"), "zenn.dev");
        assert_eq!(site_label("not a url"), "");
    }

    #[test]
    fn test_request_shape() {
        let request = TavilyRequest {
            query: "Rust async",
            topic: "general",
            search_depth: "advanced",
            max_results: 5,
            include_answer: true,
            time_range: TAVILY_TIME_RANGE,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["search_depth"], "advanced");
        assert_eq!(json["time_range"], "month");
        assert_eq!(json["include_answer"], true);
    }

    #[test]
    fn test_config_from_settings() {
        let settings = SearchSettings::default();
        assert!(TavilySearchConfig::from_settings(&settings).is_none());

        let settings = SearchSettings {
            tavily_api_key: Some("tvly-key".to_string()),
            ..Default::default()
        };
        let config = TavilySearchConfig::from_settings(&settings).unwrap();
        assert_eq!(config.base_url, "https://api.tavily.com");
    }
}
