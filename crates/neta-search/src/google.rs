//! Google Custom Search JSON API backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use neta_types::SearchSettings;

use crate::error::{is_quota_message, SearchError};
use crate::result::SearchHit;
use crate::web::SearchBackend;

/// Recency filter: results from the past month.
pub const RECENCY_FILTER: &str = "m1";

/// Prefer Japanese-language results.
pub const LANGUAGE_RESTRICT: &str = "lang_ja";

/// The API returns at most 10 results per call.
pub const GOOGLE_MAX_RESULTS: u32 = 10;

/// Configuration for [`GoogleSearch`].
#[derive(Debug, Clone)]
pub struct GoogleSearchConfig {
    /// Endpoint (e.g., "https://www.googleapis.com/customsearch/v1")
    pub base_url: String,
    pub api_key: SecretString,
    /// Programmable search engine id
    pub cse_id: String,
    pub timeout: Duration,
}

impl GoogleSearchConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        cse_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: SecretString::from(api_key.into()),
            cse_id: cse_id.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// `None` unless both the API key and the engine id are set.
    pub fn from_settings(settings: &SearchSettings) -> Option<Self> {
        let api_key = settings.google_api_key.as_deref().filter(|k| !k.is_empty())?;
        let cse_id = settings.google_cse_id.as_deref().filter(|k| !k.is_empty())?;

        let mut config = Self::new(settings.google_base_url.clone(), api_key, cse_id);
        config.timeout = Duration::from_secs(settings.timeout_secs);
        Some(config)
    }
}

/// Primary web search backend.
pub struct GoogleSearch {
    client: Client,
    config: GoogleSearchConfig,
}

impl GoogleSearch {
    pub fn new(config: GoogleSearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::NotConfigured(format!("Google search client ({e})")))?;

        Ok(Self { client, config })
    }
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CseItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    display_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CseErrorBody {
    error: CseError,
}

#[derive(Debug, Deserialize)]
struct CseError {
    #[serde(default)]
    message: String,
}

/// Map an error response to a [`SearchError`], flagging quota exhaustion.
fn classify_error(status: StatusCode, body: String) -> SearchError {
    let message = serde_json::from_str::<CseErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.clone());

    if status == StatusCode::TOO_MANY_REQUESTS || is_quota_message(&body) {
        return SearchError::Quota(message);
    }

    SearchError::Status {
        status: status.as_u16(),
        body: message,
    }
}

#[async_trait]
impl SearchBackend for GoogleSearch {
    fn name(&self) -> &str {
        "Google Custom Search"
    }

    async fn search(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>, SearchError> {
        let num = num_results.clamp(1, GOOGLE_MAX_RESULTS);
        let num_param = num.to_string();
        debug!(query, num, "Calling Google Custom Search");

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("key", self.config.api_key.expose_secret()),
                ("cx", self.config.cse_id.as_str()),
                ("q", query),
                ("lr", LANGUAGE_RESTRICT),
                ("num", num_param.as_str()),
                ("dateRestrict", RECENCY_FILTER),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, body));
        }

        let body: CseResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.without_url().to_string()))?;

        Ok(body
            .items
            .into_iter()
            .map(|item| {
                SearchHit::new(
                    item.title.unwrap_or_default(),
                    item.link.unwrap_or_default(),
                    item.snippet.unwrap_or_default(),
                    item.display_link.unwrap_or_default(),
                )
            })
            .collect())
    }
}
