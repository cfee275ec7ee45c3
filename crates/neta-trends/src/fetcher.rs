//! Qiita article fetcher.
//!
//! Both fetch methods make a single bounded-timeout GET against the item
//! listing endpoint. Failures are logged and turned into an empty batch.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use neta_types::{Article, QiitaSettings};

use crate::error::TrendsError;

/// Minimum stock count for an article to count as popular.
pub const POPULAR_STOCK_THRESHOLD: u32 = 50;

/// Qiita caps `per_page` at 100.
pub const MAX_PER_PAGE: u32 = 100;

/// Search query selecting popular articles.
pub const POPULAR_QUERY: &str = "stocks:>50";

/// A source of articles.
///
/// Implementations never fail: an unreachable source yields an empty batch.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Articles with more than [`POPULAR_STOCK_THRESHOLD`] stocks.
    async fn fetch_popular(&self, page: u32, per_page: u32) -> Vec<Article>;

    /// First page of articles matching a search query.
    async fn search_by_query(&self, query: &str, per_page: u32) -> Vec<Article>;
}

/// Configuration for [`QiitaClient`].
#[derive(Debug, Clone)]
pub struct QiitaClientConfig {
    /// API host (e.g., "https://qiita.com")
    pub base_url: String,

    /// Optional personal access token
    pub access_token: Option<SecretString>,

    /// Request timeout
    pub timeout: Duration,
}

impl QiitaClientConfig {
    /// Config for a host with the default 10 second timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_settings(settings: &QiitaSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            access_token: settings
                .access_token
                .clone()
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::from(token.into()));
        self
    }

    fn items_url(&self) -> String {
        format!("{}/api/v2/items", self.base_url.trim_end_matches('/'))
    }
}

/// HTTP client for the Qiita v2 item listing endpoint.
pub struct QiitaClient {
    client: Client,
    config: QiitaClientConfig,
}

impl QiitaClient {
    pub fn new(config: QiitaClientConfig) -> Result<Self, TrendsError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TrendsError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// List one page of items for a query.
    async fn list_items(
        &self,
        page: u32,
        per_page: u32,
        query: &str,
    ) -> Result<Vec<Article>, TrendsError> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let page = page.max(1);

        debug!(page, per_page, query, "Listing Qiita items");

        let mut request = self
            .client
            .get(self.config.items_url())
            .header("Content-Type", "application/json")
            .query(&[
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
                ("query", query.to_string()),
            ]);

        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TrendsError::Status { status, body });
        }

        let items: Vec<QiitaItem> = response
            .json()
            .await
            .map_err(|e| TrendsError::Decode(e.to_string()))?;

        Ok(items.into_iter().map(QiitaItem::into_article).collect())
    }
}

#[async_trait]
impl ArticleSource for QiitaClient {
    async fn fetch_popular(&self, page: u32, per_page: u32) -> Vec<Article> {
        match self.list_items(page, per_page, POPULAR_QUERY).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(error = %e, "Qiita API error, returning no articles");
                Vec::new()
            }
        }
    }

    async fn search_by_query(&self, query: &str, per_page: u32) -> Vec<Article> {
        match self.list_items(1, per_page, query).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(error = %e, query, "Qiita search error, returning no articles");
                Vec::new()
            }
        }
    }
}

/// Item as returned by `GET /api/v2/items`.
#[derive(Debug, Deserialize)]
struct QiitaItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    tags: Option<Vec<QiitaTag>>,
    #[serde(default)]
    likes_count: Option<u32>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    user: Option<QiitaUser>,
}

#[derive(Debug, Deserialize)]
struct QiitaTag {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QiitaUser {
    #[serde(default)]
    id: Option<String>,
}

impl QiitaItem {
    fn into_article(self) -> Article {
        let created_at = self
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        Article {
            title: self.title.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            tags: self
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|t| t.name.unwrap_or_default())
                .collect(),
            likes_count: self.likes_count.unwrap_or(0),
            created_at,
            author: self.user.and_then(|u| u.id).unwrap_or_default(),
        }
    }
}
