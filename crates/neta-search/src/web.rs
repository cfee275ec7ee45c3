//! Web search with primary/secondary failover.
//!
//! Google Custom Search is tried first. Quota exhaustion is expected in
//! normal operation (the free tier is small) and is logged at `info`; any
//! other failure is logged at `warn`. Either way the request moves on to
//! Tavily when it is configured.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use neta_types::SearchSettings;

use crate::error::SearchError;
use crate::google::{GoogleSearch, GoogleSearchConfig};
use crate::result::{SearchHit, SearchResult};
use crate::tavily::{TavilySearch, TavilySearchConfig};

/// Title of the pseudo-hit carrying Tavily's synthesized answer.
pub const ANSWER_TITLE: &str = "AIによる要約";

/// Most hits [`WebSearch::web_search`] returns, whichever backend answers.
pub const WEB_MAX_RESULTS: u32 = 10;

/// A web search backend.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Human-readable backend name for logs and error records.
    fn name(&self) -> &str;

    async fn search(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>, SearchError>;
}

/// Web search entry point used by the idea proposer.
#[derive(Clone, Default)]
pub struct WebSearch {
    primary: Option<Arc<dyn SearchBackend>>,
    secondary: Option<Arc<TavilySearch>>,
}

impl WebSearch {
    /// No backends configured.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primary(mut self, backend: impl SearchBackend + 'static) -> Self {
        self.primary = Some(Arc::new(backend));
        self
    }

    pub fn with_secondary(mut self, backend: TavilySearch) -> Self {
        self.secondary = Some(Arc::new(backend));
        self
    }

    /// Build from settings. Backends whose credentials are missing are left out.
    pub fn from_settings(settings: &SearchSettings) -> Self {
        let mut web = Self::new();

        if let Some(config) = GoogleSearchConfig::from_settings(settings) {
            match GoogleSearch::new(config) {
                Ok(google) => web = web.with_primary(google),
                Err(e) => warn!(error = %e, "Google search disabled"),
            }
        }

        if let Some(config) = TavilySearchConfig::from_settings(settings) {
            match TavilySearch::new(config) {
                Ok(tavily) => web = web.with_secondary(tavily),
                Err(e) => warn!(error = %e, "Tavily search disabled"),
            }
        }

        web
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary.is_some()
    }

    /// Search the web. Never fails: problems come back as a single error record.
    pub async fn web_search(&self, query: &str, num_results: u32) -> Vec<SearchResult> {
        let num_results = num_results.clamp(1, WEB_MAX_RESULTS);
        let mut primary_error = None;

        if let Some(primary) = &self.primary {
            match primary.search(query, num_results).await {
                Ok(hits) => return hits.into_iter().map(SearchResult::from).collect(),
                Err(e) if e.is_quota() => {
                    info!(backend = primary.name(), error = %e, "Search quota exhausted, failing over");
                    primary_error = Some(e);
                }
                Err(e) => {
                    warn!(backend = primary.name(), error = %e, "Search failed, failing over");
                    primary_error = Some(e);
                }
            }
        }

        match (&self.secondary, primary_error) {
            (Some(secondary), _) => match secondary.search(query, num_results).await {
                Ok(hits) => hits.into_iter().map(SearchResult::from).collect(),
                Err(e) => {
                    warn!(backend = secondary.name(), error = %e, "Search failed");
                    vec![SearchResult::error(format!("Search failed: {e}"))]
                }
            },
            (None, Some(e)) => vec![SearchResult::error(format!("Search failed: {e}"))],
            (None, None) => vec![SearchResult::error(
                "Search API credentials not configured. Please set GOOGLE_API_KEY and GOOGLE_CSE_ID, or TAVILY_API_KEY.",
            )],
        }
    }

    /// Search with Tavily only, prepending its answer summary when present.
    pub async fn tavily_search(
        &self,
        query: &str,
        num_results: u32,
        advanced: bool,
    ) -> Vec<SearchResult> {
        let Some(tavily) = &self.secondary else {
            return vec![SearchResult::error(
                "Tavily API key not configured. Please set TAVILY_API_KEY.",
            )];
        };

        match tavily.search_with(query, num_results, advanced, true).await {
            Ok(answer) => {
                let mut results = Vec::with_capacity(answer.hits.len() + 1);
                if let Some(summary) = answer.answer {
                    results.push(SearchResult::from(SearchHit::new(
                        ANSWER_TITLE,
                        "",
                        summary,
                        tavily.name(),
                    )));
                }
                results.extend(answer.hits.into_iter().map(SearchResult::from));
                results
            }
            Err(e) => {
                warn!(error = %e, "Tavily search failed");
                vec![SearchResult::error(format!("Search failed: {e}"))]
            }
        }
    }
}
