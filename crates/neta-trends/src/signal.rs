//! Trend signal assembly.

use serde::Serialize;
use tracing::{info, warn};

use neta_types::{Article, TagCount};

use crate::aggregate::count_tags;
use crate::buckets::{categorize, CategorizedTags};
use crate::fetcher::{ArticleSource, MAX_PER_PAGE};

/// Number of top tags that get bucketed.
pub const TREND_TAG_POOL: usize = 30;

/// Number of tag names kept as the popular-tag list.
pub const POPULAR_TAG_LIMIT: usize = 20;

/// Number of raw tag counts kept for display.
pub const TOP_COUNT_LIMIT: usize = 10;

/// Aggregated tag data from recently popular articles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrendSignal {
    /// Most frequent tag names, most frequent first
    pub popular_tags: Vec<String>,

    /// Bucketed tag names
    pub categorized: CategorizedTags,

    /// Raw counts of the most frequent tags
    pub top_counts: Vec<TagCount>,
}

impl TrendSignal {
    /// Build a signal from a batch of articles.
    pub fn from_articles(articles: &[Article]) -> Self {
        let pool = count_tags(articles, TREND_TAG_POOL);
        let names: Vec<&str> = pool.iter().map(|t| t.name.as_str()).collect();

        Self {
            popular_tags: names
                .iter()
                .take(POPULAR_TAG_LIMIT)
                .map(|s| s.to_string())
                .collect(),
            categorized: categorize(&names),
            top_counts: pool.iter().take(TOP_COUNT_LIMIT).cloned().collect(),
        }
    }

    /// True when no tag data was collected.
    pub fn is_empty(&self) -> bool {
        self.popular_tags.is_empty() && self.categorized.is_empty()
    }
}

/// Fetch the first page of popular articles and aggregate their tags.
///
/// An unreachable source produces an empty signal.
pub async fn collect_trend_signal<S>(source: &S) -> TrendSignal
where
    S: ArticleSource + ?Sized,
{
    let articles = source.fetch_popular(1, MAX_PER_PAGE).await;
    if articles.is_empty() {
        warn!("No popular articles fetched, trend signal is empty");
        return TrendSignal::default();
    }

    let signal = TrendSignal::from_articles(&articles);
    info!(
        articles = articles.len(),
        tags = signal.popular_tags.len(),
        "Collected trend signal"
    );
    signal
}
