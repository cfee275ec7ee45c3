//! # neta-trends
//!
//! Trend aggregation for blog-neta.
//!
//! Fetches popular Qiita articles, ranks their tags by frequency and sorts
//! tag names into six fixed topical buckets. The result, a [`TrendSignal`],
//! grounds category synthesis.
//!
//! ## Features
//! - [`QiitaClient`]: single-attempt article listing and keyword search
//! - [`count_tags`]: stable frequency ranking of tag names
//! - [`categorize`]: first-match keyword bucketing
//! - [`collect_trend_signal`]: the fetch -> count -> categorize pipeline

pub mod aggregate;
pub mod buckets;
pub mod error;
pub mod fetcher;
pub mod signal;

pub use aggregate::count_tags;
pub use buckets::{categorize, Bucket, CategorizedTags};
pub use error::TrendsError;
pub use fetcher::{
    ArticleSource, QiitaClient, QiitaClientConfig, MAX_PER_PAGE, POPULAR_QUERY,
    POPULAR_STOCK_THRESHOLD,
};
pub use signal::{collect_trend_signal, TrendSignal};
