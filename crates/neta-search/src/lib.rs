//! # neta-search
//!
//! Web and Qiita search adapters used to ground blog idea proposals.
//!
//! ## Core Components
//!
//! - [`GoogleSearch`]: Custom Search JSON API (primary, quota limited)
//! - [`TavilySearch`]: Tavily search API (secondary)
//! - [`WebSearch`]: primary-then-secondary failover returning result records
//! - [`qiita_search`]: Qiita keyword search as article summaries
//! - [`format_search_results_for_blog`] / [`format_qiita_results_for_blog`]:
//!   Markdown rendering for prompts
//!
//! Every adapter turns failures into an error record instead of an `Err`.

pub mod error;
pub mod format;
pub mod google;
pub mod qiita;
pub mod result;
pub mod tavily;
pub mod web;

pub use error::SearchError;
pub use format::{format_qiita_results_for_blog, format_search_results_for_blog};
pub use google::{GoogleSearch, GoogleSearchConfig, LANGUAGE_RESTRICT, RECENCY_FILTER};
pub use qiita::{qiita_search, QIITA_NOT_FOUND};
pub use result::{ArticleSummary, QiitaSearchResult, SearchHit, SearchResult};
pub use tavily::{TavilyAnswer, TavilySearch, TavilySearchConfig, TAVILY_TIME_RANGE};
pub use web::{SearchBackend, WebSearch, ANSWER_TITLE, WEB_MAX_RESULTS};
