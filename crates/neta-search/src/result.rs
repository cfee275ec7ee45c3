//! Search result records.
//!
//! A result list either carries hits or a single error record. Error
//! records serialize as `{"error": "..."}` with no title or link.

use serde::Serialize;

use neta_types::Article;

/// A web search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// Short site label (Google's `displayLink`, or the URL host)
    pub site_label: String,
}

impl SearchHit {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
        site_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
            site_label: site_label.into(),
        }
    }
}

/// One entry of a web search result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchResult {
    Hit(SearchHit),
    Error { error: String },
}

impl SearchResult {
    pub fn error(message: impl Into<String>) -> Self {
        SearchResult::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SearchResult::Error { .. })
    }

    pub fn as_hit(&self) -> Option<&SearchHit> {
        match self {
            SearchResult::Hit(hit) => Some(hit),
            SearchResult::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SearchResult::Error { error } => Some(error),
            SearchResult::Hit(_) => None,
        }
    }
}

impl From<SearchHit> for SearchResult {
    fn from(hit: SearchHit) -> Self {
        SearchResult::Hit(hit)
    }
}

/// Qiita article as surfaced to prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleSummary {
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub likes_count: u32,
    /// RFC 3339 timestamp
    pub created_at: String,
    /// Author user id
    pub user: String,
}

impl From<Article> for ArticleSummary {
    fn from(article: Article) -> Self {
        Self {
            title: article.title,
            url: article.url,
            tags: article.tags,
            likes_count: article.likes_count,
            created_at: article.created_at.to_rfc3339(),
            user: article.author,
        }
    }
}

/// One entry of a Qiita search result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QiitaSearchResult {
    Article(ArticleSummary),
    Error { error: String },
}

impl QiitaSearchResult {
    pub fn error(message: impl Into<String>) -> Self {
        QiitaSearchResult::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QiitaSearchResult::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            QiitaSearchResult::Error { error } => Some(error),
            QiitaSearchResult::Article(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_record_has_no_title_or_link() {
        let json = serde_json::to_value(SearchResult::error("boom")).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["error"], "boom");
        assert!(!obj.contains_key("title"));
        assert!(!obj.contains_key("link"));
    }

    #[test]
    fn test_hit_serialization() {
        let hit = SearchHit::new("Rust 1.80", "https://blog.rust-lang.org", "release", "blog.rust-lang.org");
        let json = serde_json::to_value(SearchResult::from(hit)).unwrap();
        assert_eq!(json["title"], "Rust 1.80");
        assert_eq!(json["site_label"], "blog.rust-lang.org");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_article_summary_from_article() {
        let article = Article::new("title", "https://qiita.com/x")
            .with_tags(["Rust"])
            .with_likes(5)
            .with_author("carol");
        let summary = ArticleSummary::from(article);
        assert_eq!(summary.user, "carol");
        assert_eq!(summary.created_at, "1970-01-01T00:00:00+00:00");
    }
}
