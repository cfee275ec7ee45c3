//! Article and tag frequency types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An article fetched from the content platform.
///
/// Articles are transient: they are fetched, aggregated and dropped
/// within a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Article title
    pub title: String,

    /// Canonical article URL
    pub url: String,

    /// Tag names in the order the platform lists them
    pub tags: Vec<String>,

    /// Number of likes
    pub likes_count: u32,

    /// Publication timestamp
    pub created_at: DateTime<Utc>,

    /// Author user id
    pub author: String,
}

impl Article {
    /// Create an article with no tags, likes or author.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            tags: Vec::new(),
            likes_count: 0,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            author: String::new(),
        }
    }

    /// Set the tag names.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the like count.
    pub fn with_likes(mut self, likes_count: u32) -> Self {
        self.likes_count = likes_count;
        self
    }

    /// Set the author id.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the publication timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// A tag name with its occurrence count across a batch of articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    /// Tag name (never empty)
    pub name: String,
    /// Number of articles carrying the tag (at least 1)
    pub count: u32,
}

impl TagCount {
    /// Create a new tag count.
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}
