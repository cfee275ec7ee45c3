//! Heuristic tag bucketing.
//!
//! Each tag lands in the first bucket whose keyword set has a
//! case-insensitive substring match. Check order is fixed:
//! frontend, backend, ai_ml, cloud, mobile, then other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One of the six fixed topical groupings.
///
/// Variant order is the check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Frontend,
    Backend,
    AiMl,
    Cloud,
    Mobile,
    Other,
}

impl Bucket {
    /// All buckets in check order.
    pub const ALL: [Bucket; 6] = [
        Bucket::Frontend,
        Bucket::Backend,
        Bucket::AiMl,
        Bucket::Cloud,
        Bucket::Mobile,
        Bucket::Other,
    ];

    /// Lower-case keywords matched as substrings. `Other` has none.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Bucket::Frontend => &[
                "react",
                "vue",
                "angular",
                "typescript",
                "javascript",
                "css",
                "html",
                "nextjs",
                "nuxt",
            ],
            Bucket::Backend => &[
                "python", "ruby", "go", "rust", "java", "node", "django", "rails", "fastapi",
            ],
            Bucket::AiMl => &[
                "ai", "ml", "機械学習", "深層学習", "llm", "chatgpt", "gpt", "claude",
            ],
            Bucket::Cloud => &[
                "aws",
                "gcp",
                "azure",
                "docker",
                "kubernetes",
                "terraform",
                "cloud",
            ],
            Bucket::Mobile => &["ios", "android", "flutter", "react native", "swift", "kotlin"],
            Bucket::Other => &[],
        }
    }

    /// Stable key, e.g. `"ai_ml"`.
    pub fn key(&self) -> &'static str {
        match self {
            Bucket::Frontend => "frontend",
            Bucket::Backend => "backend",
            Bucket::AiMl => "ai_ml",
            Bucket::Cloud => "cloud",
            Bucket::Mobile => "mobile",
            Bucket::Other => "other",
        }
    }

    /// Japanese heading used in prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Bucket::Frontend => "フロントエンド",
            Bucket::Backend => "バックエンド",
            Bucket::AiMl => "AI/機械学習",
            Bucket::Cloud => "クラウド/インフラ",
            Bucket::Mobile => "モバイル",
            Bucket::Other => "その他",
        }
    }

    /// Classify a single tag name.
    pub fn classify(tag: &str) -> Bucket {
        let lower = tag.to_lowercase();
        Bucket::ALL
            .into_iter()
            .find(|bucket| bucket.keywords().iter().any(|kw| lower.contains(kw)))
            .unwrap_or(Bucket::Other)
    }
}

/// Tag names grouped by bucket. Every bucket is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategorizedTags {
    buckets: BTreeMap<Bucket, Vec<String>>,
}

impl Default for CategorizedTags {
    fn default() -> Self {
        Self {
            buckets: Bucket::ALL.into_iter().map(|b| (b, Vec::new())).collect(),
        }
    }
}

impl CategorizedTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag name to a bucket.
    pub fn push(&mut self, bucket: Bucket, tag: impl Into<String>) {
        self.buckets.entry(bucket).or_default().push(tag.into());
    }

    pub fn get(&self, bucket: Bucket) -> &[String] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first `n` tags of a bucket.
    pub fn top(&self, bucket: Bucket, n: usize) -> &[String] {
        let tags = self.get(bucket);
        &tags[..tags.len().min(n)]
    }

    /// Buckets with their tags, in check order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[String])> {
        self.buckets.iter().map(|(b, tags)| (*b, tags.as_slice()))
    }

    /// Total number of tags across buckets.
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Sort tag names into buckets, skipping empty names.
pub fn categorize<I, S>(tag_names: I) -> CategorizedTags
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut categorized = CategorizedTags::new();
    for tag in tag_names {
        let tag = tag.as_ref();
        if tag.is_empty() {
            continue;
        }
        categorized.push(Bucket::classify(tag), tag);
    }
    categorized
}
