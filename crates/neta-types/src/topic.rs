//! Topic and topic catalog types.
//!
//! A [`TopicCatalog`] keeps insertion order so that two-column rendering
//! stays stable between redraws.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Glyph used for topics the user typed in.
pub const CUSTOM_TOPIC_EMOJI: &str = "🔍";

/// A named technology area offered for idea generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    /// Display name (unique within a catalog)
    pub name: String,
    /// Search keywords for the topic
    pub keywords: Vec<String>,
    /// Single display glyph
    pub emoji: String,
}

impl Topic {
    /// Create a new topic.
    pub fn new<I, S>(name: impl Into<String>, keywords: I, emoji: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            emoji: emoji.into(),
        }
    }

    /// Create a user-entered topic whose only keyword is its name.
    pub fn custom(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            keywords: vec![name.clone()],
            name,
            emoji: CUSTOM_TOPIC_EMOJI.to_string(),
        }
    }

    /// True when the topic has a name, at least one keyword and a glyph.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.keywords.is_empty()
            && !self.emoji.trim().is_empty()
    }

    /// Button-style label, e.g. `"🤖 AI/機械学習"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }
}

/// Payload stored under a topic name in the serialized catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicInfo {
    pub keywords: Vec<String>,
    pub emoji: String,
}

/// Insertion-ordered mapping from topic name to its keywords and glyph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from topics. Later duplicates replace earlier ones
    /// in place.
    pub fn from_topics(topics: impl IntoIterator<Item = Topic>) -> Self {
        let mut catalog = Self::new();
        for topic in topics {
            catalog.insert(topic);
        }
        catalog
    }

    /// Insert a topic, returning the replaced topic if the name existed.
    pub fn insert(&mut self, topic: Topic) -> Option<Topic> {
        match self.topics.iter_mut().find(|t| t.name == topic.name) {
            Some(existing) => Some(std::mem::replace(existing, topic)),
            None => {
                self.topics.push(topic);
                None
            }
        }
    }

    /// Return a catalog that also offers a user-entered topic.
    ///
    /// Existing names are left untouched.
    pub fn with_custom_topic(mut self, name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return self;
        }
        self.topics.push(Topic::custom(name));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Topic at a display position.
    pub fn nth(&self, index: usize) -> Option<&Topic> {
        self.topics.get(index)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.topics.iter().map(|t| t.name.as_str()).collect()
    }

    /// Split topics into display rows of `columns` entries each,
    /// filling left to right.
    pub fn rows(&self, columns: usize) -> Vec<Vec<&Topic>> {
        self.topics
            .chunks(columns.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }
}

impl<'a> IntoIterator for &'a TopicCatalog {
    type Item = &'a Topic;
    type IntoIter = std::slice::Iter<'a, Topic>;

    fn into_iter(self) -> Self::IntoIter {
        self.topics.iter()
    }
}

impl Serialize for TopicCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.topics.len()))?;
        for topic in &self.topics {
            map.serialize_entry(
                &topic.name,
                &TopicInfo {
                    keywords: topic.keywords.clone(),
                    emoji: topic.emoji.clone(),
                },
            )?;
        }
        map.end()
    }
}
