//! Tag frequency ranking.

use std::collections::HashMap;

use neta_types::{Article, TagCount};

/// Count tags across a batch of articles and return the `top_n` most
/// frequent.
///
/// Articles and their tags are walked in listing order. Ties keep
/// first-seen order because the sort is stable over insertion order.
/// Empty tag names are skipped.
pub fn count_tags(articles: &[Article], top_n: usize) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for article in articles {
        for tag in &article.tags {
            if tag.is_empty() {
                continue;
            }
            match index.get(tag.as_str()) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(tag.as_str(), counts.len());
                    counts.push(TagCount::new(tag.clone(), 1));
                }
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_n);
    counts
}
