//! Qiita keyword search.

use neta_trends::ArticleSource;

use crate::result::{ArticleSummary, QiitaSearchResult};

/// Error text when the search found nothing (or the request failed).
pub const QIITA_NOT_FOUND: &str = "Qiitaの検索結果が見つかりませんでした。";

/// Search Qiita and return article summaries, or one error record when empty.
pub async fn qiita_search<S: ArticleSource + ?Sized>(
    source: &S,
    query: &str,
    num_results: u32,
) -> Vec<QiitaSearchResult> {
    let articles = source.search_by_query(query, num_results).await;

    if articles.is_empty() {
        return vec![QiitaSearchResult::error(QIITA_NOT_FOUND)];
    }

    articles
        .into_iter()
        .map(|a| QiitaSearchResult::Article(ArticleSummary::from(a)))
        .collect()
}
