//! Markdown rendering of search results for proposal prompts.

use std::fmt::Write;

use crate::qiita::QIITA_NOT_FOUND;
use crate::result::{QiitaSearchResult, SearchResult};

const WEB_NOT_FOUND: &str = "検索結果が見つかりませんでした。";
const NO_TITLE: &str = "タイトルなし";
const NO_DESCRIPTION: &str = "説明なし";
const UNKNOWN: &str = "不明";

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Render web search results as a "latest trends" section.
pub fn format_search_results_for_blog(results: &[SearchResult]) -> String {
    match results {
        [] => return WEB_NOT_FOUND.to_string(),
        [SearchResult::Error { error }] => return format!("エラー: {error}"),
        _ => {}
    }

    let mut out = String::from("## 最新の技術トレンド\n\n");
    for (i, hit) in results.iter().filter_map(SearchResult::as_hit).enumerate() {
        let _ = writeln!(out, "### {}. {}", i + 1, or_placeholder(&hit.title, NO_TITLE));
        let _ = writeln!(out, "- **URL**: {}", hit.link);
        let _ = writeln!(out, "- **概要**: {}", or_placeholder(&hit.snippet, NO_DESCRIPTION));
        let _ = writeln!(out, "- **サイト**: {}\n", hit.site_label);
    }
    out
}

/// Render Qiita search results as a "related articles" section.
pub fn format_qiita_results_for_blog(results: &[QiitaSearchResult]) -> String {
    match results {
        [] => return QIITA_NOT_FOUND.to_string(),
        [QiitaSearchResult::Error { error }] => return format!("エラー: {error}"),
        _ => {}
    }

    let mut out = String::from("## Qiitaの関連記事\n\n");
    let articles = results.iter().filter_map(|r| match r {
        QiitaSearchResult::Article(a) => Some(a),
        QiitaSearchResult::Error { .. } => None,
    });
    for (i, article) in articles.enumerate() {
        let _ = writeln!(out, "### {}. {}", i + 1, or_placeholder(&article.title, NO_TITLE));
        let _ = writeln!(out, "- **URL**: {}", article.url);
        let _ = writeln!(out, "- **タグ**: {}", article.tags.join(", "));
        let _ = writeln!(out, "- **いいね数**: {}", article.likes_count);
        let _ = writeln!(out, "- **投稿者**: {}\n", or_placeholder(&article.user, UNKNOWN));
    }
    out
}
