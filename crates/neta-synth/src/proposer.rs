//! Streamed blog idea proposals.
//!
//! Research runs first (Qiita keyword search, then web search), each step
//! announced through [`IdeaEvent::Status`]. The research is folded into the
//! prompt and the proposal text is streamed back chunk by chunk.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info};

use neta_search::{
    format_qiita_results_for_blog, format_search_results_for_blog, qiita_search, WebSearch,
};
use neta_trends::ArticleSource;

use crate::generator::{GenerationError, GenerationRequest, StreamEvent, TextGenerator};
use crate::trace::TraceContext;

/// Qiita articles pulled in as research.
pub const QIITA_RESEARCH_RESULTS: u32 = 5;

/// Web hits pulled in as research.
pub const WEB_RESEARCH_RESULTS: u32 = 3;

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 1500;

const SYSTEM_PROMPT: &str = "あなたはエンジニア向けのブログネタを提案する専門家です。

役割:
1. 選ばれた技術分野の最新トレンドを調べる
2. エンジニアが興味を持ちそうなトピックを見つける
3. 実践的で価値のあるブログネタを提案する

提案の際は次の点を意識してください:
- 技術的に正確で、最新の情報に基づいていること
- 初心者から上級者まで幅広い読者を想定すること
- 実装例やコードサンプルを盛り込める具体的なネタであること
- トレンドを踏まえつつ、長く読まれる内容であること

回答は必ず日本語で書いてください。";

/// Progress notification emitted while proposing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdeaEvent {
    /// Short status line for a spinner or log
    Status(String),
    /// A chunk of proposal text
    Text(String),
}

/// Status line for a tool the model reports starting.
pub fn tool_status_message(tool: &str) -> String {
    match tool {
        "google_search" | "web_search" => "🔍 Web検索中...".to_string(),
        "qiita_search" => "🔍 Qiitaで関連記事を検索中...".to_string(),
        "format_search_results_for_blog" => "📝 検索結果を分析中...".to_string(),
        "format_qiita_results_for_blog" => "📝 Qiitaの記事を分析中...".to_string(),
        other => format!("🔧 {other}を実行中..."),
    }
}

/// Produces blog idea proposals for a topic.
pub struct IdeaProposer {
    generator: Arc<dyn TextGenerator>,
    articles: Arc<dyn ArticleSource>,
    web: WebSearch,
}

impl IdeaProposer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        articles: Arc<dyn ArticleSource>,
        web: WebSearch,
    ) -> Self {
        Self {
            generator,
            articles,
            web,
        }
    }

    /// Research the topic and stream proposals, returning the full text.
    pub async fn propose<F>(
        &self,
        topic_name: &str,
        keywords: &[String],
        trace: Option<TraceContext>,
        mut on_event: F,
    ) -> Result<String, GenerationError>
    where
        F: FnMut(IdeaEvent) + Send,
    {
        let query = research_query(topic_name, keywords);
        info!(topic = topic_name, query = %query, "Proposing blog ideas");

        on_event(IdeaEvent::Status(tool_status_message("qiita_search")));
        let qiita = qiita_search(self.articles.as_ref(), &query, QIITA_RESEARCH_RESULTS).await;
        on_event(IdeaEvent::Status(tool_status_message(
            "format_qiita_results_for_blog",
        )));
        let qiita_md = format_qiita_results_for_blog(&qiita);

        on_event(IdeaEvent::Status(tool_status_message("google_search")));
        let web = self.web.web_search(&query, WEB_RESEARCH_RESULTS).await;
        on_event(IdeaEvent::Status(tool_status_message(
            "format_search_results_for_blog",
        )));
        let web_md = format_search_results_for_blog(&web);

        let prompt = build_prompt(topic_name, keywords, &qiita_md, &web_md);
        let request = GenerationRequest::new(SYSTEM_PROMPT, prompt)
            .with_temperature(TEMPERATURE)
            .with_max_tokens(MAX_TOKENS)
            .with_trace(trace);

        let mut stream = self.generator.stream(request).await?;
        let mut response = String::new();

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::TextChunk(chunk) => {
                    response.push_str(&chunk);
                    on_event(IdeaEvent::Text(chunk));
                }
                StreamEvent::ToolStart { name } => {
                    debug!(tool = %name, "Model started a tool");
                    on_event(IdeaEvent::Status(tool_status_message(&name)));
                }
            }
        }

        info!(chars = response.chars().count(), "Proposal complete");
        Ok(response)
    }
}

/// Search query for a topic: its keywords, or the name when there are none.
fn research_query(topic_name: &str, keywords: &[String]) -> String {
    let keywords: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .take(3)
        .collect();

    if keywords.is_empty() {
        topic_name.trim().to_string()
    } else {
        keywords.join(" ")
    }
}

/// Build the idea instruction with research folded in.
pub fn build_prompt(topic_name: &str, keywords: &[String], qiita_md: &str, web_md: &str) -> String {
    let keywords = keywords.join(", ");

    format!(
        r#"技術分野「{topic_name}」の最新トレンドを踏まえて、ブログネタを提案してください。

関連キーワード: {keywords}

事前に集めた調査結果:

{qiita_md}

{web_md}

進め方:
1. Qiitaの人気記事の傾向から、どんな切り口が注目されているかを読み取る
2. 検索結果から、エンジニアが興味を持ちそうなトピックを見つける
3. 具体的なブログネタを3つ提案する

各ネタは次の形式で簡潔に:
## タイトル案
- 概要: 2〜3文で説明
- 想定読者: 初心者/中級者/上級者
- キーポイント: 3つまで

補足:
- Qiitaの記事を優先して参考にすること（エンジニアコミュニティの関心を反映するため）
- 調査結果を分析したうえで、実践的で価値のあるネタを提案すること
- よく書かれているテーマでも、新しい切り口があれば提案してよい"#
    )
}
