//! LLM category synthesis with fallback.
//!
//! Turns a [`TrendSignal`] into a [`TopicCatalog`] by asking the generation
//! service for a JSON object of topics. Every failure on the way (no
//! generator, transport error, reply without JSON, bad entries) ends in the
//! built-in fallback catalog, so callers always get a non-empty catalog.

use std::sync::Arc;

use rand::Rng;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use neta_trends::{collect_trend_signal, ArticleSource, Bucket, TrendSignal};
use neta_types::{Topic, TopicCatalog};

use crate::error::SynthesisError;
use crate::fallback::fallback_catalog;
use crate::generator::{GenerationRequest, TextGenerator};
use crate::reply::extract_json_object;
use crate::trace::TraceContext;

/// Number of topics requested by default.
pub const DEFAULT_CATEGORY_COUNT: usize = 8;

/// Popular tags quoted in the prompt.
const PROMPT_POPULAR_TAGS: usize = 15;

/// Tags quoted per bucket.
const PROMPT_BUCKET_TAGS: usize = 5;

const TEMPERATURE: f64 = 0.9;
const MAX_TOKENS: u32 = 1000;

const SYSTEM_PROMPT: &str = "あなたはIT技術のトレンドに詳しい専門家です。";

/// Framings rotated into the prompt so repeated shuffles differ.
pub const LEAD_PHRASES: [&str; 5] = [
    "Qiitaで現在人気の技術",
    "Qiitaで話題になっている技術",
    "エンジニアが今注目している技術",
    "Qiitaのトレンドから見る最新技術",
    "今月Qiitaで盛り上がっている技術",
];

/// Generates topic catalogs from trend signals.
pub struct CategorySynthesizer {
    generator: Option<Arc<dyn TextGenerator>>,
    trace: Option<TraceContext>,
}

impl CategorySynthesizer {
    /// Create a synthesizer with an optional generator.
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            generator,
            trace: None,
        }
    }

    pub fn with_generator(generator: Arc<dyn TextGenerator>) -> Self {
        Self::new(Some(generator))
    }

    /// A synthesizer that always returns the fallback catalog.
    pub fn without_generator() -> Self {
        Self::new(None)
    }

    pub fn with_trace(mut self, trace: Option<TraceContext>) -> Self {
        self.trace = trace;
        self
    }

    pub fn set_trace(&mut self, trace: Option<TraceContext>) {
        self.trace = trace;
    }

    /// Produce a catalog for the signal. Never empty.
    pub async fn synthesize(&self, signal: &TrendSignal, desired_count: usize) -> TopicCatalog {
        if signal.is_empty() {
            info!("Trend signal is empty, using fallback categories");
            return fallback_catalog();
        }

        match self.try_synthesize(signal, desired_count).await {
            Ok(catalog) => {
                info!(topics = catalog.len(), "Synthesized categories");
                catalog
            }
            Err(e) => {
                warn!(error = %e, "Category synthesis failed, using fallback categories");
                fallback_catalog()
            }
        }
    }

    async fn try_synthesize(
        &self,
        signal: &TrendSignal,
        desired_count: usize,
    ) -> Result<TopicCatalog, SynthesisError> {
        let generator = self.generator.as_ref().ok_or(SynthesisError::NoGenerator)?;

        let lead = LEAD_PHRASES[rand::rng().random_range(0..LEAD_PHRASES.len())];
        let prompt = build_prompt(signal, desired_count, lead);
        debug!(lead, desired_count, "Requesting categories");

        let request = GenerationRequest::new(SYSTEM_PROMPT, prompt)
            .with_temperature(TEMPERATURE)
            .with_max_tokens(MAX_TOKENS)
            .with_trace(self.trace.clone());

        let reply = generator.generate(request).await?;
        let text = reply.first_text()?;
        parse_catalog(&text)
    }
}

/// Build the category instruction.
pub fn build_prompt(signal: &TrendSignal, desired_count: usize, lead: &str) -> String {
    let popular = signal
        .popular_tags
        .iter()
        .take(PROMPT_POPULAR_TAGS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let buckets = Bucket::ALL
        .iter()
        .map(|b| {
            format!(
                "- {}: {}",
                b.display_name(),
                signal.categorized.top(*b, PROMPT_BUCKET_TAGS).join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"{lead}を踏まえて、エンジニア向けブログのネタになりそうな技術分野を{desired_count}個挙げてください。

【Qiitaで現在人気のタグ】
{popular}

【カテゴリ別の人気タグ】
{buckets}

条件:
1. どの分野も具体的で、ブログ記事にしやすいこと
2. 初心者から上級者まで関心を持てること
3. Qiitaの人気タグを参考にしつつ、新しい切り口も含めること
4. 各分野にふさわしい絵文字を1つ付けること
5. 少なくとも半分は上記の人気タグに関連する分野にすること

次のJSON形式で出力してください:
{{
    "分野名1": {{
        "keywords": ["キーワード1", "キーワード2", "キーワード3"],
        "emoji": "🔧"
    }},
    "分野名2": {{
        "keywords": ["キーワード1", "キーワード2", "キーワード3"],
        "emoji": "🌟"
    }}
}}

注意:
- 分野名は日本語で15文字以内
- キーワードは3〜6個
- 絵文字は必ず1つ"#
    )
}

/// Parse reply text into a catalog.
///
/// Entries without keywords or without an emoji are dropped; everything
/// else is kept as written, in reply order.
pub fn parse_catalog(text: &str) -> Result<TopicCatalog, SynthesisError> {
    let json = extract_json_object(text).ok_or(SynthesisError::NoJsonObject)?;
    let object: Map<String, Value> =
        serde_json::from_str(json).map_err(|e| SynthesisError::Parse(e.to_string()))?;

    let mut catalog = TopicCatalog::new();
    for (name, entry) in object {
        match topic_from_entry(&name, &entry) {
            Some(topic) => {
                catalog.insert(topic);
            }
            None => warn!(topic = %name, "Dropping category without keywords or emoji"),
        }
    }

    if catalog.is_empty() {
        return Err(SynthesisError::EmptyCatalog);
    }
    Ok(catalog)
}

fn topic_from_entry(name: &str, entry: &Value) -> Option<Topic> {
    let keywords: Vec<&str> = entry
        .get("keywords")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let emoji = entry.get("emoji")?.as_str()?;

    let topic = Topic::new(name, keywords, emoji);
    topic.is_valid().then_some(topic)
}

/// Fetch trends, aggregate them and synthesize a catalog.
pub async fn generate_tech_categories<S>(
    source: &S,
    synthesizer: &CategorySynthesizer,
    desired_count: usize,
) -> TopicCatalog
where
    S: ArticleSource + ?Sized,
{
    let signal = collect_trend_signal(source).await;
    synthesizer.synthesize(&signal, desired_count).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MockGenerator;
    use neta_types::Article;

    const REPLY: &str = r#"以下が提案です。
```json
{
  "Rust非同期": {"keywords": ["tokio", "async", "axum"], "emoji": "🦀"},
  "生成AI活用": {"keywords": ["LLM", "RAG", "プロンプト"], "emoji": "🤖"},
  "壊れた分野": {"keywords": [], "emoji": "💥"},
  "絵文字なし": {"keywords": ["a", "b", "c"]}
}
```"#;

    fn signal() -> TrendSignal {
        TrendSignal::from_articles(&[
            Article::new("a", "u").with_tags(["Rust", "AWS", "React"]),
            Article::new("b", "u").with_tags(["Rust", "LLM"]),
        ])
    }

    #[test]
    fn test_parse_catalog_keeps_order_and_drops_invalid() {
        let catalog = parse_catalog(REPLY).unwrap();
        assert_eq!(catalog.names(), vec!["Rust非同期", "生成AI活用"]);
        assert_eq!(catalog.get("Rust非同期").unwrap().emoji, "🦀");
    }

    #[test]
    fn test_parse_catalog_errors() {
        assert!(matches!(parse_catalog("JSONはありません"), Err(SynthesisError::NoJsonObject)));
        assert!(matches!(parse_catalog("{not json}"), Err(SynthesisError::Parse(_))));
        assert!(matches!(
            parse_catalog(r#"{"x": {"keywords": [], "emoji": ""}}"#),
            Err(SynthesisError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_prompt_contents() {
        let prompt = build_prompt(&signal(), 8, LEAD_PHRASES[2]);
        assert!(prompt.starts_with("エンジニアが今注目している技術"));
        assert!(prompt.contains("8個"));
        assert!(prompt.contains("【Qiitaで現在人気のタグ】\nRust, AWS, React, LLM"));
        assert!(prompt.contains("- バックエンド: Rust"));
        assert!(prompt.contains("- AI/機械学習: LLM"));
        assert!(prompt.contains("- モバイル: \n"));
        assert!(prompt.contains("15文字以内"));
    }

    #[tokio::test]
    async fn test_synthesize_success() {
        let mock = Arc::new(MockGenerator::with_reply(REPLY));
        let synth = CategorySynthesizer::with_generator(mock.clone());

        let catalog = synth.synthesize(&signal(), 8).await;
        assert_eq!(catalog.len(), 2);

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, 0.9);
        assert_eq!(requests[0].max_tokens, 1000);
        assert_eq!(requests[0].system, SYSTEM_PROMPT);
        assert!(LEAD_PHRASES.iter().any(|p| requests[0].prompt.starts_with(p)));
    }

    #[tokio::test]
    async fn test_empty_signal_skips_generation() {
        let mock = Arc::new(MockGenerator::with_reply(REPLY));
        let synth = CategorySynthesizer::with_generator(mock.clone());

        let catalog = synth.synthesize(&TrendSignal::default(), 8).await;
        assert_eq!(catalog, fallback_catalog());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failures_fall_back() {
        for mock in [
            MockGenerator::failing("503"),
            MockGenerator::with_reply("no json"),
            MockGenerator::with_reply(r#"{"a": "b"}"#),
        ] {
            let synth = CategorySynthesizer::with_generator(Arc::new(mock));
            assert_eq!(synth.synthesize(&signal(), 8).await, fallback_catalog());
        }

        let synth = CategorySynthesizer::without_generator();
        assert_eq!(synth.synthesize(&signal(), 8).await, fallback_catalog());
    }

    #[tokio::test]
    async fn test_trace_is_attached() {
        let mock = Arc::new(MockGenerator::with_reply(REPLY));
        let synth = CategorySynthesizer::with_generator(mock.clone())
            .with_trace(Some(TraceContext::new("session-1")));

        synth.synthesize(&signal(), 8).await;
        let trace = mock.requests()[0].trace.clone().unwrap();
        assert_eq!(trace.session_id, "session-1");
    }
}
