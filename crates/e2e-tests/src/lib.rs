//! End-to-end test infrastructure for blog-neta.
//!
//! Provides a shared TestHarness with mocked Qiita, search and generation
//! endpoints, plus fixtures for the trend-to-catalog pipeline.

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use neta_search::{TavilySearch, TavilySearchConfig, WebSearch};
use neta_synth::{ApiGenerator, ApiGeneratorConfig, TextGenerator};
use neta_trends::{ArticleSource, QiitaClient, QiitaClientConfig};

/// Category reply as the model would send it, wrapped in prose and a fence.
pub const CATEGORY_REPLY: &str = r#"Qiitaのトレンドを踏まえた分野です。
```json
{
  "Rust非同期処理": {"keywords": ["tokio", "async", "axum"], "emoji": "🦀"},
  "生成AIアプリ開発": {"keywords": ["LLM", "RAG", "LangChain"], "emoji": "🤖"},
  "コンテナ運用": {"keywords": ["Docker", "Kubernetes", "ECS"], "emoji": "🐳"}
}
```"#;

/// Shared test harness for E2E tests.
///
/// One mock server stands in for every upstream service; each is mounted
/// on its own path.
pub struct TestHarness {
    pub server: MockServer,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn qiita(&self) -> Arc<QiitaClient> {
        let client = QiitaClient::new(QiitaClientConfig::new(self.server.uri()))
            .expect("Failed to build Qiita client");
        Arc::new(client)
    }

    pub fn articles(&self) -> Arc<dyn ArticleSource> {
        self.qiita()
    }

    /// Anthropic-protocol generator pointed at `/v1/messages`.
    pub fn generator(&self) -> Arc<dyn TextGenerator> {
        let config = ApiGeneratorConfig::claude("sk-ant-test", "claude-3-haiku-20240307")
            .with_base_url(format!("{}/v1", self.server.uri()));
        Arc::new(ApiGenerator::new(config).expect("Failed to build generator"))
    }

    /// Web search with only the Tavily backend configured.
    pub fn tavily_web(&self) -> WebSearch {
        let tavily = TavilySearch::new(TavilySearchConfig::new(self.server.uri(), "tvly-test"))
            .expect("Failed to build Tavily client");
        WebSearch::new().with_secondary(tavily)
    }

    /// Serve the popular-article listing.
    pub async fn mount_popular(&self, items: Value) {
        Mock::given(method("GET"))
            .and(path("/api/v2/items"))
            .and(query_param("query", "stocks:>50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(items))
            .mount(&self.server)
            .await;
    }

    /// Serve keyword search results for any other query.
    pub async fn mount_search(&self, items: Value) {
        Mock::given(method("GET"))
            .and(path("/api/v2/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(items))
            .mount(&self.server)
            .await;
    }

    /// Answer every Messages call with one text block.
    pub async fn mount_reply(&self, text: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": text}]
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer streaming Messages calls with an SSE body of the given chunks.
    ///
    /// Takes precedence over [`mount_reply`](Self::mount_reply).
    pub async fn mount_stream(&self, chunks: &[&str]) {
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body(chunks)),
            )
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Serve Tavily results.
    pub async fn mount_tavily(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received on a path.
    pub async fn request_count(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}

/// A Qiita listing item.
pub fn qiita_item(title: &str, tags: &[&str], likes: u32, user: &str) -> Value {
    json!({
        "title": title,
        "url": format!("https://qiita.com/{user}/items/{}", title.len()),
        "tags": tags.iter().map(|t| json!({"name": t})).collect::<Vec<_>>(),
        "likes_count": likes,
        "created_at": "2024-06-01T09:00:00+09:00",
        "user": {"id": user}
    })
}

/// A listing with a realistic spread of tags.
pub fn popular_items() -> Value {
    json!([
        qiita_item("Rustで作るWebAPI", &["Rust", "axum", "Docker"], 420, "alice"),
        qiita_item("LLMアプリの評価", &["LLM", "Python", "ChatGPT"], 380, "bob"),
        qiita_item("ECSでコンテナ運用", &["AWS", "Docker", "Terraform"], 250, "carol"),
        qiita_item("React Server Components", &["React", "TypeScript"], 190, "dave"),
        qiita_item("Flutterで個人開発", &["Flutter", "Dart"], 120, "erin"),
        qiita_item("Rustの非同期入門", &["Rust", "tokio"], 95, "frank"),
    ])
}

/// Anthropic-style SSE body streaming the given text chunks.
pub fn sse_body(chunks: &[&str]) -> String {
    let mut body = String::from(
        "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_e2e\"}}\n\n",
    );
    for (i, chunk) in chunks.iter().enumerate() {
        let event = json!({
            "type": "content_block_delta",
            "index": 0,
            "delta": {"type": "text_delta", "text": chunk}
        });
        body.push_str(&format!("event: content_block_delta\ndata: {event}\n\n"));
        if i == 0 {
            body.push_str(
                "event: content_block_start\ndata: {\"type\":\"content_block_start\",\"index\":1,\"content_block\":{\"type\":\"tool_use\",\"id\":\"t1\",\"name\":\"qiita_search\",\"input\":{}}}\n\n",
            );
        }
    }
    body.push_str("event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n");
    body
}
