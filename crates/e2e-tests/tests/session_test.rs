//! End-to-end session tests.
//!
//! Verifies: shuffle -> select -> research -> streamed proposal, with every
//! upstream served over HTTP.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::json;

use e2e_tests::{popular_items, qiita_item, TestHarness, CATEGORY_REPLY};
use neta_search::WebSearch;
use neta_synth::{
    fallback_catalog, tool_status_message, BlogSession, CategorySynthesizer, IdeaEvent,
    IdeaProposer,
};
use neta_types::TracingConfig;

fn session(harness: &TestHarness, web: WebSearch) -> BlogSession {
    let generator = harness.generator();
    BlogSession::new(
        harness.articles(),
        CategorySynthesizer::with_generator(generator.clone()),
        IdeaProposer::new(generator, harness.articles(), web),
        TracingConfig::disabled(),
    )
}

fn collector() -> (Arc<Mutex<Vec<IdeaEvent>>>, impl FnMut(IdeaEvent) + Send) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    (events, move |event| sink.lock().unwrap().push(event))
}

#[tokio::test]
async fn test_full_session_flow() {
    let harness = TestHarness::new().await;
    harness.mount_popular(popular_items()).await;
    harness
        .mount_search(json!([qiita_item(
            "tokioで学ぶ非同期Rust",
            &["Rust", "tokio"],
            88,
            "grace"
        )]))
        .await;
    harness
        .mount_tavily(json!({
            "answer": "Rustの非同期エコシステムはtokioが中心です。",
            "results": [{
                "title": "Async Rust in 2024",
                "url": "https://blog.rust-lang.org/async",
                "content": "State of async Rust"
            }]
        }))
        .await;
    harness.mount_reply(CATEGORY_REPLY).await;
    harness
        .mount_stream(&["## 1. tokio入門", "\n- 想定読者: 初学者"])
        .await;

    let mut session = session(&harness, harness.tavily_web());
    session.shuffle().await;
    assert_eq!(session.catalog().len(), 3);

    let trace_before = session.trace_id().to_string();
    assert!(session.select("Rust非同期処理"));
    assert_ne!(session.trace_id(), trace_before);

    let (events, on_event) = collector();
    let response = session.propose(on_event).await.unwrap().map(str::to_string);

    assert_eq!(
        response.as_deref(),
        Some("## 1. tokio入門\n- 想定読者: 初学者")
    );
    assert_eq!(session.response(), response.as_deref());

    let events = events.lock().unwrap();
    let statuses: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            IdeaEvent::Status(s) => Some(s.as_str()),
            IdeaEvent::Text(_) => None,
        })
        .collect();
    assert!(statuses.contains(&tool_status_message("qiita_search").as_str()));
    assert!(statuses.contains(&tool_status_message("google_search").as_str()));

    // The research reached the model.
    let requests = harness.server.received_requests().await.unwrap();
    let stream_call = requests
        .iter()
        .filter(|r| r.url.path() == "/v1/messages")
        .map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).unwrap())
        .find(|body| body["stream"] == json!(true))
        .expect("streaming call");
    let prompt = stream_call["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("tokioで学ぶ非同期Rust"));
    assert!(prompt.contains("Async Rust in 2024"));
    assert!(prompt.contains("Rust非同期処理"));
}

#[tokio::test]
async fn test_custom_topic_session() {
    let harness = TestHarness::new().await;
    harness.mount_popular(json!([])).await;
    harness.mount_search(json!([])).await;
    harness.mount_stream(&["WebAssemblyのネタ"]).await;

    let mut session = session(&harness, WebSearch::new());
    session.shuffle().await;
    assert_eq!(session.catalog(), &fallback_catalog());

    assert!(session.select_custom("WebAssembly"));
    assert_eq!(session.selected(), Some("WebAssembly"));
    assert_eq!(session.catalog().len(), 5);

    let (_events, on_event) = collector();
    let response = session.propose(on_event).await.unwrap();
    assert_eq!(response, Some("WebAssemblyのネタ"));

    // Without search credentials the prompt still carries the notice.
    let requests = harness.server.received_requests().await.unwrap();
    let body: serde_json::Value = requests
        .iter()
        .filter(|r| r.url.path() == "/v1/messages")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .next_back()
        .unwrap();
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("TAVILY_API_KEY"));
}

#[tokio::test]
async fn test_shuffle_clears_selection() {
    let harness = TestHarness::new().await;
    harness.mount_popular(popular_items()).await;
    harness.mount_reply(CATEGORY_REPLY).await;

    let mut session = session(&harness, WebSearch::new());
    session.shuffle().await;
    assert!(session.select("コンテナ運用"));

    session.shuffle().await;
    assert_eq!(session.selected(), None);
    assert_eq!(session.response(), None);
    assert_eq!(harness.request_count("/v1/messages").await, 2);
}

#[tokio::test]
async fn test_propose_without_selection() {
    let harness = TestHarness::new().await;
    let mut session = session(&harness, WebSearch::new());

    let (events, on_event) = collector();
    assert_eq!(session.propose(on_event).await.unwrap(), None);
    assert!(events.lock().unwrap().is_empty());
    assert_eq!(harness.request_count("/v1/messages").await, 0);
}
