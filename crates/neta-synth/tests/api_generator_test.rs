//! HTTP-level tests for the API generator.

use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use neta_synth::{
    ApiGenerator, ApiGeneratorConfig, GenerationError, GenerationRequest, StreamEvent,
    TextGenerator, TraceContext,
};

fn claude(server: &MockServer) -> ApiGenerator {
    let config = ApiGeneratorConfig::claude("sk-ant-test", "claude-3-haiku-20240307")
        .with_base_url(format!("{}/v1", server.uri()));
    ApiGenerator::new(config).unwrap()
}

fn openai(server: &MockServer) -> ApiGenerator {
    let config =
        ApiGeneratorConfig::openai("sk-test", "gpt-4o-mini").with_base_url(format!("{}/v1", server.uri()));
    ApiGenerator::new(config).unwrap()
}

fn request() -> GenerationRequest {
    GenerationRequest::new("あなたはIT技術のトレンドに詳しい専門家です。", "カテゴリを生成して")
        .with_temperature(0.9)
        .with_max_tokens(1000)
        .with_trace(Some(TraceContext::new("session-1").with_trace_id("trace-1")))
}

#[tokio::test]
async fn test_anthropic_generate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-haiku-20240307",
            "max_tokens": 1000,
            "temperature": 0.9,
            "system": "あなたはIT技術のトレンドに詳しい専門家です。",
            "messages": [{"role": "user", "content": "カテゴリを生成して"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "content": [{"type": "text", "text": "{\"Rust\": {\"keywords\": [\"tokio\"], \"emoji\": \"🦀\"}}"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = claude(&server).generate(request()).await.unwrap();
    assert!(reply.first_text().unwrap().contains("🦀"));
}

#[tokio::test]
async fn test_anthropic_empty_content_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
        .mount(&server)
        .await;

    let reply = claude(&server).generate(request()).await.unwrap();
    assert!(matches!(
        reply.first_text(),
        Err(GenerationError::MalformedReply(_))
    ));
}

#[tokio::test]
async fn test_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let err = claude(&server).generate(request()).await.unwrap_err();
    assert!(matches!(err, GenerationError::RateLimited));
}

#[tokio::test]
async fn test_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = claude(&server).generate(request()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Api(ref m) if m.contains("overloaded")));
}

#[tokio::test]
async fn test_openai_generate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": "あなたはIT技術のトレンドに詳しい専門家です。"},
                {"role": "user", "content": "カテゴリを生成して"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "こんにちは"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = openai(&server).generate(request()).await.unwrap();
    assert_eq!(reply.first_text().unwrap(), "こんにちは");
}

#[tokio::test]
async fn test_anthropic_stream() {
    let body = concat!(
        "event: message_start\n",
        "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"## タイトル案\"}}\n\n",
        "event: content_block_start\n",
        "data: {\"type\":\"content_block_start\",\"index\":1,\"content_block\":{\"type\":\"tool_use\",\"id\":\"t\",\"name\":\"qiita_search\",\"input\":{}}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":2,\"delta\":{\"type\":\"text_delta\",\"text\":\"\\n- 概要: 入門\"}}\n\n",
        "event: message_stop\n",
        "data: {\"type\":\"message_stop\"}\n\n",
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let events: Vec<StreamEvent> = claude(&server)
        .stream(request())
        .await
        .unwrap()
        .map(|e| e.unwrap())
        .collect()
        .await;

    assert_eq!(
        events,
        vec![
            StreamEvent::TextChunk("## タイトル案".to_string()),
            StreamEvent::ToolStart {
                name: "qiita_search".to_string()
            },
            StreamEvent::TextChunk("\n- 概要: 入門".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_stream_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = claude(&server).stream(request()).await;
    assert!(matches!(result, Err(GenerationError::RateLimited)));
}
