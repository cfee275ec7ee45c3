//! API-based generator for Anthropic or OpenAI-compatible endpoints.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, field, info_span, Instrument, Span};

use neta_types::{is_openai_provider, GenerationSettings};

use super::sse::decode_event_stream;
use super::{EventStream, GenerationError, GenerationReply, GenerationRequest, TextGenerator};
use crate::reply::ReplyContent;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Wire protocol spoken by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAi,
}

impl Provider {
    /// Parse a provider name from settings.
    pub fn parse(name: &str) -> Result<Self, GenerationError> {
        if is_openai_provider(name) {
            return Ok(Provider::OpenAi);
        }
        match name.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            other => Err(GenerationError::Config(format!("unknown provider: {other}"))),
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com/v1",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }
}

/// Configuration for [`ApiGenerator`].
#[derive(Debug, Clone)]
pub struct ApiGeneratorConfig {
    pub provider: Provider,

    /// API base URL (e.g., "https://api.anthropic.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "claude-3-haiku-20240307")
    pub model: String,

    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,
}

impl ApiGeneratorConfig {
    /// Create config for the Anthropic Messages API.
    pub fn claude(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::for_provider(Provider::Anthropic, api_key, model)
    }

    /// Create config for the OpenAI chat-completions API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::for_provider(Provider::OpenAi, api_key, model)
    }

    fn for_provider(provider: Provider, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider,
            base_url: provider.default_base_url().to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build from settings for the given model.
    pub fn from_settings(settings: &GenerationSettings, model: &str) -> Result<Self, GenerationError> {
        let provider = Provider::parse(&settings.provider)?;
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GenerationError::NotConfigured("generation API key".to_string()))?;

        let mut config = Self::for_provider(provider, api_key, model);
        if let Some(base_url) = settings.base_url.as_deref().filter(|u| !u.is_empty()) {
            config.base_url = base_url.to_string();
        }
        config.timeout = Duration::from_secs(settings.timeout_secs);
        Ok(config)
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ReplyContent>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    content: Option<ReplyContent>,
}

/// API-based text generator. One attempt per call; no retries.
pub struct ApiGenerator {
    client: Client,
    config: ApiGeneratorConfig,
}

impl ApiGenerator {
    /// Create a new API generator.
    pub fn new(config: ApiGeneratorConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn span(&self, request: &GenerationRequest, streaming: bool) -> Span {
        let span = info_span!(
            "generation",
            model = %self.config.model,
            streaming,
            trace.id = field::Empty,
            session.id = field::Empty,
            user.id = field::Empty,
            langfuse.tags = field::Empty,
            app.name = field::Empty,
            app.version = field::Empty,
        );
        if let Some(trace) = &request.trace {
            trace.record(&span);
        }
        span
    }

    fn build(&self, request: &GenerationRequest, stream: bool) -> RequestBuilder {
        let base = self.config.base_url.trim_end_matches('/');
        let key = self.config.api_key.expose_secret();

        match self.config.provider {
            Provider::Anthropic => {
                let body = AnthropicRequest {
                    model: &self.config.model,
                    max_tokens: request.max_tokens,
                    temperature: request.temperature,
                    system: &request.system,
                    messages: [ChatMessage {
                        role: "user",
                        content: &request.prompt,
                    }],
                    stream,
                };
                self.client
                    .post(format!("{base}/messages"))
                    .header("x-api-key", key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .json(&body)
            }
            Provider::OpenAi => {
                let body = OpenAIRequest {
                    model: &self.config.model,
                    max_tokens: request.max_tokens,
                    temperature: request.temperature,
                    messages: [
                        ChatMessage {
                            role: "system",
                            content: &request.system,
                        },
                        ChatMessage {
                            role: "user",
                            content: &request.prompt,
                        },
                    ],
                    stream,
                };
                self.client
                    .post(format!("{base}/chat/completions"))
                    .bearer_auth(key)
                    .json(&body)
            }
        }
    }

    async fn send(&self, request: &GenerationRequest, stream: bool) -> Result<Response, GenerationError> {
        debug!(provider = ?self.config.provider, stream, "Calling generation API");

        let response = self
            .build(request, stream)
            .send()
            .await
            .map_err(|e| GenerationError::Api(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!("HTTP {}: {}", status, body)));
        }

        Ok(response)
    }
}

#[async_trait]
impl TextGenerator for ApiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationReply, GenerationError> {
        let span = self.span(&request, false);

        async {
            let response = self.send(&request, false).await?;

            let content = match self.config.provider {
                Provider::Anthropic => {
                    let body: AnthropicResponse = response
                        .json()
                        .await
                        .map_err(|e| GenerationError::Parse(e.to_string()))?;
                    body.content
                }
                Provider::OpenAi => {
                    let body: OpenAIResponse = response
                        .json()
                        .await
                        .map_err(|e| GenerationError::Parse(e.to_string()))?;
                    body.choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.message.content)
                        .into_iter()
                        .collect()
                }
            };

            Ok::<_, GenerationError>(GenerationReply::new(content))
        }
        .instrument(span)
        .await
    }

    async fn stream(&self, request: GenerationRequest) -> Result<EventStream, GenerationError> {
        let span = self.span(&request, true);
        let response = self.send(&request, true).instrument(span).await?;
        Ok(decode_event_stream(response.bytes_stream().boxed()))
    }
}
