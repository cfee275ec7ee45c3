//! Text-generation service client.
//!
//! [`TextGenerator`] is the seam between the pipeline and the hosted model.
//! [`ApiGenerator`] speaks the Anthropic Messages API or an OpenAI-compatible
//! chat-completions API; [`MockGenerator`] is a canned test double.

mod api;
mod mock;
mod sse;

pub use api::{ApiGenerator, ApiGeneratorConfig, Provider};
pub use mock::MockGenerator;
pub use sse::{decode_event_stream, SseDecoder};

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::reply::ReplyContent;
use crate::trace::TraceContext;

/// Error type for generation calls.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    #[error("{0} not configured")]
    NotConfigured(String),
}

/// A single generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub trace: Option<TraceContext>,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature: 1.0,
            max_tokens: 1024,
            trace: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_trace(mut self, trace: Option<TraceContext>) -> Self {
        self.trace = trace;
        self
    }
}

/// A complete (non-streamed) reply.
#[derive(Debug, Clone, Default)]
pub struct GenerationReply {
    /// Content blocks in reply order
    pub content: Vec<ReplyContent>,
}

impl GenerationReply {
    pub fn new(content: Vec<ReplyContent>) -> Self {
        Self { content }
    }

    /// Reply consisting of one plain text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![ReplyContent::Plain(text.into())])
    }

    /// Text of the first content block.
    pub fn first_text(&self) -> Result<String, GenerationError> {
        self.content
            .first()
            .map(ReplyContent::to_text)
            .ok_or_else(|| GenerationError::MalformedReply("reply has no content".to_string()))
    }
}

/// Incremental output of a streamed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    TextChunk(String),
    ToolStart { name: String },
}

/// Stream of generation events in arrival order.
pub type EventStream = BoxStream<'static, Result<StreamEvent, GenerationError>>;

/// Pluggable text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Single-shot generation.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationReply, GenerationError>;

    /// Streamed generation.
    async fn stream(&self, request: GenerationRequest) -> Result<EventStream, GenerationError>;
}
