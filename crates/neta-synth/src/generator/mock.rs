//! Mock generator for testing.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use super::{
    EventStream, GenerationError, GenerationReply, GenerationRequest, StreamEvent, TextGenerator,
};

enum Canned {
    Reply(GenerationReply),
    Events(Vec<StreamEvent>),
    Failure(String),
}

/// Generator that returns canned output and records every request.
///
/// Canned outputs are consumed in order; the last one is reused once the
/// queue is down to a single entry. With nothing queued every call fails.
#[derive(Default)]
pub struct MockGenerator {
    canned: Mutex<VecDeque<Canned>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with a single plain text block.
    pub fn with_reply(text: impl Into<String>) -> Self {
        Self::new().then_reply(GenerationReply::text(text))
    }

    /// Stream the given text chunks.
    pub fn with_chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().then_events(chunks.into_iter().map(|c| StreamEvent::TextChunk(c.into())))
    }

    /// Fail every call with an API error.
    pub fn failing(message: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.push(Canned::Failure(message.into()));
        mock
    }

    pub fn then_reply(self, reply: GenerationReply) -> Self {
        self.push(Canned::Reply(reply));
        self
    }

    pub fn then_events(self, events: impl IntoIterator<Item = StreamEvent>) -> Self {
        self.push(Canned::Events(events.into_iter().collect()));
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn push(&self, canned: Canned) {
        if let Ok(mut queue) = self.canned.lock() {
            queue.push_back(canned);
        }
    }

    fn next(&self, request: GenerationRequest) -> Result<Canned, GenerationError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let mut queue = self
            .canned
            .lock()
            .map_err(|_| GenerationError::Api("mock poisoned".to_string()))?;

        let canned = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().map(Canned::duplicate)
        };
        canned.ok_or_else(|| GenerationError::Api("no canned output".to_string()))
    }
}

impl Canned {
    fn duplicate(&self) -> Self {
        match self {
            Canned::Reply(r) => Canned::Reply(r.clone()),
            Canned::Events(e) => Canned::Events(e.clone()),
            Canned::Failure(m) => Canned::Failure(m.clone()),
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationReply, GenerationError> {
        match self.next(request)? {
            Canned::Reply(reply) => Ok(reply),
            Canned::Events(events) => {
                let text: String = events
                    .into_iter()
                    .filter_map(|e| match e {
                        StreamEvent::TextChunk(t) => Some(t),
                        StreamEvent::ToolStart { .. } => None,
                    })
                    .collect();
                Ok(GenerationReply::text(text))
            }
            Canned::Failure(message) => Err(GenerationError::Api(message)),
        }
    }

    async fn stream(&self, request: GenerationRequest) -> Result<EventStream, GenerationError> {
        let events = match self.next(request)? {
            Canned::Events(events) => events,
            Canned::Reply(reply) => vec![StreamEvent::TextChunk(reply.first_text()?)],
            Canned::Failure(message) => return Err(GenerationError::Api(message)),
        };
        Ok(stream::iter(events.into_iter().map(Ok)).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reply_is_reused() {
        let mock = MockGenerator::with_reply("hello");
        for _ in 0..2 {
            let reply = mock.generate(GenerationRequest::new("s", "p")).await.unwrap();
            assert_eq!(reply.first_text().unwrap(), "hello");
        }
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_queue_order() {
        let mock = MockGenerator::with_reply("first").then_reply(GenerationReply::text("second"));
        let a = mock.generate(GenerationRequest::new("s", "p")).await.unwrap();
        let b = mock.generate(GenerationRequest::new("s", "p")).await.unwrap();
        assert_eq!(a.first_text().unwrap(), "first");
        assert_eq!(b.first_text().unwrap(), "second");
    }

    #[tokio::test]
    async fn test_stream_chunks() {
        let mock = MockGenerator::with_chunks(["a", "b"]);
        let events: Vec<_> = mock
            .stream(GenerationRequest::new("s", "p"))
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(events.len(), 2);
        assert_eq!(mock.requests()[0].prompt, "p");
    }

    #[tokio::test]
    async fn test_failing() {
        let mock = MockGenerator::failing("boom");
        assert!(mock.generate(GenerationRequest::new("s", "p")).await.is_err());
        assert!(mock.stream(GenerationRequest::new("s", "p")).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_mock_fails() {
        let mock = MockGenerator::new();
        assert!(mock.generate(GenerationRequest::new("s", "p")).await.is_err());
    }
}
