//! Incremental server-sent-events decoding for streamed generations.

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use tracing::debug;

use super::{EventStream, GenerationError, StreamEvent};

/// Line-oriented SSE decoder.
///
/// Bytes are buffered until a full line is available, so UTF-8 sequences
/// and JSON payloads split across network chunks decode the same as
/// unsplit input. Understands Anthropic message events and OpenAI
/// chat-completion chunks.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `[DONE]` or `message_stop` has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed a chunk, returning every event completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<StreamEvent, GenerationError>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.decode_line(&line, &mut events);
        }
        events
    }

    /// Flush a trailing line that had no newline.
    pub fn finish(&mut self) -> Vec<Result<StreamEvent, GenerationError>> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.decode_line(&line, &mut events);
        }
        events
    }

    fn decode_line(&mut self, line: &[u8], events: &mut Vec<Result<StreamEvent, GenerationError>>) {
        if self.done {
            return;
        }

        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(data) = line.strip_prefix("data:") else {
            // event:, id:, retry: and comments carry nothing we need
            return;
        };
        let data = data.trim();

        if data.is_empty() {
            return;
        }
        if data == "[DONE]" {
            self.done = true;
            return;
        }

        match serde_json::from_str::<Value>(data) {
            Ok(payload) => {
                if let Some(event) = self.interpret(&payload) {
                    events.push(event);
                }
            }
            Err(e) => events.push(Err(GenerationError::Parse(format!(
                "invalid stream payload: {e}"
            )))),
        }
    }

    fn interpret(&mut self, payload: &Value) -> Option<Result<StreamEvent, GenerationError>> {
        match payload.get("type").and_then(Value::as_str) {
            Some("content_block_delta") => {
                let delta = payload.get("delta")?;
                if delta.get("type").and_then(Value::as_str) != Some("text_delta") {
                    return None;
                }
                let text = delta.get("text").and_then(Value::as_str)?;
                Some(Ok(StreamEvent::TextChunk(text.to_string())))
            }
            Some("content_block_start") => {
                let block = payload.get("content_block")?;
                if block.get("type").and_then(Value::as_str) != Some("tool_use") {
                    return None;
                }
                let name = block.get("name").and_then(Value::as_str)?;
                Some(Ok(StreamEvent::ToolStart {
                    name: name.to_string(),
                }))
            }
            Some("message_stop") => {
                self.done = true;
                None
            }
            Some("error") => {
                let message = payload
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .unwrap_or("stream error");
                Some(Err(GenerationError::Api(message.to_string())))
            }
            Some(other) => {
                debug!(event_type = other, "Ignoring stream event");
                None
            }
            None => Self::interpret_openai(payload),
        }
    }

    fn interpret_openai(payload: &Value) -> Option<Result<StreamEvent, GenerationError>> {
        let delta = payload.pointer("/choices/0/delta")?;

        if let Some(name) = delta
            .pointer("/tool_calls/0/function/name")
            .and_then(Value::as_str)
        {
            return Some(Ok(StreamEvent::ToolStart {
                name: name.to_string(),
            }));
        }

        match delta.get("content").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => Some(Ok(StreamEvent::TextChunk(text.to_string()))),
            _ => None,
        }
    }
}

struct DecodeState<S> {
    body: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<StreamEvent, GenerationError>>,
    finished: bool,
}

/// Turn a byte stream into an [`EventStream`].
///
/// A transport error is yielded once and ends the stream.
pub fn decode_event_stream<S, B, E>(body: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = DecodeState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.pending.pop_front() {
                return Some((event, st));
            }
            if st.finished {
                return None;
            }
            match st.body.next().await {
                Some(Ok(chunk)) => {
                    st.pending.extend(st.decoder.feed(chunk.as_ref()));
                    if st.decoder.is_done() {
                        st.finished = true;
                    }
                }
                Some(Err(e)) => {
                    st.finished = true;
                    st.pending
                        .push_back(Err(GenerationError::Api(format!("stream interrupted: {e}"))));
                }
                None => {
                    st.finished = true;
                    st.pending.extend(st.decoder.finish());
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANTHROPIC: &str = concat!(
        "event: message_start\n",
        "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n",
        "event: content_block_start\n",
        "data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"## タイトル案\"}}\n\n",
        "event: content_block_start\n",
        "data: {\"type\":\"content_block_start\",\"index\":1,\"content_block\":{\"type\":\"tool_use\",\"id\":\"t1\",\"name\":\"qiita_search\",\"input\":{}}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{}\"}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":2,\"delta\":{\"type\":\"text_delta\",\"text\":\"\\n- 概要\"}}\n\n",
        "event: message_stop\n",
        "data: {\"type\":\"message_stop\"}\n\n",
    );

    fn expected() -> Vec<StreamEvent> {
        vec![
            StreamEvent::TextChunk("## タイトル案".to_string()),
            StreamEvent::ToolStart {
                name: "qiita_search".to_string(),
            },
            StreamEvent::TextChunk("\n- 概要".to_string()),
        ]
    }

    fn decode_all(chunks: &[&[u8]]) -> Vec<StreamEvent> {
        let mut decoder = SseDecoder::new();
        let mut events: Vec<StreamEvent> = chunks
            .iter()
            .flat_map(|c| decoder.feed(c))
            .map(|e| e.unwrap())
            .collect();
        events.extend(decoder.finish().into_iter().map(|e| e.unwrap()));
        events
    }

    #[test]
    fn test_anthropic_events() {
        assert_eq!(decode_all(&[ANTHROPIC.as_bytes()]), expected());
    }

    #[test]
    fn test_chunk_boundaries_do_not_matter() {
        let bytes = ANTHROPIC.as_bytes();
        for size in [1, 2, 3, 7, 64] {
            let chunks: Vec<&[u8]> = bytes.chunks(size).collect();
            assert_eq!(decode_all(&chunks), expected(), "chunk size {size}");
        }
    }

    #[test]
    fn test_openai_chunks_and_done() {
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Rust\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"function\":{\"name\":\"google_search\"}}]}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"の非同期\"}}]}\n\n",
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
        );
        assert_eq!(
            decode_all(&[body.as_bytes()]),
            vec![
                StreamEvent::TextChunk("Rust".to_string()),
                StreamEvent::ToolStart {
                    name: "google_search".to_string()
                },
                StreamEvent::TextChunk("の非同期".to_string()),
            ]
        );
    }

    #[test]
    fn test_trailing_line_without_newline() {
        let mut decoder = SseDecoder::new();
        assert!(decoder
            .feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}")
            .is_empty());
        let events = decoder.finish();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].as_ref().unwrap(),
            &StreamEvent::TextChunk("tail".to_string())
        );
    }

    #[test]
    fn test_error_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(
            b"data: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n",
        );
        assert!(matches!(&events[0], Err(GenerationError::Api(m)) if m == "Overloaded"));
    }

    #[tokio::test]
    async fn test_decode_event_stream() {
        let bytes = ANTHROPIC.as_bytes().to_vec();
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
            bytes.chunks(5).map(|c| Ok(c.to_vec())).collect();

        let events: Vec<StreamEvent> = decode_event_stream(stream::iter(chunks))
            .map(|e| e.unwrap())
            .collect()
            .await;
        assert_eq!(events, expected());
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n".to_vec()),
            Err(std::io::Error::other("reset")),
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n".to_vec()),
        ];

        let events: Vec<_> = decode_event_stream(stream::iter(chunks)).collect().await;
        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        assert!(matches!(events[1], Err(GenerationError::Api(_))));
    }
}
