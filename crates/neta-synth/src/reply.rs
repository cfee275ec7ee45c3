//! Reply text extraction.
//!
//! Content blocks arrive in several shapes depending on the provider: an
//! object with a `text` field, a bare string, or something else entirely.
//! The variants are tried in that order.

use serde::Deserialize;
use serde_json::Value;

/// One content block of a generation reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplyContent {
    Keyed { text: String },
    Plain(String),
    Opaque(Value),
}

impl ReplyContent {
    /// Text of the block; opaque blocks are rendered as JSON.
    pub fn to_text(&self) -> String {
        match self {
            ReplyContent::Keyed { text } => text.clone(),
            ReplyContent::Plain(text) => text.clone(),
            ReplyContent::Opaque(value) => value.to_string(),
        }
    }
}

/// Substring from the first `{` to the last `}`, if any.
///
/// Handles replies that wrap the object in prose or a fenced code block.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyed_block() {
        let block: ReplyContent = serde_json::from_value(json!({"type": "text", "text": "hello"})).unwrap();
        assert_eq!(block, ReplyContent::Keyed { text: "hello".to_string() });
        assert_eq!(block.to_text(), "hello");
    }

    #[test]
    fn test_plain_block() {
        let block: ReplyContent = serde_json::from_value(json!("hello")).unwrap();
        assert_eq!(block, ReplyContent::Plain("hello".to_string()));
    }

    #[test]
    fn test_opaque_block() {
        let block: ReplyContent =
            serde_json::from_value(json!({"type": "tool_use", "name": "search"})).unwrap();
        assert!(matches!(block, ReplyContent::Opaque(_)));
        assert!(block.to_text().contains("tool_use"));
    }

    #[test]
    fn test_extract_json_object() {
        let text = "はい、こちらです。\n```json\n{\"a\": {\"b\": 1}}\n```\n以上";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }
}
