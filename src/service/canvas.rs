//! Canvas (document) lifecycle over the chat platform's Web API.
//!
//! Content goes out as a single rich-text block and comes back as an arbitrary
//! tree of blocks and elements, which is flattened back into plain text.

use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::base::types::Document;

use super::chat::ChatClient;

/// Web API method that creates a canvas.
pub const CANVAS_CREATE_METHOD: &str = "canvas.create";
/// Web API method that replaces the content of a canvas.
pub const CANVAS_UPDATE_METHOD: &str = "canvas.update";
/// Web API method that reads a canvas.
pub const CANVAS_GET_METHOD: &str = "canvas.get";

/// Nesting limit for block extraction.
pub const MAX_BLOCK_DEPTH: usize = 32;

/// Title used when the platform returns a canvas without one.
const UNTITLED: &str = "Untitled Canvas";

// Errors.

/// Any failed canvas operation, normalized to the operation name and a message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Failed to {operation} canvas: {message}")]
pub struct CanvasError {
    pub operation: &'static str,
    pub message: String,
}

impl CanvasError {
    fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

// Structs.

/// Canvas service backed by the chat client.
///
/// It is designed to be trivially cloneable.
#[derive(Clone)]
pub struct CanvasClient {
    chat: ChatClient,
}

impl CanvasClient {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    /// Create a canvas in `channel_id` holding `content`.
    #[instrument(skip(self, content))]
    pub async fn create(&self, channel_id: &str, title: &str, content: &str) -> Result<Document, CanvasError> {
        let payload = json!({
            "title": title,
            "content": build_content(content),
            "channel": channel_id,
        });

        let response = self.call("create", CANVAS_CREATE_METHOD, &payload).await?;
        let canvas = response.get("canvas").filter(|c| c.is_object()).ok_or_else(|| CanvasError::new("create", "Failed to create canvas"))?;

        let document = Document {
            id: string_field(canvas, "id").unwrap_or_default(),
            title: title.to_string(),
            url: string_field(canvas, "url").unwrap_or_default(),
            content: Some(content.to_string()),
        };

        info!("Created canvas {}", document.id);

        Ok(document)
    }

    /// Replace the content of the canvas `canvas_id`.
    #[instrument(skip(self, content))]
    pub async fn update(&self, canvas_id: &str, content: &str) -> Result<(), CanvasError> {
        let payload = json!({
            "canvas": canvas_id,
            "content": build_content(content),
        });

        self.call("update", CANVAS_UPDATE_METHOD, &payload).await?;

        info!("Updated canvas {}", canvas_id);

        Ok(())
    }

    /// Read the canvas `canvas_id`, flattening its blocks into plain text.
    #[instrument(skip(self))]
    pub async fn get(&self, canvas_id: &str) -> Result<Document, CanvasError> {
        let payload = json!({ "canvas": canvas_id });

        let response = self.call("get", CANVAS_GET_METHOD, &payload).await?;
        let canvas = response.get("canvas").filter(|c| c.is_object()).ok_or_else(|| CanvasError::new("get", "Failed to get canvas"))?;

        let content = canvas
            .get("content")
            .and_then(|c| c.get("blocks"))
            .and_then(Value::as_array)
            .map(|blocks| extract_text(blocks))
            .unwrap_or_default();

        Ok(Document {
            id: string_field(canvas, "id").unwrap_or_else(|| canvas_id.to_string()),
            title: string_field(canvas, "title").unwrap_or_else(|| UNTITLED.to_string()),
            url: string_field(canvas, "url").unwrap_or_default(),
            content: Some(content),
        })
    }

    /// Issue one Web API call, mapping transport failures and `ok: false` to a `CanvasError`.
    async fn call(&self, operation: &'static str, method: &str, payload: &Value) -> Result<Value, CanvasError> {
        let response = self.chat.call_api(method, payload).await.map_err(|e| {
            error!("Error calling {}: {}", method, e);
            CanvasError::new(operation, e.to_string())
        })?;

        if response.get("ok").and_then(Value::as_bool) != Some(true) {
            let reason = response.get("error").and_then(Value::as_str).unwrap_or("request was not ok");
            error!("{} returned an error: {}", method, reason);
            return Err(CanvasError::new(operation, reason));
        }

        Ok(response)
    }
}

/// Wrap plain text into a single rich-text block.
pub fn build_content(text: &str) -> Value {
    json!({
        "blocks": [
            {
                "type": "rich_text",
                "elements": [
                    {
                        "type": "rich_text_section",
                        "elements": [
                            { "type": "text", "text": text }
                        ]
                    }
                ]
            }
        ]
    })
}

/// Flatten a list of blocks into plain text, one line per top-level block.
///
/// Rich-text blocks contribute every nested `text` leaf, in order.  Other blocks
/// contribute their own `text`, either a string or an object carrying one.
pub fn extract_text(blocks: &[Value]) -> String {
    blocks
        .iter()
        .filter_map(|block| {
            if let Some(elements) = block.get("elements").and_then(Value::as_array)
                && block.get("type").and_then(Value::as_str) == Some("rich_text")
            {
                let mut text = String::new();
                collect_element_text(elements, 1, &mut text);
                Some(text)
            } else {
                match block.get("text") {
                    Some(Value::String(text)) => Some(text.clone()),
                    Some(Value::Object(object)) => object.get("text").and_then(Value::as_str).map(str::to_string),
                    _ => None,
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Depth-first walk over nested `elements`, appending every text leaf to `out`.
fn collect_element_text(elements: &[Value], depth: usize, out: &mut String) {
    if depth > MAX_BLOCK_DEPTH {
        warn!("Canvas content nests deeper than {} levels; skipping the remainder.", MAX_BLOCK_DEPTH);
        return;
    }

    for element in elements {
        if element.get("type").and_then(Value::as_str) == Some("text") {
            if let Some(text) = element.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        } else if let Some(children) = element.get("elements").and_then(Value::as_array) {
            collect_element_text(children, depth + 1, out);
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string)
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks_of(content: &Value) -> Vec<Value> {
        content["blocks"].as_array().unwrap().clone()
    }

    #[test]
    fn test_single_block_round_trip() {
        for text in ["Hello", "", "  padded  ", "line one\nline two", "emoji 📝 and <@U123>"] {
            assert_eq!(extract_text(&blocks_of(&build_content(text))), text);
        }
    }

    #[test]
    fn test_multiple_blocks_join_with_newlines_in_order() {
        let mut blocks = blocks_of(&build_content("first"));
        blocks.extend(blocks_of(&build_content("second")));
        blocks.push(json!({ "type": "section", "text": { "type": "mrkdwn", "text": "third" } }));
        blocks.push(json!({ "type": "header", "text": "fourth" }));

        assert_eq!(extract_text(&blocks), "first\nsecond\nthird\nfourth");
    }

    #[test]
    fn test_nested_elements_are_walked_depth_first() {
        let blocks = vec![json!({
            "type": "rich_text",
            "elements": [
                { "type": "rich_text_section", "elements": [
                    { "type": "text", "text": "a" },
                    { "type": "rich_text_list", "elements": [
                        { "type": "rich_text_section", "elements": [ { "type": "text", "text": "b" } ] },
                        { "type": "rich_text_section", "elements": [ { "type": "text", "text": "c" } ] }
                    ] },
                    { "type": "emoji", "name": "memo" },
                    { "type": "text", "text": "d" }
                ] }
            ]
        })];

        assert_eq!(extract_text(&blocks), "abcd");
    }

    #[test]
    fn test_blocks_without_text_are_skipped() {
        let blocks = vec![json!({ "type": "divider" }), json!({ "type": "header", "text": "only" })];

        assert_eq!(extract_text(&blocks), "only");
    }

    #[test]
    fn test_pathological_nesting_is_bounded() {
        let mut element = json!({ "type": "text", "text": "deep" });
        for _ in 0..(MAX_BLOCK_DEPTH * 4) {
            element = json!({ "type": "rich_text_section", "elements": [element] });
        }
        let blocks = vec![json!({
            "type": "rich_text",
            "elements": [ { "type": "text", "text": "shallow" }, element ]
        })];

        assert_eq!(extract_text(&blocks), "shallow");
    }

    #[test]
    fn test_canvas_error_message() {
        let err = CanvasError::new("update", "not_allowed");

        assert_eq!(err.to_string(), "Failed to update canvas: not_allowed");
    }
}
