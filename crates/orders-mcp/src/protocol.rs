//! MCP protocol types.
//!
//! This module defines the JSON-RPC message types used by MCP.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// A request without an id is a notification and gets no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// MCP tool definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Call tool request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Tool response content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        ToolContent::Text { text: text.into() }
    }

    /// The textual payload of this block.
    pub fn as_text(&self) -> &str {
        match self {
            ToolContent::Text { text } => text,
        }
    }
}

/// Result of a tool invocation: a list of content blocks plus an error flag.
///
/// Validation failures, not-found lookups and store errors are all reported
/// here as data; the surrounding JSON-RPC call still succeeds structurally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResponse {
    /// A successful response with one text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            is_error: false,
        }
    }

    /// A successful response whose single text block is pretty-printed JSON.
    pub fn json(value: &Value) -> Self {
        let text =
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::text(text)
    }

    /// A failed response with one descriptive text block.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(message)],
            is_error: true,
        }
    }

    /// Multiple content blocks, success.
    pub fn blocks(content: Vec<ToolContent>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_block_serializes_with_type_tag() {
        let block = ToolContent::text("hello");
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value, json!({"type": "text", "text": "hello"}));
    }

    #[test]
    fn notification_has_no_id() {
        let request: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(request.is_notification());
    }

    #[test]
    fn error_response_shape() {
        let response = JsonRpcResponse::error(Some(json!(1)), -32601, "Method not found");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], json!(-32601));
        assert!(value.get("result").is_none());
    }
}
