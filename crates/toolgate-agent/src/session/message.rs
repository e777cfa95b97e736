//! Chat message types (OpenAI-compatible).

use serde::{Deserialize, Serialize};

/// One message in OpenAI-compatible chat format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "user", "assistant", "tool".
    pub role: String,
    /// Text content (none when tool_calls present).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Assistant tool calls (when role is assistant).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallOut>>,
    /// Tool call id for tool result messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool name for tool result messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    /// User message with text content.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(text.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Assistant message carrying tool-call requests (and possibly text).
    #[must_use]
    pub fn assistant_with_calls(content: Option<String>, tool_calls: Vec<ToolCallOut>) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
            name: None,
        }
    }

    /// Tool-result message referencing the originating call id.
    #[must_use]
    pub fn tool_result(
        call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
            name: Some(name.into()),
        }
    }
}

/// Tool call from assistant message (OpenAI format).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallOut {
    /// Unique id for this tool call, issued by the chat endpoint.
    pub id: String,
    /// Type (e.g. "function").
    #[serde(rename = "type")]
    pub typ: String,
    /// Function name and arguments.
    pub function: FunctionCall,
}

/// Function call payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool/function name.
    pub name: String,
    /// JSON string of arguments.
    pub arguments: String,
}
