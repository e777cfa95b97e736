//! Chat transport: OpenAI-compatible chat completions (tool_calls supported).

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::{ChatMessage, ToolCallOut};

/// One exchange with the chat endpoint.
///
/// `tools_json` entries carry `name`, optional `description`, and a
/// parameter schema under `parameters` (or `input_schema`).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the full history plus tool catalog; returns the trailing
    /// assistant message (text and/or tool-call requests).
    async fn send(
        &self,
        messages: Vec<ChatMessage>,
        tools_json: Option<Vec<serde_json::Value>>,
    ) -> Result<AssistantMessage>;
}

/// Request body for chat completions (OpenAI format).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    /// Pinned to 0 so approval runs stay reproducible.
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Serialize)]
struct ToolDef {
    #[serde(rename = "type")]
    typ: String,
    function: FunctionDef,
}

#[derive(Debug, Serialize)]
struct FunctionDef {
    name: String,
    description: Option<String>,
    parameters: Option<serde_json::Value>,
}

/// Response: choices[0].message.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

/// Trailing assistant message of one exchange.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantMessage {
    /// Text content; may be absent alongside tool calls, or empty.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool-call requests extracted by the endpoint.
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallOut>>,
}

fn build_tool_defs(tools_json: Vec<serde_json::Value>) -> Vec<ToolDef> {
    tools_json
        .into_iter()
        .filter_map(|v| {
            let name = v.get("name")?.as_str()?.to_string();
            let description = v
                .get("description")
                .and_then(|d| d.as_str())
                .map(String::from);
            let parameters = v
                .get("input_schema")
                .cloned()
                .or_else(|| v.get("parameters").cloned());
            Some(ToolDef {
                typ: "function".to_string(),
                function: FunctionDef {
                    name,
                    description,
                    parameters,
                },
            })
        })
        .collect()
}

/// HTTP client for chat completions.
pub struct LlmClient {
    client: reqwest::Client,
    inference_url: String,
    model: String,
    api_key: Option<String>,
}

impl LlmClient {
    /// Build a client for an OpenAI-compatible endpoint.
    #[must_use]
    pub fn new(inference_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            inference_url,
            model,
            api_key,
        }
    }
}

#[async_trait]
impl ChatTransport for LlmClient {
    async fn send(
        &self,
        messages: Vec<ChatMessage>,
        tools_json: Option<Vec<serde_json::Value>>,
    ) -> Result<AssistantMessage> {
        let tools = tools_json.map(build_tool_defs).filter(|t| !t.is_empty());
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: 0.0,
            tool_choice: tools.as_ref().map(|_| "auto".to_string()),
            tools,
        };
        let mut req = self
            .client
            .post(&self.inference_url)
            .json(&body)
            .header("Content-Type", "application/json");
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("chat API error {}: {}", status, text));
        }
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("chat response parse error: {}; body: {}", e, text))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("chat response has no choices"))?;
        Ok(choice.message)
    }
}
