//! Service configuration: inference API, model, MCP tool server, limits.

use serde::{Deserialize, Serialize};
use toolgate_mcp_client::McpServerTransportConfig;

/// Configuration for one [`crate::ChatService`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Chat-completions endpoint (OpenAI-compatible).
    #[serde(default = "default_inference_url")]
    pub inference_url: String,
    /// Model id sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Explicit API key; when absent, resolved from the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// MCP tool server for the remote calling modes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server: Option<McpServerTransportConfig>,
    /// Upper bound on chat-transport exchanges per `begin`/`approve` flow.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
    /// MCP handshake timeout in seconds.
    #[serde(default = "default_mcp_handshake_timeout_secs")]
    pub mcp_handshake_timeout_secs: u64,
    /// How long an out-of-band approval request may stay unanswered.
    #[serde(default = "default_elicitation_timeout_secs")]
    pub elicitation_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            inference_url: default_inference_url(),
            model: default_model(),
            api_key: None,
            mcp_server: None,
            max_tool_rounds: default_max_tool_rounds(),
            mcp_handshake_timeout_secs: default_mcp_handshake_timeout_secs(),
            elicitation_timeout_secs: default_elicitation_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Resolve the API key: explicit config wins, then `TOOLGATE_API_KEY`,
    /// then `OPENAI_API_KEY`. Local endpoints need no key.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref k) = self.api_key {
            return Some(k.clone());
        }
        if self.inference_url.contains("127.0.0.1") || self.inference_url.contains("localhost") {
            return None;
        }
        std::env::var("TOOLGATE_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

fn default_inference_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_tool_rounds() -> u32 {
    8
}
fn default_mcp_handshake_timeout_secs() -> u64 {
    30
}
fn default_elicitation_timeout_secs() -> u64 {
    120
}
