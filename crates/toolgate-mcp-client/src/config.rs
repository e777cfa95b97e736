//! MCP server config: transport (Streamable HTTP or stdio).

use serde::{Deserialize, Serialize};

/// Transport for one MCP tool server (Streamable HTTP or stdio).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged, rename_all = "snake_case")]
pub enum McpServerTransportConfig {
    /// Streamable HTTP: connect to URL (e.g. `http://127.0.0.1:3000/mcp`).
    StreamableHttp {
        /// MCP server URL.
        url: String,
        /// Optional env var name holding a bearer token for authenticated servers.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bearer_token_env_var: Option<String>,
    },
    /// Stdio: spawn command; stdin/stdout speak MCP.
    Stdio {
        /// Executable name or path.
        command: String,
        /// Arguments (e.g. `["-y", "@modelcontextprotocol/server-everything"]`).
        #[serde(default)]
        args: Vec<String>,
    },
}

impl McpServerTransportConfig {
    /// Resolve the bearer token from the configured env var, if any.
    ///
    /// Returns `None` for stdio transports, when no env var is configured,
    /// or when the variable is unset or blank.
    #[must_use]
    pub fn resolve_bearer_token(&self) -> Option<String> {
        match self {
            Self::StreamableHttp {
                bearer_token_env_var: Some(var),
                ..
            } => std::env::var(var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            _ => None,
        }
    }
}
