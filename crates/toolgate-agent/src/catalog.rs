//! Tool catalog resolution: local set or remote MCP discovery.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolgate_mcp_client::{McpServerTransportConfig, ToolgateMcpClient, default_init_params};

use crate::config::ServiceConfig;
use crate::error::ChatError;
use crate::observability::ChatEvent;
use crate::tools::{Tool, local_tools};

/// How the tool catalog is obtained for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallingMode {
    /// Statically defined in-process tools.
    Local,
    /// Tools discovered from an MCP server, no credentials attached.
    RemoteUnauthenticated,
    /// Tools discovered from an MCP server with a bearer token.
    RemoteAuthenticated,
}

impl CallingMode {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            CallingMode::Local => "Local function calling",
            CallingMode::RemoteUnauthenticated => "Unauthenticated MCP",
            CallingMode::RemoteAuthenticated => "Authenticated MCP",
        }
    }
}

/// Ordered set of invocable tools for one conversation.
pub struct ToolCatalog {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolCatalog {
    /// Build a catalog from an ordered tool list.
    #[must_use]
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the catalog holds no tools (valid: "no tools" is not a
    /// resolution failure).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions in the shape the chat transport expects;
    /// `None` when the catalog is empty.
    #[must_use]
    pub fn llm_tool_defs(&self) -> Option<Vec<Value>> {
        if self.tools.is_empty() {
            return None;
        }
        Some(
            self.tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.schema(),
                    })
                })
                .collect(),
        )
    }
}

/// A remote-discovered tool adapted to the [`Tool`] contract.
struct McpTool {
    name: String,
    description: String,
    schema: Value,
    client: Arc<ToolgateMcpClient>,
}

#[async_trait]
impl Tool for McpTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> Value {
        self.schema.clone()
    }

    async fn invoke(&self, arguments: Option<Value>) -> Result<String> {
        let result = self.client.call_tool(self.name.clone(), arguments).await?;
        let text: String = result
            .content
            .iter()
            .filter_map(|c| {
                if let rmcp::model::RawContent::Text(t) = &c.raw {
                    Some(t.text.as_str())
                } else {
                    None
                }
            })
            .collect();
        if result.is_error.unwrap_or(false) {
            return Err(anyhow::anyhow!("tool `{}` reported an error: {text}", self.name));
        }
        Ok(text)
    }
}

/// Resolve the catalog for a calling mode.
///
/// # Errors
/// [`ChatError::ToolResolution`] when the remote transport is unreachable,
/// the handshake fails, `tools/list` errors, or required credentials are
/// missing — distinct from a successfully resolved empty catalog.
pub async fn resolve_catalog(
    mode: CallingMode,
    config: &ServiceConfig,
) -> Result<ToolCatalog, ChatError> {
    let catalog = match mode {
        CallingMode::Local => ToolCatalog::new(local_tools()),
        CallingMode::RemoteUnauthenticated | CallingMode::RemoteAuthenticated => {
            resolve_remote(mode, config).await.map_err(|source| {
                tracing::warn!(
                    event = ChatEvent::CatalogResolutionFailed.as_str(),
                    mode = mode.label(),
                    error = %source,
                    "tool catalog resolution failed"
                );
                ChatError::ToolResolution { source }
            })?
        }
    };
    tracing::info!(
        event = ChatEvent::CatalogResolved.as_str(),
        mode = mode.label(),
        tools = catalog.len(),
        "tool catalog resolved"
    );
    Ok(catalog)
}

async fn resolve_remote(mode: CallingMode, config: &ServiceConfig) -> Result<ToolCatalog> {
    let transport = config
        .mcp_server
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("remote calling mode requires mcp_server config"))?;
    let bearer = match mode {
        CallingMode::RemoteAuthenticated => Some(transport.resolve_bearer_token().ok_or_else(
            || anyhow::anyhow!("authenticated calling mode requires a resolvable bearer token"),
        )?),
        _ => None,
    };
    let timeout = Some(Duration::from_secs(config.mcp_handshake_timeout_secs.max(1)));
    let client = match transport {
        McpServerTransportConfig::StreamableHttp { url, .. } => {
            ToolgateMcpClient::connect_streamable_http(
                url,
                bearer.as_deref(),
                default_init_params(),
                timeout,
            )
            .await?
        }
        McpServerTransportConfig::Stdio { command, args } => {
            ToolgateMcpClient::connect_stdio(command, args, default_init_params(), timeout).await?
        }
    };
    let client = Arc::new(client);
    let list = client.list_tools(None).await?;
    let tools: Vec<Arc<dyn Tool>> = list
        .tools
        .iter()
        .map(|t| {
            Arc::new(McpTool {
                name: t.name.to_string(),
                description: t
                    .description
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                schema: Value::Object(t.input_schema.as_ref().clone()),
                client: Arc::clone(&client),
            }) as Arc<dyn Tool>
        })
        .collect();
    Ok(ToolCatalog::new(tools))
}
