//! MCP client: protocol handshake and tool calls.
//!
//! **Protocol:**
//! 1. Build transport (Streamable HTTP or stdio via `rmcp`).
//! 2. `serve_client(init_params, transport)` runs the handshake:
//!    - Client sends `initialize` (JSON-RPC) with protocolVersion, capabilities, clientInfo.
//!    - Server responds with `InitializeResult` and a session id.
//!    - Client sends `notifications/initialized`.
//! 3. After handshake, use `list_tools` and `call_tool` on the running service.
//!
//! Reference: [MCP Streamable HTTP](https://spec.modelcontextprotocol.io/specification/2024-11-05/server/streamableHTTP/).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rmcp::model::{
    CallToolRequestParams, ClientCapabilities, InitializeRequestParams, PaginatedRequestParams,
    ProtocolVersion,
};
use rmcp::service::{RoleClient, serve_client};
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::transport::child_process::TokioChildProcess;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use tokio::process::Command;
use tokio::sync::Mutex;

/// Build default init params (protocol 2024-11-05, no client capabilities).
#[must_use]
pub fn default_init_params() -> InitializeRequestParams {
    InitializeRequestParams {
        meta: None,
        protocol_version: ProtocolVersion::V_2024_11_05,
        capabilities: ClientCapabilities::default(),
        client_info: rmcp::model::Implementation::from_build_env(),
    }
}

/// State after connect: either still connecting or ready with running service.
enum ClientState {
    Connecting,
    Ready {
        service: Arc<rmcp::service::RunningService<RoleClient, InitializeRequestParams>>,
    },
}

/// MCP client for one tool server. Connect once, then `list_tools` / `call_tool`.
pub struct ToolgateMcpClient {
    state: Mutex<ClientState>,
}

impl ToolgateMcpClient {
    /// Connect via Streamable HTTP.
    ///
    /// When `bearer_token` is set, every request carries an
    /// `Authorization: Bearer ...` header (authenticated tool servers).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built, the MCP handshake
    /// times out, or the server rejects initialization.
    pub async fn connect_streamable_http(
        url: &str,
        bearer_token: Option<&str>,
        init_params: InitializeRequestParams,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let http_config = StreamableHttpClientTransportConfig::with_uri(url.to_string());
        let mut builder = reqwest::Client::builder();
        if let Some(token) = bearer_token {
            let mut headers = reqwest::header::HeaderMap::new();
            let mut value =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| anyhow::anyhow!("bearer token is not a valid header: {e}"))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }
        let http_client = builder
            .build()
            .map_err(|e| anyhow::anyhow!("reqwest client: {e}"))?;
        let transport = StreamableHttpClientTransport::with_client(http_client, http_config);
        let service = match timeout {
            Some(d) => tokio::time::timeout(d, serve_client(init_params, transport))
                .await
                .map_err(|_| anyhow::anyhow!("MCP handshake timeout"))?
                .map_err(|e| anyhow::anyhow!("MCP handshake: {e}"))?,
            None => serve_client(init_params, transport)
                .await
                .map_err(|e| anyhow::anyhow!("MCP handshake: {e}"))?,
        };
        Ok(Self {
            state: Mutex::new(ClientState::Ready {
                service: Arc::new(service),
            }),
        })
    }

    /// Connect via stdio: spawn command, stdin/stdout = MCP.
    ///
    /// # Errors
    /// Returns an error if spawning the MCP subprocess fails, the handshake
    /// times out, or the server rejects initialization.
    pub async fn connect_stdio(
        command: &str,
        args: &[String],
        init_params: InitializeRequestParams,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped());
        let (transport, _stderr) = TokioChildProcess::builder(cmd)
            .spawn()
            .map_err(|e| anyhow::anyhow!("spawn MCP process: {e}"))?;
        let service = match timeout {
            Some(d) => tokio::time::timeout(d, serve_client(init_params, transport))
                .await
                .map_err(|_| anyhow::anyhow!("MCP handshake timeout"))?
                .map_err(|e| anyhow::anyhow!("MCP handshake: {e}"))?,
            None => serve_client(init_params, transport)
                .await
                .map_err(|e| anyhow::anyhow!("MCP handshake: {e}"))?,
        };
        Ok(Self {
            state: Mutex::new(ClientState::Ready {
                service: Arc::new(service),
            }),
        })
    }

    async fn service(
        &self,
    ) -> Result<Arc<rmcp::service::RunningService<RoleClient, InitializeRequestParams>>> {
        let guard = self.state.lock().await;
        match &*guard {
            ClientState::Ready { service } => Ok(Arc::clone(service)),
            ClientState::Connecting => Err(anyhow::anyhow!("MCP client not initialized")),
        }
    }

    /// List tools from the MCP server.
    ///
    /// # Errors
    /// Returns an error if the client has not connected yet or if the server
    /// fails `tools/list`.
    pub async fn list_tools(
        &self,
        params: Option<PaginatedRequestParams>,
    ) -> Result<rmcp::model::ListToolsResult> {
        let service = self.service().await?;
        service
            .list_tools(params)
            .await
            .map_err(|e| anyhow::anyhow!("tools/list: {e}"))
    }

    /// Call a tool by name with optional arguments.
    ///
    /// # Errors
    /// Returns an error if the client has not connected yet or if the server
    /// fails `tools/call`.
    pub async fn call_tool(
        &self,
        name: String,
        arguments: Option<serde_json::Value>,
    ) -> Result<rmcp::model::CallToolResult> {
        let service = self.service().await?;
        let args = arguments.and_then(|v| v.as_object().cloned());
        let params = CallToolRequestParams {
            meta: None,
            name: name.into(),
            arguments: args,
            task: None,
        };
        service
            .call_tool(params)
            .await
            .map_err(|e| anyhow::anyhow!("tools/call: {e}"))
    }
}
