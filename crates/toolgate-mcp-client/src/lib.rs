//! MCP client for toolgate.
//!
//! Follows the [MCP protocol](https://spec.modelcontextprotocol.io/) client
//! pattern: `serve_client(handler, transport)` for the handshake, then
//! `list_tools` / `call_tool` on the running service. Supports Streamable
//! HTTP (optionally with a bearer token for authenticated tool servers) and
//! stdio child-process transports.

mod client;
mod config;

pub use client::{ToolgateMcpClient, default_init_params};
pub use config::McpServerTransportConfig;
