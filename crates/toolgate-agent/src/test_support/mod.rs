//! Test-only helpers: scripted transports, channel-backed elicitation,
//! canned tools. Consumed by this crate's integration tests; not part of
//! the supported API.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use crate::elicitation::{ElicitationChannel, ElicitationRequest};
use crate::llm::{AssistantMessage, ChatTransport};
use crate::session::{ChatMessage, FunctionCall, ToolCallOut};
use crate::tools::Tool;

/// Transport that replays a fixed script of assistant messages.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<AssistantMessage>>,
    sends: AtomicUsize,
}

impl ScriptedTransport {
    /// Build a transport that yields `steps` in order.
    pub fn new(steps: Vec<AssistantMessage>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            sends: AtomicUsize::new(0),
        })
    }

    /// Number of exchanges performed so far.
    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(
        &self,
        _messages: Vec<ChatMessage>,
        _tools_json: Option<Vec<Value>>,
    ) -> Result<AssistantMessage> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("scripted transport exhausted"))
    }
}

/// Transport that always fails, simulating an unreachable endpoint.
pub struct FailingTransport;

#[async_trait]
impl ChatTransport for FailingTransport {
    async fn send(
        &self,
        _messages: Vec<ChatMessage>,
        _tools_json: Option<Vec<Value>>,
    ) -> Result<AssistantMessage> {
        Err(anyhow::anyhow!("inference endpoint unreachable"))
    }
}

/// Assistant message with text content only.
pub fn assistant_text(text: &str) -> AssistantMessage {
    AssistantMessage {
        content: Some(text.to_string()),
        tool_calls: None,
    }
}

/// Assistant message requesting tool calls: `(id, name, arguments_json)`.
pub fn assistant_tool_calls(calls: &[(&str, &str, &str)]) -> AssistantMessage {
    AssistantMessage {
        content: None,
        tool_calls: Some(
            calls
                .iter()
                .map(|(id, name, arguments)| ToolCallOut {
                    id: (*id).to_string(),
                    typ: "function".to_string(),
                    function: FunctionCall {
                        name: (*name).to_string(),
                        arguments: (*arguments).to_string(),
                    },
                })
                .collect(),
        ),
    }
}

/// Elicitation channel forwarding requests into an mpsc receiver so tests
/// can play the external approval surface.
pub struct ForwardingChannel {
    tx: mpsc::UnboundedSender<ElicitationRequest>,
}

impl ForwardingChannel {
    /// Channel plus the receiver end for the test to drive.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ElicitationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl ElicitationChannel for ForwardingChannel {
    async fn deliver(&self, request: ElicitationRequest) -> Result<()> {
        self.tx
            .send(request)
            .map_err(|_| anyhow::anyhow!("elicitation receiver dropped"))
    }
}

/// Tool returning a canned result (or error), counting invocations.
pub struct StaticTool {
    name: String,
    response: Result<String, String>,
    invocations: AtomicUsize,
}

impl StaticTool {
    /// Tool that succeeds with `text`.
    pub fn ok(name: &str, text: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            response: Ok(text.to_string()),
            invocations: AtomicUsize::new(0),
        })
    }

    /// Tool that fails with `message`.
    pub fn failing(name: &str, message: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            response: Err(message.to_string()),
            invocations: AtomicUsize::new(0),
        })
    }

    /// How many times the tool has been invoked.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "canned test tool"
    }

    fn schema(&self) -> Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn invoke(&self, _arguments: Option<Value>) -> Result<String> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}
