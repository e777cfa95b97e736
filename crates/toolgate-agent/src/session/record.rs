//! Per-conversation session record: history, pending calls, final answer.

use std::collections::HashMap;
use std::time::SystemTime;

use serde_json::Value;

use super::message::{ChatMessage, ToolCallOut};

/// A tool-call request extracted from a model turn, not yet executed.
#[derive(Debug, Clone)]
pub struct CallDescriptor {
    /// Call identifier, opaque and unique within a turn.
    pub id: String,
    /// Tool name as requested by the model.
    pub name: String,
    /// Parsed arguments; `None` when the payload was empty or unparsable.
    pub arguments: Option<Value>,
}

impl CallDescriptor {
    /// Build a descriptor from the wire-level tool call.
    #[must_use]
    pub fn from_wire(call: &ToolCallOut) -> Self {
        let args_str = call.function.arguments.trim();
        let arguments = if args_str.is_empty() {
            None
        } else {
            serde_json::from_str(args_str).ok()
        };
        Self {
            id: call.id.clone(),
            name: call.function.name.clone(),
            arguments,
        }
    }

    /// Pretty-printed arguments for caller display; `"{}"` when absent.
    #[must_use]
    pub fn arguments_pretty(&self) -> String {
        match &self.arguments {
            Some(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            None => "{}".to_string(),
        }
    }
}

/// One conversation's state, owned by the [`super::SessionStore`].
///
/// `pending_calls` and `final_answer` are mutually exclusive: a non-empty
/// pending set implies no final answer is set, and vice versa.
#[derive(Debug)]
pub struct Session {
    /// Ordered message history; append-only until the session is removed.
    pub history: Vec<ChatMessage>,
    /// Call id → descriptor for calls awaiting approval.
    pub pending_calls: HashMap<String, CallDescriptor>,
    /// Set when a turn completes without further tool calls.
    pub final_answer: Option<String>,
    /// Refreshed on every mutation; an idle sweeper can key off this.
    pub last_updated: SystemTime,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self {
            history: Vec::new(),
            pending_calls: HashMap::new(),
            final_answer: None,
            last_updated: SystemTime::now(),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.last_updated = SystemTime::now();
    }
}
