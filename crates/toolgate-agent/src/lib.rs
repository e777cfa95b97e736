//! Approval-gated conversation orchestrator.
//!
//! Mediates multi-turn conversations between an LLM chat endpoint and a
//! set of invocable tools, inserting a configurable human-approval gate
//! before any tool executes:
//!
//! - **Auto**: requested calls execute immediately.
//! - **Manual**: calls go pending; the caller approves or declines each by
//!   id.
//! - **Elicitation**: calls go pending and resolve through an asynchronous
//!   out-of-band accept/decline round trip.
//!
//! Tool catalogs come from a static local set or from an MCP tool server
//! (unauthenticated or bearer-authenticated), unified behind one [`Tool`]
//! capability interface.

mod approval;
mod catalog;
mod chat;
mod config;
mod elicitation;
mod error;
mod llm;
mod observability;
mod session;
#[doc(hidden)]
pub mod test_support;
mod tools;

pub use approval::ApprovalMode;
pub use catalog::{CallingMode, ToolCatalog, resolve_catalog};
pub use chat::{
    ChatService, PendingFunctionCall, PromptResponse, SESSION_NOT_FOUND_ANSWER, TERMINATION_ANSWER,
};
pub use config::ServiceConfig;
pub use elicitation::{
    ElicitOutcome, ElicitationChannel, ElicitationCoordinator, ElicitationRequest,
    NullElicitationChannel,
};
pub use error::ChatError;
pub use llm::{AssistantMessage, ChatTransport, LlmClient};
pub use observability::ChatEvent;
pub use session::{CallDescriptor, ChatMessage, FunctionCall, Session, SessionStore, ToolCallOut};
pub use tools::{Tool, local_tools};
