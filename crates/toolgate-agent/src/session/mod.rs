//! Session namespace: chat message shapes, session record, store.

mod message;
mod record;
mod store;

pub use message::{ChatMessage, FunctionCall, ToolCallOut};
pub use record::{CallDescriptor, Session};
pub use store::SessionStore;
