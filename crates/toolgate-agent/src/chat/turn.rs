//! Turn executor: one bounded loop of chat exchanges and tool handling.

use serde_json::Value;

use crate::approval::{ApprovalMode, CallDisposition};
use crate::catalog::ToolCatalog;
use crate::error::ChatError;
use crate::llm::ChatTransport;
use crate::observability::ChatEvent;
use crate::session::{CallDescriptor, ChatMessage, Session};

/// Result of driving a turn as far as it can go without approvals.
pub(crate) enum TurnOutcome {
    /// The model answered without requesting further tool calls.
    Final(String),
    /// Newly gated calls, recorded in the session, awaiting approval.
    Pending(Vec<CallDescriptor>),
}

/// Send the history to the chat transport, execute auto-approved calls,
/// and repeat until the turn finishes or blocks on gated calls.
///
/// `rounds` counts transport exchanges across the whole `begin`/`approve`
/// flow; the caller shares it between invocations so a tool that keeps
/// re-triggering itself cannot loop forever.
pub(crate) async fn execute_turn(
    transport: &dyn ChatTransport,
    user_key: &str,
    session: &mut Session,
    catalog: &ToolCatalog,
    mode: ApprovalMode,
    tools_json: Option<&Vec<Value>>,
    rounds: &mut u32,
    max_rounds: u32,
) -> Result<TurnOutcome, ChatError> {
    loop {
        if *rounds >= max_rounds {
            tracing::warn!(
                user_key,
                rounds = *rounds,
                "turn aborted: max tool rounds reached"
            );
            return Err(ChatError::TurnLimitExceeded { rounds: *rounds });
        }
        *rounds += 1;

        let resp = transport
            .send(session.history.clone(), tools_json.cloned())
            .await
            .map_err(|source| ChatError::Transport { source })?;

        if let Some(tool_calls) = resp.tool_calls.filter(|calls| !calls.is_empty()) {
            session.history.push(ChatMessage::assistant_with_calls(
                resp.content.clone(),
                tool_calls.clone(),
            ));
            session.touch();

            let mut gated = Vec::new();
            for call in &tool_calls {
                let descriptor = CallDescriptor::from_wire(call);
                match mode.disposition() {
                    CallDisposition::Execute => {
                        execute_call(session, catalog, &descriptor).await;
                    }
                    CallDisposition::Gate => {
                        session
                            .pending_calls
                            .insert(descriptor.id.clone(), descriptor.clone());
                        gated.push(descriptor);
                    }
                }
            }
            if gated.is_empty() {
                // Whole batch auto-executed; give the model the results.
                continue;
            }
            session.touch();
            tracing::info!(
                event = ChatEvent::TurnPending.as_str(),
                user_key,
                pending = gated.len(),
                "turn blocked on calls awaiting approval"
            );
            return Ok(TurnOutcome::Pending(gated));
        }

        // An empty trailing message is an empty final answer, not an error.
        let answer = resp.content.unwrap_or_default();
        session.final_answer = Some(answer.clone());
        session.touch();
        tracing::info!(
            event = ChatEvent::TurnFinal.as_str(),
            user_key,
            answer_chars = answer.len(),
            "turn completed with final answer"
        );
        return Ok(TurnOutcome::Final(answer));
    }
}

/// Invoke one call and append its tool-result to the history.
///
/// Never fails: an unknown tool name or a failed invocation becomes an
/// error tool-result so the model sees the failure and can react. The call
/// is removed from the pending set before the result is appended.
pub(crate) async fn execute_call(
    session: &mut Session,
    catalog: &ToolCatalog,
    descriptor: &CallDescriptor,
) {
    let result = match catalog.find(&descriptor.name) {
        Some(tool) => tool.invoke(descriptor.arguments.clone()).await,
        None => Err(anyhow::anyhow!(
            "tool `{}` matches no catalog entry",
            descriptor.name
        )),
    };
    let content = match result {
        Ok(text) => {
            tracing::debug!(
                event = ChatEvent::ToolCallSucceeded.as_str(),
                call_id = %descriptor.id,
                tool = %descriptor.name,
                "tool call succeeded"
            );
            text
        }
        Err(error) => {
            tracing::warn!(
                event = ChatEvent::ToolCallFailed.as_str(),
                call_id = %descriptor.id,
                tool = %descriptor.name,
                error = %error,
                "tool call failed"
            );
            format!("Error: {error}")
        }
    };
    session.pending_calls.remove(&descriptor.id);
    session.history.push(ChatMessage::tool_result(
        descriptor.id.clone(),
        descriptor.name.clone(),
        content,
    ));
    session.touch();
}
