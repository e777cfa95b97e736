//! Conversation orchestrator: begin, approve, decline.

mod locks;
mod turn;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::approval::ApprovalMode;
use crate::catalog::{CallingMode, ToolCatalog, resolve_catalog};
use crate::config::ServiceConfig;
use crate::elicitation::{
    ElicitOutcome, ElicitResolution, ElicitationChannel, ElicitationCoordinator,
};
use crate::error::ChatError;
use crate::llm::{ChatTransport, LlmClient};
use crate::observability::ChatEvent;
use crate::session::{ChatMessage, Session, SessionStore};

use locks::KeyedLocks;
use turn::TurnOutcome;

/// Answer returned when `approve` names a user key with no session.
pub const SESSION_NOT_FOUND_ANSWER: &str = "Session not found. Please start again.";

/// Answer returned when a conversation is terminated by decline.
pub const TERMINATION_ANSWER: &str = "Conversation terminated by user.";

/// One pending call as surfaced to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingFunctionCall {
    /// Call identifier to pass to `approve`/`decline`.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Pretty-printed arguments; `"{}"` when absent.
    pub arguments_json: String,
}

/// Caller-facing result of `begin`/`approve`/`decline`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResponse {
    /// Set when the turn completed (or on friendly failures/termination).
    pub final_answer: Option<String>,
    /// Calls awaiting approval; empty when a final answer is set.
    pub pending_calls: Vec<PendingFunctionCall>,
}

struct SetupState {
    approval_mode: ApprovalMode,
    calling_mode: CallingMode,
    /// Resolved catalog; `None` forces re-resolution on the next operation.
    catalog: Option<Arc<ToolCatalog>>,
}

/// Mediates conversations between the chat transport and invocable tools,
/// inserting the configured approval gate before any tool executes.
pub struct ChatService {
    config: ServiceConfig,
    transport: Arc<dyn ChatTransport>,
    elicitation: Arc<ElicitationCoordinator>,
    store: SessionStore,
    locks: KeyedLocks,
    setup: Mutex<SetupState>,
}

impl ChatService {
    /// Build a service over the configured OpenAI-compatible endpoint.
    /// Defaults to auto approval with the local tool set; the catalog is
    /// resolved lazily on the first operation.
    #[must_use]
    pub fn from_config(config: ServiceConfig, channel: Arc<dyn ElicitationChannel>) -> Self {
        let api_key = config.resolve_api_key();
        let transport = Arc::new(LlmClient::new(
            config.inference_url.clone(),
            config.model.clone(),
            api_key,
        ));
        Self::assemble(config, transport, channel, ApprovalMode::default(), None)
    }

    /// Build a service from explicit parts with a pre-resolved catalog.
    /// Used by tests and by callers bringing their own transport.
    #[doc(hidden)]
    #[must_use]
    pub fn with_parts(
        config: ServiceConfig,
        transport: Arc<dyn ChatTransport>,
        channel: Arc<dyn ElicitationChannel>,
        approval_mode: ApprovalMode,
        catalog: ToolCatalog,
    ) -> Self {
        Self::assemble(
            config,
            transport,
            channel,
            approval_mode,
            Some(Arc::new(catalog)),
        )
    }

    fn assemble(
        config: ServiceConfig,
        transport: Arc<dyn ChatTransport>,
        channel: Arc<dyn ElicitationChannel>,
        approval_mode: ApprovalMode,
        catalog: Option<Arc<ToolCatalog>>,
    ) -> Self {
        let elicitation = Arc::new(ElicitationCoordinator::new(
            channel,
            Duration::from_secs(config.elicitation_timeout_secs),
        ));
        Self {
            config,
            transport,
            elicitation,
            store: SessionStore::new(),
            locks: KeyedLocks::new(),
            setup: Mutex::new(SetupState {
                approval_mode,
                calling_mode: CallingMode::Local,
                catalog,
            }),
        }
    }

    /// The session store (diagnostics and tests).
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Requests currently awaiting an out-of-band response.
    pub async fn pending_elicitations(&self) -> usize {
        self.elicitation.pending_requests().await
    }

    /// Current approval policy.
    pub async fn approval_mode(&self) -> ApprovalMode {
        self.setup.lock().await.approval_mode
    }

    /// Current calling mode.
    pub async fn calling_mode(&self) -> CallingMode {
        self.setup.lock().await.calling_mode
    }

    /// Select the approval policy. A change invalidates the current setup;
    /// the catalog is rebuilt before the next operation.
    pub async fn set_approval_mode(&self, mode: ApprovalMode) {
        let mut setup = self.setup.lock().await;
        if setup.approval_mode != mode {
            setup.approval_mode = mode;
            setup.catalog = None;
        }
    }

    /// Select how the tool catalog is obtained. A change invalidates the
    /// current setup.
    pub async fn set_calling_mode(&self, mode: CallingMode) {
        let mut setup = self.setup.lock().await;
        if setup.calling_mode != mode {
            setup.calling_mode = mode;
            setup.catalog = None;
        }
    }

    async fn ensure_setup(&self) -> Result<(Arc<ToolCatalog>, ApprovalMode), ChatError> {
        let mut setup = self.setup.lock().await;
        let catalog = match &setup.catalog {
            Some(catalog) => Arc::clone(catalog),
            None => {
                let resolved =
                    Arc::new(resolve_catalog(setup.calling_mode, &self.config).await?);
                setup.catalog = Some(Arc::clone(&resolved));
                resolved
            }
        };
        Ok((catalog, setup.approval_mode))
    }

    /// Start a fresh conversation for a user key, discarding any prior
    /// session (including pending calls) under that key.
    ///
    /// # Errors
    /// [`ChatError::ToolResolution`] when setup fails,
    /// [`ChatError::Transport`] when the chat endpoint fails (session
    /// preserved for retry), [`ChatError::TurnLimitExceeded`] on a runaway
    /// tool loop.
    pub async fn begin(&self, user_key: &str, prompt: &str) -> Result<PromptResponse, ChatError> {
        let (catalog, mode) = self.ensure_setup().await?;
        let _guard = self.locks.lock(user_key).await;
        let handle = self.store.create(user_key).await;
        let mut session = handle.lock().await;
        session.history.push(ChatMessage::user(prompt));
        session.touch();
        self.drive(user_key, &mut session, &catalog, mode).await
    }

    /// Approve one pending call by id.
    ///
    /// Unknown user key → friendly "session not found" answer. Unknown call
    /// id → the current state, unchanged (duplicate approvals are safe).
    /// Otherwise the call executes; once the pending set drains, the turn
    /// resumes against the chat transport.
    ///
    /// # Errors
    /// Same as [`Self::begin`].
    pub async fn approve(
        &self,
        user_key: &str,
        call_id: &str,
    ) -> Result<PromptResponse, ChatError> {
        let (catalog, mode) = self.ensure_setup().await?;
        let _guard = self.locks.lock(user_key).await;
        let Some(handle) = self.store.get(user_key).await else {
            return Ok(PromptResponse {
                final_answer: Some(SESSION_NOT_FOUND_ANSWER.to_string()),
                pending_calls: Vec::new(),
            });
        };
        let mut session = handle.lock().await;
        let Some(descriptor) = session.pending_calls.get(call_id).cloned() else {
            tracing::debug!(
                event = ChatEvent::CallUnknown.as_str(),
                user_key,
                call_id,
                "approve on unknown call id ignored"
            );
            return Ok(current_state_response(&session));
        };
        turn::execute_call(&mut session, &catalog, &descriptor).await;
        tracing::info!(
            event = ChatEvent::CallApproved.as_str(),
            user_key,
            call_id,
            tool = %descriptor.name,
            remaining = session.pending_calls.len(),
            "pending call approved and executed"
        );
        if !session.pending_calls.is_empty() {
            return Ok(pending_response(&session));
        }
        self.drive(user_key, &mut session, &catalog, mode).await
    }

    /// Decline a call: unconditionally terminates the conversation and
    /// removes the session, whether or not the id was actually pending.
    ///
    /// # Errors
    /// None in practice; the `Result` keeps the caller-facing API uniform.
    pub async fn decline(
        &self,
        user_key: &str,
        call_id: &str,
    ) -> Result<PromptResponse, ChatError> {
        let _guard = self.locks.lock(user_key).await;
        let removed = self.store.remove(user_key).await;
        tracing::info!(
            event = ChatEvent::CallDeclined.as_str(),
            user_key,
            call_id,
            removed,
            "conversation terminated by decline"
        );
        Ok(termination_response())
    }

    /// Deliver an out-of-band approval response arriving on another flow.
    /// Returns whether a waiting request matched the id.
    pub async fn resolve_elicitation(&self, request_id: &str, outcome: ElicitOutcome) -> bool {
        self.elicitation.resolve(request_id, outcome).await
    }

    /// Run turns (and, under elicitation, approval round trips) until the
    /// conversation produces a final answer, blocks on pending calls, or is
    /// terminated.
    async fn drive(
        &self,
        user_key: &str,
        session: &mut Session,
        catalog: &ToolCatalog,
        mode: ApprovalMode,
    ) -> Result<PromptResponse, ChatError> {
        let tools_json = catalog.llm_tool_defs();
        let mut rounds = 0u32;
        loop {
            let outcome = turn::execute_turn(
                self.transport.as_ref(),
                user_key,
                session,
                catalog,
                mode,
                tools_json.as_ref(),
                &mut rounds,
                self.config.max_tool_rounds,
            )
            .await?;
            let batch = match outcome {
                TurnOutcome::Final(answer) => {
                    return Ok(PromptResponse {
                        final_answer: Some(answer),
                        pending_calls: Vec::new(),
                    });
                }
                TurnOutcome::Pending(batch) => batch,
            };
            if !mode.resolves_out_of_band() {
                return Ok(pending_response(session));
            }
            for descriptor in batch {
                let description = format!(
                    "Approve execution of tool `{}` with arguments:\n{}",
                    descriptor.name,
                    descriptor.arguments_pretty()
                );
                match self.elicitation.request(description).await {
                    ElicitResolution::Accepted { content } => {
                        if content.is_some() {
                            tracing::debug!(
                                call_id = %descriptor.id,
                                "elicitation content ignored for tool-call approval"
                            );
                        }
                        turn::execute_call(session, catalog, &descriptor).await;
                    }
                    ElicitResolution::Declined => {
                        self.store.remove(user_key).await;
                        tracing::info!(
                            event = ChatEvent::CallDeclined.as_str(),
                            user_key,
                            call_id = %descriptor.id,
                            via = "elicitation",
                            "conversation terminated by declined elicitation"
                        );
                        return Ok(termination_response());
                    }
                    ElicitResolution::TimedOut | ElicitResolution::Undeliverable => {
                        // Degrade to the manual surface: the calls stay
                        // pending and the caller may approve or decline.
                        return Ok(pending_response(session));
                    }
                }
            }
            // Batch drained; resume the turn against the transport.
        }
    }
}

fn project_pending(session: &Session) -> Vec<PendingFunctionCall> {
    session
        .pending_calls
        .values()
        .map(|d| PendingFunctionCall {
            id: d.id.clone(),
            name: d.name.clone(),
            arguments_json: d.arguments_pretty(),
        })
        .collect()
}

fn pending_response(session: &Session) -> PromptResponse {
    PromptResponse {
        final_answer: None,
        pending_calls: project_pending(session),
    }
}

fn current_state_response(session: &Session) -> PromptResponse {
    PromptResponse {
        final_answer: session.final_answer.clone(),
        pending_calls: project_pending(session),
    }
}

fn termination_response() -> PromptResponse {
    PromptResponse {
        final_answer: Some(TERMINATION_ANSWER.to_string()),
        pending_calls: Vec::new(),
    }
}
