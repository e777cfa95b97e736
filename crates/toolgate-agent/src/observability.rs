//! Stable observability event ids attached to tracing records.
//!
//! Every significant state transition logs one of these ids in an
//! `event = ...` field so log pipelines can filter without parsing
//! human-readable messages.

/// Registry of structured event ids emitted by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEvent {
    /// A session was created (or replaced) for a user key.
    SessionCreated,
    /// A session was removed (decline or replacement).
    SessionRemoved,
    /// A turn completed with a final answer.
    TurnFinal,
    /// A turn stopped on a batch of pending calls.
    TurnPending,
    /// The tool catalog was resolved for a calling mode.
    CatalogResolved,
    /// Catalog resolution failed (transport/handshake/list error).
    CatalogResolutionFailed,
    /// A pending call was approved and executed.
    CallApproved,
    /// An approve named a call id that is not pending (idempotent no-op).
    CallUnknown,
    /// A decline terminated the conversation.
    CallDeclined,
    /// An out-of-band approval request was issued.
    ElicitationRequested,
    /// An out-of-band response was matched to a waiting request.
    ElicitationResolved,
    /// An out-of-band request timed out; the waiter was discarded.
    ElicitationTimedOut,
    /// The elicitation channel could not deliver a request.
    ElicitationUndeliverable,
    /// A tool invocation returned a result.
    ToolCallSucceeded,
    /// A tool invocation failed or named an unknown tool.
    ToolCallFailed,
}

impl ChatEvent {
    /// All registered events.
    pub const ALL: &'static [ChatEvent] = &[
        ChatEvent::SessionCreated,
        ChatEvent::SessionRemoved,
        ChatEvent::TurnFinal,
        ChatEvent::TurnPending,
        ChatEvent::CatalogResolved,
        ChatEvent::CatalogResolutionFailed,
        ChatEvent::CallApproved,
        ChatEvent::CallUnknown,
        ChatEvent::CallDeclined,
        ChatEvent::ElicitationRequested,
        ChatEvent::ElicitationResolved,
        ChatEvent::ElicitationTimedOut,
        ChatEvent::ElicitationUndeliverable,
        ChatEvent::ToolCallSucceeded,
        ChatEvent::ToolCallFailed,
    ];

    /// Stable dotted id for log filtering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ChatEvent::SessionCreated => "session.created",
            ChatEvent::SessionRemoved => "session.removed",
            ChatEvent::TurnFinal => "session.turn.final",
            ChatEvent::TurnPending => "session.turn.pending",
            ChatEvent::CatalogResolved => "catalog.resolved",
            ChatEvent::CatalogResolutionFailed => "catalog.resolution_failed",
            ChatEvent::CallApproved => "approval.call.approved",
            ChatEvent::CallUnknown => "approval.call.unknown",
            ChatEvent::CallDeclined => "approval.call.declined",
            ChatEvent::ElicitationRequested => "approval.elicitation.requested",
            ChatEvent::ElicitationResolved => "approval.elicitation.resolved",
            ChatEvent::ElicitationTimedOut => "approval.elicitation.timed_out",
            ChatEvent::ElicitationUndeliverable => "approval.elicitation.undeliverable",
            ChatEvent::ToolCallSucceeded => "tool.call.succeeded",
            ChatEvent::ToolCallFailed => "tool.call.failed",
        }
    }
}
