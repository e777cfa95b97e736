//! Approval policy: whether a requested tool call executes immediately or
//! waits for explicit approval, and how that approval is obtained.

use serde::{Deserialize, Serialize};

/// Approval policy for a conversation. Selection is fixed for a session's
/// lifetime: changing it invalidates the service setup and forces the
/// catalog and wrapped transport to be rebuilt before the next `begin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// Every requested call executes immediately; nothing goes pending.
    #[default]
    Auto,
    /// Every requested call goes pending until the caller approves it.
    Manual,
    /// Calls go pending and are resolved by an out-of-band accept/decline
    /// round trip; no second caller action is needed.
    Elicitation,
}

impl ApprovalMode {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalMode::Auto => "Auto (no human approval)",
            ApprovalMode::Manual => "Manual approval",
            ApprovalMode::Elicitation => "Elicitation approval",
        }
    }

    /// How a requested call is handled under this policy.
    #[must_use]
    pub(crate) const fn disposition(self) -> CallDisposition {
        match self {
            ApprovalMode::Auto => CallDisposition::Execute,
            ApprovalMode::Manual | ApprovalMode::Elicitation => CallDisposition::Gate,
        }
    }

    /// Whether pending calls resolve through the elicitation channel.
    #[must_use]
    pub(crate) const fn resolves_out_of_band(self) -> bool {
        matches!(self, ApprovalMode::Elicitation)
    }
}

/// Classification of one requested call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallDisposition {
    /// Execute synchronously within the turn.
    Execute,
    /// Record as pending; execution waits for approval.
    Gate,
}
