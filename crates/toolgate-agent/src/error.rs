//! Error taxonomy for the orchestrator's public seam.
//!
//! Per-call tool failures are not represented here: they are converted to
//! error tool-result messages fed back to the model so it can react. An
//! unknown user key on `approve` is likewise a friendly answer, not an
//! error.

use thiserror::Error;

/// Failures surfaced to the caller of the conversation API.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The tool catalog could not be fetched or adapted. Setup-fatal:
    /// `begin` must not proceed. Distinct from an empty catalog.
    #[error("tool catalog resolution failed: {source}")]
    ToolResolution {
        /// Underlying transport/handshake/list failure.
        #[source]
        source: anyhow::Error,
    },

    /// The chat transport was unreachable or returned an error. The session
    /// is preserved so the caller can retry.
    #[error("chat transport failed: {source}")]
    Transport {
        /// Underlying HTTP/decode failure.
        #[source]
        source: anyhow::Error,
    },

    /// The turn loop hit its round bound without completing. Guards against
    /// a tool that re-triggers itself indefinitely; session preserved.
    #[error("turn aborted after {rounds} tool rounds without completing")]
    TurnLimitExceeded {
        /// Rounds executed before aborting.
        rounds: u32,
    },
}
