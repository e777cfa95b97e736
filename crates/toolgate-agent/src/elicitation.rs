//! Out-of-band approval round trips.
//!
//! The coordinator owns a request/response correlation map keyed by a
//! request id it generates. The channel only delivers requests; responses
//! re-enter through [`ElicitationCoordinator::resolve`], usually from a
//! different logical flow than the one awaiting. Every exit path removes
//! the waiter so an abandoned request never leaks a suspended flow.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, oneshot};
use uuid::Uuid;

use crate::observability::ChatEvent;

/// An approval request delivered through the out-of-band channel.
#[derive(Debug, Clone)]
pub struct ElicitationRequest {
    /// Correlation id; responses must echo it.
    pub id: String,
    /// Human-readable description of what is being approved.
    pub description: String,
}

/// Response delivered by the external approval channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ElicitOutcome {
    /// Approved, with optional content supplied by the approver.
    Accepted {
        /// Channel-provided payload; logged but not interpreted.
        content: Option<Value>,
    },
    /// Rejected.
    Declined,
}

/// Internal result of one round trip.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ElicitResolution {
    /// The channel accepted the request.
    Accepted {
        /// Channel-provided payload.
        content: Option<Value>,
    },
    /// The channel declined the request.
    Declined,
    /// No response arrived within the timeout; waiter discarded.
    TimedOut,
    /// The channel could not deliver the request at all.
    Undeliverable,
}

/// Transport that carries approval requests out of band.
#[async_trait]
pub trait ElicitationChannel: Send + Sync {
    /// Deliver one request to the external approval surface.
    async fn deliver(&self, request: ElicitationRequest) -> Result<()>;
}

/// Channel for deployments without an approval surface: every delivery
/// fails, so elicitation degrades to the manual pending surface.
pub struct NullElicitationChannel;

#[async_trait]
impl ElicitationChannel for NullElicitationChannel {
    async fn deliver(&self, _request: ElicitationRequest) -> Result<()> {
        Err(anyhow::anyhow!("no elicitation channel configured"))
    }
}

/// Correlates out-of-band approval requests with their responses.
pub struct ElicitationCoordinator {
    waiters: Mutex<HashMap<String, oneshot::Sender<ElicitOutcome>>>,
    channel: std::sync::Arc<dyn ElicitationChannel>,
    timeout: Duration,
}

impl ElicitationCoordinator {
    /// Build a coordinator over a delivery channel with a response timeout.
    #[must_use]
    pub fn new(channel: std::sync::Arc<dyn ElicitationChannel>, timeout: Duration) -> Self {
        Self {
            waiters: Mutex::new(HashMap::new()),
            channel,
            timeout,
        }
    }

    /// Issue one approval request and await its resolution.
    pub(crate) async fn request(&self, description: String) -> ElicitResolution {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().await.insert(id.clone(), tx);
        tracing::info!(
            event = ChatEvent::ElicitationRequested.as_str(),
            request_id = %id,
            "elicitation request issued"
        );
        let delivery = self
            .channel
            .deliver(ElicitationRequest {
                id: id.clone(),
                description,
            })
            .await;
        if let Err(error) = delivery {
            self.waiters.lock().await.remove(&id);
            tracing::warn!(
                event = ChatEvent::ElicitationUndeliverable.as_str(),
                request_id = %id,
                error = %error,
                "elicitation request could not be delivered"
            );
            return ElicitResolution::Undeliverable;
        }
        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(ElicitOutcome::Accepted { content })) => {
                ElicitResolution::Accepted { content }
            }
            Ok(Ok(ElicitOutcome::Declined)) => ElicitResolution::Declined,
            // Sender dropped without a response; treat like a timeout.
            Ok(Err(_)) => {
                self.waiters.lock().await.remove(&id);
                ElicitResolution::TimedOut
            }
            Err(_) => {
                self.waiters.lock().await.remove(&id);
                tracing::warn!(
                    event = ChatEvent::ElicitationTimedOut.as_str(),
                    request_id = %id,
                    timeout_secs = self.timeout.as_secs(),
                    "elicitation request timed out"
                );
                ElicitResolution::TimedOut
            }
        }
    }

    /// Deliver a response for a previously issued request. Returns whether
    /// a waiter was matched; unknown or already-resolved ids are ignored.
    pub async fn resolve(&self, request_id: &str, outcome: ElicitOutcome) -> bool {
        let waiter = self.waiters.lock().await.remove(request_id);
        match waiter {
            Some(tx) => {
                let delivered = tx.send(outcome).is_ok();
                tracing::debug!(
                    event = ChatEvent::ElicitationResolved.as_str(),
                    request_id,
                    delivered,
                    "elicitation response matched"
                );
                delivered
            }
            None => {
                tracing::debug!(
                    event = ChatEvent::ElicitationResolved.as_str(),
                    request_id,
                    delivered = false,
                    "elicitation response for unknown request ignored"
                );
                false
            }
        }
    }

    /// Number of requests still awaiting a response.
    pub async fn pending_requests(&self) -> usize {
        self.waiters.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct DropChannel;

    #[async_trait]
    impl ElicitationChannel for DropChannel {
        async fn deliver(&self, _request: ElicitationRequest) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn timeout_discards_the_waiter() {
        let coordinator =
            ElicitationCoordinator::new(Arc::new(DropChannel), Duration::from_millis(10));
        let resolution = coordinator.request("approve?".to_string()).await;
        assert_eq!(resolution, ElicitResolution::TimedOut);
        assert_eq!(coordinator.pending_requests().await, 0);
    }

    #[tokio::test]
    async fn undeliverable_request_leaves_no_waiter() {
        let coordinator = ElicitationCoordinator::new(
            Arc::new(NullElicitationChannel),
            Duration::from_secs(5),
        );
        let resolution = coordinator.request("approve?".to_string()).await;
        assert_eq!(resolution, ElicitResolution::Undeliverable);
        assert_eq!(coordinator.pending_requests().await, 0);
    }

    #[tokio::test]
    async fn resolving_an_unknown_id_is_ignored() {
        let coordinator = ElicitationCoordinator::new(
            Arc::new(NullElicitationChannel),
            Duration::from_secs(5),
        );
        assert!(
            !coordinator
                .resolve("nope", ElicitOutcome::Declined)
                .await
        );
    }
}
