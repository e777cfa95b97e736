//! In-memory session store: user key → conversation session.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::observability::ChatEvent;

use super::record::Session;

/// Concurrency-safe store: user key → session.
///
/// Distinct keys may be read and written concurrently. Ordering of
/// operations on a single key is the orchestrator's responsibility (it
/// holds a per-key lock around `begin`/`approve`/`decline`).
pub struct SessionStore {
    inner: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    /// Create a new empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Create a fresh session for a user key, discarding any prior one.
    pub async fn create(&self, user_key: &str) -> Arc<Mutex<Session>> {
        let session = Arc::new(Mutex::new(Session::new()));
        let mut g = self.inner.write().await;
        let replaced = g
            .insert(user_key.to_string(), Arc::clone(&session))
            .is_some();
        tracing::debug!(
            event = ChatEvent::SessionCreated.as_str(),
            user_key,
            replaced,
            sessions = g.len(),
            "session created"
        );
        session
    }

    /// Look up the session for a user key.
    pub async fn get(&self, user_key: &str) -> Option<Arc<Mutex<Session>>> {
        let g = self.inner.read().await;
        g.get(user_key).cloned()
    }

    /// Remove the session for a user key; returns whether one existed.
    pub async fn remove(&self, user_key: &str) -> bool {
        let mut g = self.inner.write().await;
        let removed = g.remove(user_key).is_some();
        tracing::debug!(
            event = ChatEvent::SessionRemoved.as_str(),
            user_key,
            removed,
            sessions = g.len(),
            "session removed"
        );
        removed
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
