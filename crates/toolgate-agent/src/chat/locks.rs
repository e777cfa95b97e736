//! Per-key execution ordering for session mutations.
//!
//! Distinct user keys progress concurrently; operations on one key are
//! serialized so `begin`/`approve`/`decline` never interleave their reads
//! and writes of a session. Entries are never evicted; the map is bounded
//! by the user population, like the store itself.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

pub(crate) struct KeyedLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut g = self.inner.lock().await;
            Arc::clone(g.entry(key.to_string()).or_default())
        };
        entry.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_key_serializes() {
        let locks = Arc::new(KeyedLocks::new());
        let guard = locks.lock("u1").await;
        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.lock("u1").await;
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!contender.is_finished());
        drop(guard);
        contender.await.expect("contender completes after release");
    }

    #[tokio::test]
    async fn distinct_keys_do_not_block_each_other() {
        let locks = KeyedLocks::new();
        let _a = locks.lock("u1").await;
        let _b = locks.lock("u2").await;
    }
}
