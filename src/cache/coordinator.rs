//! Single-flight deduplication of concurrent fetches.
//!
//! At most one underlying fetch runs per key at any instant. Callers that
//! arrive while a fetch is in flight attach to it and receive the same
//! settled result, success or failure. A cache miss under concurrent load
//! therefore costs one remote call, not N.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use super::error::CacheError;

const LOCK_POISONED: &str = "pending request map lock poisoned";

type FetchResult = Result<Value, CacheError>;

pub(crate) struct FetchCoordinator {
    /// Invariant: one pending slot per key, removed the instant the fetch
    /// settles.
    pending: Mutex<HashMap<String, broadcast::Sender<FetchResult>>>,
}

impl FetchCoordinator {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Number of fetches currently in flight.
    pub fn in_flight(&self) -> usize {
        self.pending.lock().expect(LOCK_POISONED).len()
    }

    /// Run `fetch` for `key`, unless one is already in flight, in which
    /// case attach to it and share its result.
    ///
    /// The leading caller deregisters the pending slot *before* resolving
    /// waiters, so a failure leaves no residue: the very next call starts
    /// a fresh attempt.
    pub async fn coordinate<F, Fut>(&self, key: &str, fetch: F) -> FetchResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>>,
    {
        let existing = {
            let mut pending = self.pending.lock().expect(LOCK_POISONED);
            match pending.get(key) {
                Some(tx) => Some(tx.subscribe()),
                None => {
                    // Capacity 1: exactly one result is ever sent.
                    let (tx, _) = broadcast::channel(1);
                    pending.insert(key.to_string(), tx);
                    None
                }
            }
        };

        if let Some(mut rx) = existing {
            debug!(%key, "attached to in-flight fetch");
            return match rx.recv().await {
                Ok(result) => result,
                // Sender dropped without sending: the leading caller was
                // cancelled mid-fetch.
                Err(_) => Err(CacheError::FetchCancelled {
                    key: key.to_string(),
                }),
            };
        }

        // Leading caller. The guard removes the pending slot even if this
        // future is dropped mid-fetch, so waiters never hang.
        let mut guard = PendingGuard {
            coordinator: self,
            key: key.to_string(),
            armed: true,
        };
        let result = fetch().await.map_err(CacheError::fetch);
        if let Some(tx) = guard.deregister() {
            let _ = tx.send(result.clone());
        }
        result
    }
}

struct PendingGuard<'a> {
    coordinator: &'a FetchCoordinator,
    key: String,
    armed: bool,
}

impl PendingGuard<'_> {
    /// Remove the pending slot and hand back the sender, so waiters are
    /// resolved only after deregistration.
    fn deregister(&mut self) -> Option<broadcast::Sender<FetchResult>> {
        self.armed = false;
        self.coordinator
            .pending
            .lock()
            .expect(LOCK_POISONED)
            .remove(&self.key)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.coordinator
                .pending
                .lock()
                .expect(LOCK_POISONED)
                .remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_calls_share_one_fetch() {
        let coordinator = Arc::new(FetchCoordinator::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let slow_fetch = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(json!("roster"))
            }
        };

        let (a, b, c) = tokio::join!(
            coordinator.coordinate("teams:1", slow_fetch(calls.clone())),
            coordinator.coordinate("teams:1", slow_fetch(calls.clone())),
            coordinator.coordinate("teams:1", slow_fetch(calls.clone())),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap(), json!("roster"));
        assert_eq!(b.unwrap(), json!("roster"));
        assert_eq!(c.unwrap(), json!("roster"));
        assert_eq!(coordinator.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter() {
        let coordinator = Arc::new(FetchCoordinator::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err::<Value, _>(anyhow::anyhow!("remote store unavailable"))
            }
        };

        let (a, b) = tokio::join!(
            coordinator.coordinate("members:all", failing(calls.clone())),
            coordinator.coordinate("members:all", failing(calls.clone())),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(a.as_ref(), Err(CacheError::Fetch(_))));
        assert!(matches!(b.as_ref(), Err(CacheError::Fetch(_))));
        assert_eq!(a.unwrap_err().to_string(), b.unwrap_err().to_string());
    }

    #[tokio::test]
    async fn test_failure_leaves_no_residue() {
        let coordinator = FetchCoordinator::new();

        let failed = coordinator
            .coordinate("expenses:all", || async {
                Err::<Value, _>(anyhow::anyhow!("timeout"))
            })
            .await;
        assert!(failed.is_err());
        assert_eq!(coordinator.in_flight(), 0);

        // The next caller triggers a fresh attempt.
        let ok = coordinator
            .coordinate("expenses:all", || async { Ok(json!(42)) })
            .await;
        assert_eq!(ok.unwrap(), json!(42));
    }

    #[tokio::test]
    async fn test_sequential_calls_each_fetch() {
        let coordinator = FetchCoordinator::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let result = coordinator
                .coordinate("live:score", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!(1))
                })
                .await;
            assert!(result.is_ok());
        }

        // No in-flight overlap, so no deduplication.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
