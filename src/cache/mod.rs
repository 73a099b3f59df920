//! Read-through caching for dashboard data.
//!
//! [`Cache`] sits between the data service and the remote store. Reads are
//! served from memory when fresh, served stale while a background refresh
//! runs (where the category allows it), and otherwise fetched once per key
//! no matter how many callers ask concurrently.
//!
//! The cache is an explicit value, not a module-level global: the
//! application wires one instance at startup and tests instantiate
//! isolated ones. Entries do not survive a restart and are not shared
//! across processes.

mod coordinator;
mod entry;
mod error;
mod invalidation;
mod policy;
mod store;

pub use entry::{CacheEntry, Freshness};
pub use error::CacheError;
pub use invalidation::{patterns_for, DomainEvent, Pattern};
pub use policy::{Category, CategoryPolicy};
pub use store::CacheStore;

use std::future::Future;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use coordinator::FetchCoordinator;

/// Read-through cache with per-category TTLs, single-flight fetching, and
/// stale-while-revalidate. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Cache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    store: CacheStore,
    coordinator: FetchCoordinator,
}

/// Read-only snapshot returned by [`Cache::stats`].
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub pending_requests: usize,
    pub entries: Vec<EntryStats>,
}

#[derive(Debug, Clone)]
pub struct EntryStats {
    pub key: String,
    pub age: Duration,
    /// Negative once the entry has expired.
    pub ttl_remaining: Duration,
    pub expired: bool,
}

impl Cache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                store: CacheStore::new(),
                coordinator: FetchCoordinator::new(),
            }),
        }
    }

    /// Read `key`, fetching through `fetch` when the cache cannot serve it.
    ///
    /// First match wins:
    /// 1. fresh entry: returned immediately, no suspension;
    /// 2. stale-but-usable entry: returned immediately, one background
    ///    refresh spawned for future callers;
    /// 3. a fetch for `key` already in flight: attach and share its result;
    /// 4. miss: run `fetch` once (single-flight), store on success,
    ///    propagate the raw error on failure. Failures are never cached
    ///    and never disturb an existing entry.
    pub async fn get<T, F, Fut>(
        &self,
        key: &str,
        category: Category,
        fetch: F,
    ) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let now = Utc::now();
        if let Some(entry) = self.inner.store.lookup(key) {
            match entry.freshness(now) {
                Freshness::Fresh => return decode(key, &entry.data),
                Freshness::StaleUsable => {
                    debug!(%key, "serving stale entry, refreshing in background");
                    self.spawn_refresh(key, category, fetch);
                    return decode(key, &entry.data);
                }
                Freshness::Dead => {}
            }
        }

        let value = self.fetch_and_store(key, category, fetch).await?;
        decode(key, &value)
    }

    /// Prime the cache with data the caller already holds. Same expiry
    /// computation as a successful fetch.
    pub fn set<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        category: Category,
    ) -> Result<(), CacheError> {
        let value = serde_json::to_value(data).map_err(|e| CacheError::Encode {
            key: key.to_string(),
            reason: Arc::new(e),
        })?;
        self.inner.store.write(key, value, category);
        Ok(())
    }

    /// Remove every key matching `pattern`; returns how many were removed.
    /// A full scan, acceptable because every category is bounded.
    pub fn invalidate(&self, pattern: &Pattern) -> usize {
        let removed = self.inner.store.remove_matching(|key| pattern.matches(key));
        if removed > 0 {
            debug!(%pattern, removed, "invalidated cache keys");
        }
        removed
    }

    /// Apply the invalidation table for a domain write event.
    pub fn invalidate_event(&self, event: &DomainEvent) -> usize {
        patterns_for(event)
            .iter()
            .map(|pattern| self.invalidate(pattern))
            .sum()
    }

    /// Drop every entry. For full resets, e.g. on logout.
    pub fn clear(&self) {
        self.inner.store.clear();
    }

    /// Observability snapshot; mutates nothing.
    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let entries: Vec<EntryStats> = self
            .inner
            .store
            .snapshot()
            .into_iter()
            .map(|entry| EntryStats {
                age: now - entry.stored_at,
                ttl_remaining: entry.expires_at - now,
                expired: entry.is_expired(now),
                key: entry.key,
            })
            .collect();
        CacheStats {
            total_entries: entries.len(),
            pending_requests: self.inner.coordinator.in_flight(),
            entries,
        }
    }

    /// Run `fetch` through the coordinator; the leading caller writes the
    /// result into the store before waiters are resolved.
    async fn fetch_and_store<T, F, Fut>(
        &self,
        key: &str,
        category: Category,
        fetch: F,
    ) -> Result<Value, CacheError>
    where
        T: Serialize + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let this = self.clone();
        let key_owned = key.to_string();
        self.inner
            .coordinator
            .coordinate(key, move || async move {
                let fetched = fetch().await?;
                let value = serde_json::to_value(&fetched)?;
                this.inner.store.write(&key_owned, value.clone(), category);
                Ok(value)
            })
            .await
    }

    /// Fire-and-forget refresh for a stale entry. Goes through the
    /// coordinator, so an overlapping foreground miss for the same key
    /// still collapses into one fetch. Failures are logged and discarded;
    /// the stale entry stays servable until it falls out of its grace
    /// window. A panicking fetch is contained by the spawned task.
    fn spawn_refresh<T, F, Fut>(&self, key: &str, category: Category, fetch: F)
    where
        T: Serialize + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let this = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            match this.fetch_and_store(&key, category, fetch).await {
                Ok(_) => debug!(%key, "background refresh complete"),
                Err(error) => {
                    warn!(%key, %error, "background refresh failed, keeping stale entry");
                }
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, key: &str, by: Duration) {
        self.inner.store.backdate(key, by);
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.inner.store.contains(key)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: &Value) -> Result<T, CacheError> {
    serde_json::from_value(value.clone()).map_err(|e| CacheError::decode(key, e))
}
