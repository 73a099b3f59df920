//! Bounded in-memory store of timestamped entries.
//!
//! Pure bookkeeping: no knowledge of what is being cached and no fallible
//! operations. Every mutation happens under one lock, so writes, removals,
//! and cleanup are atomic with respect to concurrent readers. The lock is
//! never held across an await point.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::entry::CacheEntry;
use super::policy::Category;

const LOCK_POISONED: &str = "cache store lock poisoned";

#[derive(Default)]
pub struct CacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(1) lookup. Clones the entry out; callers never hold a reference
    /// into the map.
    pub fn lookup(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().expect(LOCK_POISONED).get(key).cloned()
    }

    /// Store `data` under `key` with the category's TTL, replacing any
    /// previous entry, then run cleanup for the category.
    pub fn write(&self, key: &str, data: Value, category: Category) {
        let now = Utc::now();
        self.write_entry(CacheEntry::new(key.to_string(), data, category, now), now);
    }

    pub(crate) fn write_entry(&self, entry: CacheEntry, now: DateTime<Utc>) {
        let category = entry.category;
        let mut entries = self.entries.lock().expect(LOCK_POISONED);
        entries.insert(entry.key.clone(), entry);
        Self::cleanup(&mut entries, category, now);
    }

    pub fn remove<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = self.entries.lock().expect(LOCK_POISONED);
        for key in keys {
            entries.remove(key.as_ref());
        }
    }

    /// Remove every entry whose key satisfies `pred`; returns how many
    /// were dropped.
    pub fn remove_matching<F>(&self, pred: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let mut entries = self.entries.lock().expect(LOCK_POISONED);
        let before = entries.len();
        entries.retain(|key, _| !pred(key));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.lock().expect(LOCK_POISONED).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect(LOCK_POISONED).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().expect(LOCK_POISONED).contains_key(key)
    }

    /// Point-in-time copy of every entry, for stats.
    pub fn snapshot(&self) -> Vec<CacheEntry> {
        self.entries
            .lock()
            .expect(LOCK_POISONED)
            .values()
            .cloned()
            .collect()
    }

    /// Drop entries of `category` that are past their grace period, then
    /// evict the oldest-by-write until the category is at or under its
    /// `max_entries`. Eviction orders by write time, not read time;
    /// lookups never touch timestamps.
    fn cleanup(entries: &mut HashMap<String, CacheEntry>, category: Category, now: DateTime<Utc>) {
        entries.retain(|_, entry| entry.category != category || !entry.past_grace(now));

        let max_entries = category.policy().max_entries;
        let mut live: Vec<(String, DateTime<Utc>)> = entries
            .values()
            .filter(|entry| entry.category == category)
            .map(|entry| (entry.key.clone(), entry.stored_at))
            .collect();
        if live.len() <= max_entries {
            return;
        }

        live.sort_by_key(|(_, stored_at)| *stored_at);
        let excess = live.len() - max_entries;
        for (key, _) in live.into_iter().take(excess) {
            entries.remove(&key);
            debug!(%key, category = category.name(), "evicted oldest entry");
        }
    }

    /// Shift an entry's timestamps into the past, to simulate the passage
    /// of time in tests.
    #[cfg(test)]
    pub(crate) fn backdate(&self, key: &str, by: chrono::Duration) {
        let mut entries = self.entries.lock().expect(LOCK_POISONED);
        if let Some(entry) = entries.get_mut(key) {
            entry.stored_at -= by;
            entry.expires_at -= by;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_write_lookup_remove() {
        let store = CacheStore::new();
        assert!(store.lookup("teams:all").is_none());

        store.write("teams:all", json!(["tigers"]), Category::Teams);
        let entry = store.lookup("teams:all").unwrap();
        assert_eq!(entry.data, json!(["tigers"]));
        assert_eq!(entry.category, Category::Teams);

        store.remove(["teams:all"]);
        assert!(store.lookup("teams:all").is_none());
    }

    #[test]
    fn test_write_replaces_wholesale() {
        let store = CacheStore::new();
        store.write("teams:all", json!(1), Category::Teams);
        store.write("teams:all", json!(2), Category::Teams);
        assert_eq!(store.lookup("teams:all").unwrap().data, json!(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_eviction_bound_drops_oldest_by_write_time() {
        let store = CacheStore::new();
        let max = Category::LiveMetrics.policy().max_entries;
        let base = Utc::now();

        for i in 0..max + 5 {
            let t = base + Duration::milliseconds(i as i64);
            let entry = CacheEntry::new(
                format!("live:{}", i),
                json!(i),
                Category::LiveMetrics,
                t,
            );
            store.write_entry(entry, t);
        }

        assert_eq!(store.len(), max);
        for i in 0..5 {
            assert!(!store.contains(&format!("live:{}", i)), "live:{}", i);
        }
        for i in 5..max + 5 {
            assert!(store.contains(&format!("live:{}", i)), "live:{}", i);
        }
    }

    #[test]
    fn test_eviction_is_per_category() {
        let store = CacheStore::new();
        store.write("teams:all", json!([]), Category::Teams);

        let max = Category::LiveMetrics.policy().max_entries;
        let base = Utc::now();
        for i in 0..max + 1 {
            let t = base + Duration::milliseconds(i as i64);
            let entry =
                CacheEntry::new(format!("live:{}", i), json!(i), Category::LiveMetrics, t);
            store.write_entry(entry, t);
        }

        // The Teams entry is untouched by LiveMetrics eviction.
        assert!(store.contains("teams:all"));
        assert_eq!(store.len(), max + 1);
    }

    #[test]
    fn test_cleanup_prunes_past_grace_entries() {
        let store = CacheStore::new();
        let ttl = Category::Teams.policy().ttl;
        let long_ago = Utc::now() - (ttl + ttl + Duration::seconds(1));
        store.write_entry(
            CacheEntry::new("teams:old".into(), json!(0), Category::Teams, long_ago),
            long_ago,
        );
        assert!(store.contains("teams:old"));

        // The next write to the category garbage-collects it.
        store.write("teams:new", json!(1), Category::Teams);
        assert!(!store.contains("teams:old"));
        assert!(store.contains("teams:new"));
    }

    #[test]
    fn test_remove_matching_counts() {
        let store = CacheStore::new();
        store.write("teams:all", json!([]), Category::Teams);
        store.write("teams:1", json!([]), Category::Teams);
        store.write("members:all", json!([]), Category::Members);

        let removed = store.remove_matching(|key| key.contains("teams:"));
        assert_eq!(removed, 2);
        assert!(store.contains("members:all"));
    }
}
