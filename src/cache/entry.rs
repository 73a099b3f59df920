//! Cached entries and their freshness lifecycle.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use super::policy::Category;

/// How usable an entry is at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Within TTL of the last write; serve without any network activity.
    Fresh,
    /// Past TTL but within the grace window of a category that allows
    /// stale-while-revalidate; serve immediately, refresh in background.
    StaleUsable,
    /// Not servable; the next read is a miss.
    Dead,
}

/// One cached payload. Replaced wholesale on every refresh, never mutated
/// in place.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    /// Opaque payload; the store never introspects it.
    pub data: Value,
    pub stored_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub category: Category,
}

impl CacheEntry {
    pub fn new(key: String, data: Value, category: Category, now: DateTime<Utc>) -> Self {
        let ttl = category.policy().ttl;
        Self {
            key,
            data,
            stored_at: now,
            expires_at: now + ttl,
            category,
        }
    }

    /// The TTL this entry was written with.
    fn ttl(&self) -> Duration {
        self.expires_at - self.stored_at
    }

    pub fn freshness(&self, now: DateTime<Utc>) -> Freshness {
        if now < self.expires_at {
            return Freshness::Fresh;
        }
        let in_grace = now < self.expires_at + self.ttl();
        if in_grace && self.category.policy().stale_while_revalidate {
            Freshness::StaleUsable
        } else {
            Freshness::Dead
        }
    }

    /// Past the double-TTL grace period and eligible for garbage
    /// collection, whether or not the category serves stale data.
    pub fn past_grace(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at + self.ttl()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_within_ttl() {
        let t0 = Utc::now();
        let entry = CacheEntry::new("teams:all".into(), json!([1, 2]), Category::Teams, t0);
        assert_eq!(entry.freshness(t0), Freshness::Fresh);
        let just_before = entry.expires_at - Duration::milliseconds(1);
        assert_eq!(entry.freshness(just_before), Freshness::Fresh);
    }

    #[test]
    fn test_stale_window_for_swr_category() {
        let t0 = Utc::now();
        let entry = CacheEntry::new("teams:all".into(), json!([]), Category::Teams, t0);
        let ttl = Category::Teams.policy().ttl;
        assert_eq!(entry.freshness(t0 + ttl), Freshness::StaleUsable);
        assert_eq!(
            entry.freshness(t0 + ttl + ttl - Duration::milliseconds(1)),
            Freshness::StaleUsable
        );
        assert_eq!(entry.freshness(t0 + ttl + ttl), Freshness::Dead);
    }

    #[test]
    fn test_expired_non_swr_entry_is_dead() {
        let t0 = Utc::now();
        let entry = CacheEntry::new("live:score".into(), json!(3), Category::LiveMetrics, t0);
        let ttl = Category::LiveMetrics.policy().ttl;
        assert_eq!(entry.freshness(t0 + ttl), Freshness::Dead);
    }

    #[test]
    fn test_past_grace_uses_ttl_at_write() {
        let t0 = Utc::now();
        let entry = CacheEntry::new("expenses:all".into(), json!([]), Category::Expenses, t0);
        let ttl = Category::Expenses.policy().ttl;
        assert!(!entry.past_grace(t0 + ttl + ttl));
        assert!(entry.past_grace(t0 + ttl + ttl + Duration::milliseconds(1)));
    }
}
