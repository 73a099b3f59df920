//! Per-category cache policies.
//!
//! Every cached key belongs to exactly one [`Category`], a closed set of
//! data classes. Each category carries a static [`CategoryPolicy`] that
//! controls how long entries stay fresh, how many entries the category may
//! hold, and whether expired entries may be served while a background
//! refresh runs. The table is code-level configuration; nothing reloads it
//! at runtime.

use chrono::Duration;

/// Policy knobs shared by every key in a category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryPolicy {
    /// How long an entry counts as fresh after a write.
    pub ttl: Duration,
    /// Maximum live entries for the category; the oldest-by-write are
    /// evicted past this.
    pub max_entries: usize,
    /// Whether an expired entry may be served while a refresh runs in the
    /// background. The serve window is one extra TTL past expiry.
    pub stale_while_revalidate: bool,
}

/// The classes of cached data, one per dashboard concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Team records and rosters. Slow-changing.
    Teams,
    /// Members (players, coaches, managers).
    Members,
    /// Recorded match results.
    MatchResults,
    /// Expense records. Money figures are never served stale.
    Expenses,
    /// Composite dashboard aggregates.
    Dashboard,
    /// Short-lived live figures (attendance counters, in-progress scores).
    LiveMetrics,
}

impl Category {
    /// The policy for this category.
    pub fn policy(self) -> CategoryPolicy {
        match self {
            Category::Teams => CategoryPolicy {
                ttl: Duration::minutes(10),
                max_entries: 50,
                stale_while_revalidate: true,
            },
            Category::Members => CategoryPolicy {
                ttl: Duration::minutes(5),
                max_entries: 100,
                stale_while_revalidate: true,
            },
            Category::MatchResults => CategoryPolicy {
                ttl: Duration::minutes(2),
                max_entries: 100,
                stale_while_revalidate: true,
            },
            Category::Expenses => CategoryPolicy {
                ttl: Duration::minutes(5),
                max_entries: 100,
                stale_while_revalidate: false,
            },
            Category::Dashboard => CategoryPolicy {
                ttl: Duration::minutes(1),
                max_entries: 20,
                stale_while_revalidate: true,
            },
            Category::LiveMetrics => CategoryPolicy {
                ttl: Duration::seconds(15),
                max_entries: 20,
                stale_while_revalidate: false,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Teams => "teams",
            Category::Members => "members",
            Category::MatchResults => "match_results",
            Category::Expenses => "expenses",
            Category::Dashboard => "dashboard",
            Category::LiveMetrics => "live_metrics",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Category; 6] = [
        Category::Teams,
        Category::Members,
        Category::MatchResults,
        Category::Expenses,
        Category::Dashboard,
        Category::LiveMetrics,
    ];

    #[test]
    fn test_policies_are_sane() {
        for category in ALL {
            let policy = category.policy();
            assert!(policy.ttl > Duration::zero(), "{} ttl", category.name());
            assert!(policy.max_entries > 0, "{} max_entries", category.name());
        }
    }

    #[test]
    fn test_money_categories_never_serve_stale() {
        assert!(!Category::Expenses.policy().stale_while_revalidate);
    }
}
