//! Domain data service: cached reads and invalidating writes.
//!
//! Each read builds a deterministic cache key from the entity and its
//! filters, supplies a fetch closure over the API client, and goes through
//! the cache with the entity's category. Writes post to the API and then
//! purge the affected keys through the domain-event invalidation table.

use anyhow::Result;
use tracing::warn;

use crate::api::ApiClient;
use crate::cache::{Cache, CacheError, Category, DomainEvent};
use crate::models::{
    DashboardSummary, Expense, MatchResult, Member, MemberUpdate, NewExpense, NewMatchResult,
    NewMember, Team, TeamUpdate,
};

/// Cached access to dashboard data. Clone is cheap; clones share the
/// cache and the connection pool.
#[derive(Clone)]
pub struct DataService {
    cache: Cache,
    api: ApiClient,
}

/// Deterministic cache key for an entity read, optionally scoped to a team.
fn scoped_key(entity: &str, team_id: Option<i64>) -> String {
    match team_id {
        Some(id) => format!("{}:team={}", entity, id),
        None => format!("{}:all", entity),
    }
}

/// Empty default for a non-critical sub-fetch; the dashboard prefers best
/// available data over failing outright.
fn or_empty<T>(what: &'static str, result: Result<Vec<T>, CacheError>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(error) => {
            warn!(what, %error, "non-critical sub-fetch failed, using empty default");
            Vec::new()
        }
    }
}

impl DataService {
    pub fn new(cache: Cache, api: ApiClient) -> Self {
        Self { cache, api }
    }

    // ===== Cached Reads =====

    pub async fn get_teams(&self) -> Result<Vec<Team>, CacheError> {
        let api = self.api.clone();
        self.cache
            .get("teams:all", Category::Teams, move || async move {
                api.list_teams().await
            })
            .await
    }

    pub async fn get_members(&self, team_id: Option<i64>) -> Result<Vec<Member>, CacheError> {
        let api = self.api.clone();
        self.cache
            .get(
                &scoped_key("members", team_id),
                Category::Members,
                move || async move { api.list_members(team_id).await },
            )
            .await
    }

    pub async fn get_match_results(
        &self,
        team_id: Option<i64>,
    ) -> Result<Vec<MatchResult>, CacheError> {
        let api = self.api.clone();
        self.cache
            .get(
                &scoped_key("matches", team_id),
                Category::MatchResults,
                move || async move { api.list_match_results(team_id).await },
            )
            .await
    }

    pub async fn get_expenses(&self, team_id: Option<i64>) -> Result<Vec<Expense>, CacheError> {
        let api = self.api.clone();
        self.cache
            .get(
                &scoped_key("expenses", team_id),
                Category::Expenses,
                move || async move { api.list_expenses(team_id).await },
            )
            .await
    }

    /// The composite dashboard read. Cached under its own key; on a miss it
    /// fans out to the per-entity reads in parallel and folds the results.
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, CacheError> {
        let service = self.clone();
        self.cache
            .get(
                "dashboard:summary",
                Category::Dashboard,
                move || async move { service.build_dashboard_summary().await },
            )
            .await
    }

    async fn build_dashboard_summary(&self) -> Result<DashboardSummary> {
        let (teams, members, matches, expenses) = futures::join!(
            self.get_teams(),
            self.get_members(None),
            self.get_match_results(None),
            self.get_expenses(None),
        );

        // Teams back every widget; without them the aggregate is
        // meaningless. The rest degrade to empty sections.
        let teams = teams?;
        let members = or_empty("members", members);
        let matches = or_empty("match_results", matches);
        let expenses = or_empty("expenses", expenses);

        Ok(DashboardSummary::compute(
            &teams, &members, &matches, &expenses,
        ))
    }

    // ===== Writes (invalidate on success) =====

    pub async fn record_match_result(&self, new: &NewMatchResult) -> Result<MatchResult> {
        let created = self.api.create_match_result(new).await?;
        self.cache.invalidate_event(&DomainEvent::MatchRecorded {
            team_id: created.team_id,
        });
        Ok(created)
    }

    pub async fn record_expense(&self, new: &NewExpense) -> Result<Expense> {
        let created = self.api.create_expense(new).await?;
        self.cache.invalidate_event(&DomainEvent::ExpenseRecorded {
            team_id: created.team_id,
        });
        Ok(created)
    }

    pub async fn add_member(&self, new: &NewMember) -> Result<Member> {
        let created = self.api.create_member(new).await?;
        self.cache.invalidate_event(&DomainEvent::RosterChanged {
            team_id: created.team_id,
        });
        Ok(created)
    }

    pub async fn update_member(&self, member_id: i64, update: &MemberUpdate) -> Result<Member> {
        let updated = self.api.update_member(member_id, update).await?;
        self.cache
            .invalidate_event(&DomainEvent::MemberUpdated { member_id });
        Ok(updated)
    }

    pub async fn update_team(&self, team_id: i64, update: &TeamUpdate) -> Result<Team> {
        let updated = self.api.update_team(team_id, update).await?;
        self.cache
            .invalidate_event(&DomainEvent::TeamUpdated { team_id });
        Ok(updated)
    }
}
