//! The composite dashboard aggregate.

use serde::{Deserialize, Serialize};

use super::activity::{Expense, MatchResult, Outcome};
use super::member::Member;
use super::team::Team;

/// Headline figures for the dashboard landing screen, folded from the
/// per-entity reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub team_count: usize,
    pub member_count: usize,
    pub player_count: usize,
    pub matches_played: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    /// Wins over matches played, 0.0 when no matches are recorded.
    pub win_pct: f64,
    pub total_expenses_cents: i64,
}

impl DashboardSummary {
    pub fn compute(
        teams: &[Team],
        members: &[Member],
        matches: &[MatchResult],
        expenses: &[Expense],
    ) -> Self {
        let mut wins = 0;
        let mut losses = 0;
        let mut draws = 0;
        for result in matches {
            match result.outcome() {
                Outcome::Win => wins += 1,
                Outcome::Loss => losses += 1,
                Outcome::Draw => draws += 1,
            }
        }

        let matches_played = matches.len();
        let win_pct = if matches_played > 0 {
            wins as f64 / matches_played as f64 * 100.0
        } else {
            0.0
        };

        Self {
            team_count: teams.len(),
            member_count: members.len(),
            player_count: members.iter().filter(|m| m.is_player()).count(),
            matches_played,
            wins,
            losses,
            draws,
            win_pct,
            total_expenses_cents: expenses.iter().map(|e| e.amount_cents).sum(),
        }
    }
}
