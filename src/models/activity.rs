//! Match results and expenses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of a match from our team's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// A recorded match result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: i64,
    pub team_id: i64,
    pub opponent: String,
    pub our_score: u32,
    pub their_score: u32,
    pub played_on: NaiveDate,
}

/// Fields accepted when recording a match result.
#[derive(Debug, Clone, Serialize)]
pub struct NewMatchResult {
    pub team_id: i64,
    pub opponent: String,
    pub our_score: u32,
    pub their_score: u32,
    pub played_on: NaiveDate,
}

impl MatchResult {
    pub fn outcome(&self) -> Outcome {
        match self.our_score.cmp(&self.their_score) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// A team expense. Amounts are stored in cents to avoid float drift in
/// the dashboard sums.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub team_id: i64,
    pub description: String,
    pub amount_cents: i64,
    pub incurred_on: NaiveDate,
}

/// Fields accepted when recording an expense.
#[derive(Debug, Clone, Serialize)]
pub struct NewExpense {
    pub team_id: i64,
    pub description: String,
    pub amount_cents: i64,
    pub incurred_on: NaiveDate,
}
