//! Data models for dashboard entities.
//!
//! - `Team`: team records and update payloads
//! - `Member`, `Role`: roster people (players, coaches, managers)
//! - `MatchResult`, `Expense`: recorded activity
//! - `DashboardSummary`: the composite aggregate

pub mod activity;
pub mod dashboard;
pub mod member;
pub mod team;

pub use activity::{Expense, MatchResult, NewExpense, NewMatchResult, Outcome};
pub use dashboard::DashboardSummary;
pub use member::{Member, MemberUpdate, NewMember, Role};
pub use team::{Team, TeamUpdate};
