//! Pattern types and the domain-event invalidation table.
//!
//! Write events map to declarative lists of key patterns to purge. Adding
//! a new rule means adding an arm to [`patterns_for`]; the cache internals
//! are never touched.

use std::fmt;

use regex::Regex;

/// A key pattern accepted by [`Cache::invalidate`](super::Cache::invalidate).
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches any key containing the given substring.
    Substring(String),
    /// Matches keys the anchored regex matches in full.
    Regex(Regex),
}

impl Pattern {
    /// Compile a full-match regex pattern. The expression is anchored, so
    /// the whole key must match.
    pub fn regex(expr: &str) -> Result<Self, regex::Error> {
        Ok(Pattern::Regex(Regex::new(&format!("^(?:{})$", expr))?))
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            Pattern::Substring(needle) => key.contains(needle.as_str()),
            Pattern::Regex(re) => re.is_match(key),
        }
    }
}

impl From<&str> for Pattern {
    fn from(needle: &str) -> Self {
        Pattern::Substring(needle.to_string())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Substring(needle) => write!(f, "substring({})", needle),
            Pattern::Regex(re) => write!(f, "regex({})", re.as_str()),
        }
    }
}

/// A domain write event that dirties cached reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    TeamUpdated { team_id: i64 },
    RosterChanged { team_id: i64 },
    MemberUpdated { member_id: i64 },
    MatchRecorded { team_id: i64 },
    ExpenseRecorded { team_id: i64 },
}

/// The patterns to purge for a write event. Each arm is a data list, not
/// control flow.
pub fn patterns_for(event: &DomainEvent) -> Vec<Pattern> {
    match event {
        DomainEvent::TeamUpdated { team_id } => vec![
            Pattern::from("teams:"),
            Pattern::from("dashboard:"),
            Pattern::Substring(format!("team={}", team_id)),
        ],
        DomainEvent::RosterChanged { team_id } => vec![
            Pattern::from("teams:"),
            Pattern::from("members:"),
            Pattern::from("dashboard:"),
            Pattern::Substring(format!("team={}", team_id)),
        ],
        DomainEvent::MemberUpdated { member_id } => vec![
            Pattern::from("members:"),
            Pattern::from("dashboard:"),
            Pattern::Substring(format!("member={}", member_id)),
        ],
        DomainEvent::MatchRecorded { team_id } => vec![
            Pattern::from("matches:"),
            Pattern::from("dashboard:"),
            Pattern::Substring(format!("team={}", team_id)),
        ],
        DomainEvent::ExpenseRecorded { team_id } => vec![
            Pattern::from("expenses:"),
            Pattern::from("dashboard:"),
            Pattern::Substring(format!("team={}", team_id)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_matches_anywhere() {
        let pattern = Pattern::from("teams:");
        assert!(pattern.matches("teams:all"));
        assert!(pattern.matches("dashboard:teams:7"));
        assert!(!pattern.matches("users:42"));
    }

    #[test]
    fn test_regex_matches_whole_key_only() {
        let pattern = Pattern::regex(r"matches:team=\d+").unwrap();
        assert!(pattern.matches("matches:team=7"));
        assert!(!pattern.matches("matches:team=7:page=2"));
        assert!(!pattern.matches("old:matches:team=7"));
    }

    #[test]
    fn test_roster_change_hits_expected_namespaces() {
        let patterns = patterns_for(&DomainEvent::RosterChanged { team_id: 3 });
        let hits = |key: &str| patterns.iter().any(|p| p.matches(key));

        assert!(hits("teams:all"));
        assert!(hits("members:team=3"));
        assert!(hits("dashboard:summary"));
        assert!(hits("expenses:team=3")); // parameterized by the team
        assert!(!hits("expenses:all"));
        assert!(!hits("live:score"));
    }

    #[test]
    fn test_expense_event_leaves_members_alone() {
        let patterns = patterns_for(&DomainEvent::ExpenseRecorded { team_id: 9 });
        let hits = |key: &str| patterns.iter().any(|p| p.matches(key));

        assert!(hits("expenses:all"));
        assert!(hits("dashboard:summary"));
        assert!(!hits("members:all"));
    }
}
