//! Member domain models: the people on team rosters.

use serde::{Deserialize, Serialize};

/// A member's role on a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Player,
    Coach,
    Manager,
}

/// A person on a team roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub team_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub jersey_number: Option<u32>,
    #[serde(default)]
    pub active: bool,
}

/// Fields accepted when adding a member to a roster.
#[derive(Debug, Clone, Serialize)]
pub struct NewMember {
    pub team_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub jersey_number: Option<u32>,
}

/// Fields accepted when updating a member.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemberUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_player(&self) -> bool {
        self.role == Role::Player
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Player).unwrap(), "\"player\"");
        assert_eq!(serde_json::to_string(&Role::Coach).unwrap(), "\"coach\"");
    }

    #[test]
    fn test_full_name() {
        let member = Member {
            id: 1,
            team_id: 3,
            first_name: "Dana".into(),
            last_name: "Whitfield".into(),
            role: Role::Player,
            jersey_number: Some(9),
            active: true,
        };
        assert_eq!(member.full_name(), "Dana Whitfield");
        assert!(member.is_player());
    }
}
