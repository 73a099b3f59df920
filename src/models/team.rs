//! Team domain models.

use serde::{Deserialize, Serialize};

/// A team managed through the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub division: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// Fields accepted when updating a team.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeamUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Team {
    pub fn display_name(&self) -> String {
        match &self.division {
            Some(division) if !division.is_empty() => {
                format!("{} ({})", self.name, division)
            }
            _ => self.name.clone(),
        }
    }
}
