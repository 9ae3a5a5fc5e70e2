//! Team data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;

/// Team ID type
pub type TeamId = i64;

/// Logo used when a team is created without one
pub const DEFAULT_TEAM_LOGO: &str = "/logo/bgmi-logo.jpeg";

/// Role inside a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamRole {
    Leader,
    Member,
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamRole::Leader => write!(f, "LEADER"),
            TeamRole::Member => write!(f, "MEMBER"),
        }
    }
}

impl std::str::FromStr for TeamRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEADER" => Ok(TeamRole::Leader),
            "MEMBER" => Ok(TeamRole::Member),
            other => Err(format!("unknown team role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: UserId,
    pub in_game_name: Option<String>,
    pub in_game_player_id: Option<String>,
    pub role: TeamRole,
}

/// Team with its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub logo: String,
    pub code: String,
    pub created_by: UserId,
    pub members: Vec<TeamMember>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }
}

/// Team creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub logo: Option<String>,
    pub in_game_name: Option<String>,
    pub in_game_player_id: Option<String>,
}

/// Validated team row ready for insertion; `leader` becomes the first member
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub logo: String,
    pub code: String,
    pub leader: TeamMember,
}

/// Result of a membership check handed to the entry workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub team_id: TeamId,
    pub members: Vec<UserId>,
}
