//! Tournament data models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::team::TeamId;

/// Tournament ID type
pub type TournamentId = i64;

/// Tournament lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    /// Accepting teams
    Upcoming,
    /// Match in progress
    Ongoing,
    /// Match finished
    Completed,
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentStatus::Upcoming => write!(f, "upcoming"),
            TournamentStatus::Ongoing => write!(f, "ongoing"),
            TournamentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for TournamentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(TournamentStatus::Upcoming),
            "ongoing" => Ok(TournamentStatus::Ongoing),
            "completed" => Ok(TournamentStatus::Completed),
            other => Err(format!("unknown tournament status: {other}")),
        }
    }
}

/// Battleground map; large maps hold more teams
///
/// Maps without a dedicated variant are kept as their uppercase name and
/// hold the small-map lobby size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GameMap {
    Erangel,
    Miramar,
    Sanhok,
    Vikendi,
    Livik,
    Other(String),
}

impl GameMap {
    /// Team capacity of a lobby on this map
    pub fn max_teams(&self) -> i32 {
        match self {
            GameMap::Erangel | GameMap::Miramar => 25,
            _ => 13,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GameMap::Erangel => "ERANGEL",
            GameMap::Miramar => "MIRAMAR",
            GameMap::Sanhok => "SANHOK",
            GameMap::Vikendi => "VIKENDI",
            GameMap::Livik => "LIVIK",
            GameMap::Other(name) => name,
        }
    }
}

impl std::fmt::Display for GameMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GameMap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase();
        match name.as_str() {
            "" => Err("map name must not be empty".to_string()),
            "ERANGEL" => Ok(GameMap::Erangel),
            "MIRAMAR" => Ok(GameMap::Miramar),
            "SANHOK" => Ok(GameMap::Sanhok),
            "VIKENDI" => Ok(GameMap::Vikendi),
            "LIVIK" => Ok(GameMap::Livik),
            _ => Ok(GameMap::Other(name)),
        }
    }
}

impl TryFrom<String> for GameMap {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GameMap> for String {
    fn from(map: GameMap) -> Self {
        map.as_str().to_string()
    }
}

/// Tournament (a paid match)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub entry_fee: Decimal,
    pub prize: Decimal,
    pub per_kill: Decimal,
    pub map: GameMap,
    pub mode: String,
    pub max_team_join: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub banner_image: Option<String>,
    pub host_name: String,
    pub host_link: Option<String>,
    pub status: TournamentStatus,
    pub created_by: UserId,
    /// Teams registered so far
    pub teams: Vec<TeamId>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn has_team(&self, team_id: TeamId) -> bool {
        self.teams.contains(&team_id)
    }

    pub fn is_full(&self) -> bool {
        self.teams.len() >= self.max_team_join.max(0) as usize
    }
}

/// Tournament creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
    pub entry_fee: Decimal,
    pub prize: Decimal,
    pub per_kill: Decimal,
    pub map: GameMap,
    pub mode: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub banner_image: Option<String>,
    pub host_name: String,
    pub host_link: Option<String>,
    pub created_by: UserId,
}

/// Validated tournament row ready for insertion
#[derive(Debug, Clone)]
pub struct NewTournament {
    pub request: CreateTournamentRequest,
    pub max_team_join: i32,
}

/// Tournaments grouped by lifecycle stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TournamentListing {
    pub upcoming: Vec<Tournament>,
    pub ongoing: Vec<Tournament>,
    pub completed: Vec<Tournament>,
}
