//! Team manager: creation, invites by code and membership checks.

use super::{
    errors::{TeamError, TeamResult},
    models::{
        CreateTeamRequest, DEFAULT_TEAM_LOGO, NewTeam, Team, TeamId, TeamMember, TeamMembership,
        TeamRole,
    },
};
use crate::auth::UserId;
use crate::codes::{self, MAX_CODE_ATTEMPTS};
use crate::db::TeamRepository;
use std::sync::Arc;

const MAX_TEAM_NAME_LEN: usize = 32;

/// Team manager
#[derive(Clone)]
pub struct TeamManager {
    teams: Arc<dyn TeamRepository>,
}

impl TeamManager {
    pub fn new(teams: Arc<dyn TeamRepository>) -> Self {
        Self { teams }
    }

    /// Create a team led by `creator`
    ///
    /// # Errors
    ///
    /// * `TeamError::InvalidName` - Empty or overlong name
    /// * `TeamError::UserNotFound` - Creator does not exist
    pub async fn create_team(&self, creator: UserId, request: CreateTeamRequest) -> TeamResult<Team> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(TeamError::InvalidName("Name must not be empty".to_string()));
        }
        if name.chars().count() > MAX_TEAM_NAME_LEN {
            return Err(TeamError::InvalidName(format!(
                "Name must be at most {MAX_TEAM_NAME_LEN} characters"
            )));
        }

        let logo = request
            .logo
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEAM_LOGO.to_string());

        let leader = TeamMember {
            user_id: creator,
            in_game_name: request.in_game_name,
            in_game_player_id: request.in_game_player_id,
            role: TeamRole::Leader,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let new_team = NewTeam {
                name: name.to_string(),
                logo: logo.clone(),
                code: codes::team_code(),
                leader: leader.clone(),
            };

            match self.teams.create_team(&new_team).await {
                Ok(team) => {
                    log::info!("User {creator} created team {} ({})", team.id, team.code);
                    return Ok(team);
                }
                Err(TeamError::CodeTaken) if attempt < MAX_CODE_ATTEMPTS => {
                    log::debug!("Team code collision, regenerating");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Join a team using its invite code
    ///
    /// # Errors
    ///
    /// * `TeamError::NotFound` - Unknown code
    /// * `TeamError::AlreadyMember` - User is already in the team
    pub async fn join_team(
        &self,
        user_id: UserId,
        code: &str,
        in_game_name: Option<String>,
        in_game_player_id: Option<String>,
    ) -> TeamResult<Team> {
        let team = self.team_by_code(code).await?;
        if team.is_member(user_id) {
            return Err(TeamError::AlreadyMember);
        }

        let member = TeamMember {
            user_id,
            in_game_name,
            in_game_player_id,
            role: TeamRole::Member,
        };
        let team = self.teams.add_member(team.id, &member).await?;
        log::info!("User {user_id} joined team {}", team.id);
        Ok(team)
    }

    /// Look up a team by invite code (case-insensitive)
    pub async fn team_by_code(&self, code: &str) -> TeamResult<Team> {
        self.teams
            .find_team_by_code(&code.trim().to_ascii_uppercase())
            .await?
            .ok_or(TeamError::NotFound)
    }

    pub async fn team(&self, team_id: TeamId) -> TeamResult<Team> {
        self.teams
            .find_team(team_id)
            .await?
            .ok_or(TeamError::NotFound)
    }

    /// Teams created by a user
    pub async fn teams_created_by(&self, user_id: UserId) -> TeamResult<Vec<Team>> {
        self.teams.teams_created_by(user_id).await
    }

    /// Confirm a user belongs to a team
    ///
    /// # Errors
    ///
    /// * `TeamError::NotFound` - Team does not exist
    /// * `TeamError::NotAMember` - User is not in the team
    pub async fn verify_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> TeamResult<TeamMembership> {
        let team = self.team(team_id).await?;
        if !team.is_member(user_id) {
            return Err(TeamError::NotAMember { user_id, team_id });
        }

        Ok(TeamMembership {
            team_id,
            members: team.members.iter().map(|m| m.user_id).collect(),
        })
    }
}
