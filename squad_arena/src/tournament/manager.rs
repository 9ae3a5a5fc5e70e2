//! Tournament manager for creating, listing and advancing tournaments.

use super::{
    errors::{TournamentError, TournamentResult},
    models::{
        CreateTournamentRequest, NewTournament, Tournament, TournamentId, TournamentListing,
        TournamentStatus,
    },
};
use crate::db::TournamentRepository;
use crate::wallet::Participation;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    tournaments: Arc<dyn TournamentRepository>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(tournaments: Arc<dyn TournamentRepository>) -> Self {
        Self { tournaments }
    }

    /// Create a new tournament; capacity follows the map
    pub async fn create_tournament(
        &self,
        request: CreateTournamentRequest,
    ) -> TournamentResult<Tournament> {
        validate(&request)?;

        let new_tournament = NewTournament {
            max_team_join: request.map.max_teams(),
            request,
        };
        let tournament = self.tournaments.create_tournament(&new_tournament).await?;

        log::info!(
            "Created tournament {} '{}' on {} (entry fee {}, {} teams max)",
            tournament.id,
            tournament.name,
            tournament.map,
            tournament.entry_fee,
            tournament.max_team_join
        );
        Ok(tournament)
    }

    /// Get tournament with its registered teams
    pub async fn tournament(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        self.tournaments
            .find_tournament(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))
    }

    /// All tournaments grouped by status
    pub async fn listing(&self) -> TournamentResult<TournamentListing> {
        Ok(TournamentListing {
            upcoming: self.tournaments.tournaments_by_status(TournamentStatus::Upcoming).await?,
            ongoing: self.tournaments.tournaments_by_status(TournamentStatus::Ongoing).await?,
            completed: self.tournaments.tournaments_by_status(TournamentStatus::Completed).await?,
        })
    }

    /// Participations recorded for a tournament
    pub async fn participants(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Participation>> {
        self.tournament(tournament_id).await?;
        self.tournaments.participants(tournament_id).await
    }

    /// Close registration and start the match
    pub async fn start_tournament(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        self.transition(tournament_id, TournamentStatus::Upcoming, TournamentStatus::Ongoing)
            .await
    }

    /// Finish the match
    pub async fn complete_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Tournament> {
        self.transition(tournament_id, TournamentStatus::Ongoing, TournamentStatus::Completed)
            .await
    }

    async fn transition(
        &self,
        tournament_id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> TournamentResult<Tournament> {
        let updated = self
            .tournaments
            .update_status(tournament_id, from, to)
            .await?;

        if updated {
            log::info!("Tournament {tournament_id} moved from {from} to {to}");
            return self.tournament(tournament_id).await;
        }

        // Conditional update missed: report the state actually found.
        let current = self.tournament(tournament_id).await?;
        Err(TournamentError::InvalidTransition {
            from: current.status,
            to,
        })
    }
}

fn validate(request: &CreateTournamentRequest) -> TournamentResult<()> {
    if request.name.trim().is_empty() {
        return Err(TournamentError::InvalidConfig("Name is required".to_string()));
    }
    if request.host_name.trim().is_empty() {
        return Err(TournamentError::InvalidConfig("Host name is required".to_string()));
    }
    if request.mode.trim().is_empty() {
        return Err(TournamentError::InvalidConfig("Mode is required".to_string()));
    }
    for (field, amount) in [
        ("Entry fee", request.entry_fee),
        ("Prize", request.prize),
        ("Per kill", request.per_kill),
    ] {
        if amount < Decimal::ZERO {
            return Err(TournamentError::InvalidConfig(format!(
                "{field} must not be negative"
            )));
        }
    }
    if request.end_date < request.start_date {
        return Err(TournamentError::InvalidConfig(
            "End date must not be before start date".to_string(),
        ));
    }
    Ok(())
}
