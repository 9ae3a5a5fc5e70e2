//! Match join workflow: identity, tournament, team, then the ledger.
//!
//! Team capacity is enforced by the ledger commit itself, under the same
//! storage transaction that registers the team.

use super::errors::{EntryError, EntryResult};
use crate::auth::IdentityService;
use crate::team::{TeamId, TeamManager};
use crate::tournament::{TournamentId, TournamentManager, TournamentStatus};
use crate::wallet::{JoinRequest, LedgerError, LedgerReceipt, WalletLedger};
use std::sync::Arc;

/// Match entry service
#[derive(Clone)]
pub struct MatchEntryService {
    identity: Arc<dyn IdentityService>,
    teams: TeamManager,
    tournaments: TournamentManager,
    ledger: WalletLedger,
}

impl MatchEntryService {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        teams: TeamManager,
        tournaments: TournamentManager,
        ledger: WalletLedger,
    ) -> Self {
        Self {
            identity,
            teams,
            tournaments,
            ledger,
        }
    }

    /// Join a match with a team, paying the tournament's entry fee
    ///
    /// # Arguments
    ///
    /// * `token` - Identity token presented by the caller, if any
    /// * `tournament_id` - Tournament to join
    /// * `team_id` - Team the caller plays for
    ///
    /// # Errors
    ///
    /// * `EntryError::Identity` - Missing or invalid token
    /// * `EntryError::Tournament` - Tournament not found
    /// * `EntryError::RegistrationClosed` - Tournament already started or finished
    /// * `EntryError::Team` - Team not found or caller is not a member
    /// * `EntryError::TournamentFull` - No room for another team
    /// * `EntryError::Ledger` - Already joined, insufficient funds or storage fault
    pub async fn join_match(
        &self,
        token: Option<&str>,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> EntryResult<LedgerReceipt> {
        let identity = self.identity.verify(token)?;

        let tournament = self.tournaments.tournament(tournament_id).await?;
        if tournament.status != TournamentStatus::Upcoming {
            return Err(EntryError::RegistrationClosed {
                tournament_id,
                status: tournament.status,
            });
        }

        self.teams.verify_membership(team_id, identity.user_id).await?;

        let receipt = self
            .ledger
            .join_tournament(JoinRequest {
                user_id: identity.user_id,
                tournament_id,
                team_id,
                entry_fee: tournament.entry_fee,
            })
            .await
            .map_err(|err| match err {
                LedgerError::TournamentFull(id) => EntryError::TournamentFull(id),
                other => EntryError::Ledger(other),
            })?;

        Ok(receipt)
    }
}
