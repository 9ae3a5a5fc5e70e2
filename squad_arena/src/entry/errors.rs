//! Entry workflow error types.

use thiserror::Error;

use crate::auth::AuthError;
use crate::team::TeamError;
use crate::tournament::{TournamentError, TournamentId, TournamentStatus};
use crate::wallet::LedgerError;

/// Errors surfaced while joining a match
#[derive(Debug, Error)]
pub enum EntryError {
    #[error(transparent)]
    Identity(#[from] AuthError),

    #[error(transparent)]
    Tournament(#[from] TournamentError),

    #[error(transparent)]
    Team(#[from] TeamError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Tournament {tournament_id} is {status} and no longer accepts teams")]
    RegistrationClosed {
        tournament_id: TournamentId,
        status: TournamentStatus,
    },

    #[error("Tournament {0} is full")]
    TournamentFull(TournamentId),
}

impl EntryError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            EntryError::Identity(err) => err.client_message(),
            EntryError::Tournament(err) => err.client_message(),
            EntryError::Team(err) => err.client_message(),
            EntryError::Ledger(err) => err.client_message(),
            _ => self.to_string(),
        }
    }
}

pub type EntryResult<T> = Result<T, EntryError>;
