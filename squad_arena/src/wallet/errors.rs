//! Ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::auth::UserId;
use crate::team::TeamId;
use crate::tournament::TournamentId;

/// Record that a ledger operation could not find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User(UserId),
    Team(TeamId),
    Tournament(TournamentId),
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::User(id) => write!(f, "user {id}"),
            Entity::Team(id) => write!(f, "team {id}"),
            Entity::Tournament(id) => write!(f, "tournament {id}"),
        }
    }
}

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Storage fault; the surrounding transaction is rolled back
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(Entity),

    #[error("User {user_id} already joined tournament {tournament_id}")]
    AlreadyJoined {
        user_id: UserId,
        tournament_id: TournamentId,
    },

    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
    },

    /// Every team slot is taken and the user's team is not registered yet
    #[error("Tournament {0} is full")]
    TournamentFull(TournamentId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),
}

impl LedgerError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            LedgerError::Database(_) => "Internal server error".to_string(),
            LedgerError::NotFound(Entity::User(_)) => "User not found".to_string(),
            LedgerError::NotFound(Entity::Team(_)) => "Team not found".to_string(),
            LedgerError::NotFound(Entity::Tournament(_)) => "Match not found".to_string(),
            LedgerError::AlreadyJoined { .. } => "User already joined this tournament".to_string(),
            LedgerError::InsufficientFunds { .. } => "Insufficient funds in wallets".to_string(),
            LedgerError::TournamentFull(_) => "Match is full".to_string(),
            LedgerError::InvalidAmount(_) => self.to_string(),
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
