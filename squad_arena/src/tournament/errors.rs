//! Tournament error types.

use thiserror::Error;

use super::models::{TournamentId, TournamentStatus};
use crate::auth::UserId;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    /// Organizer does not exist
    #[error("User {0} not found")]
    CreatorNotFound(UserId),

    #[error("Invalid tournament: {0}")]
    InvalidConfig(String),

    #[error("Cannot move tournament from {from} to {to}")]
    InvalidTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },
}

impl TournamentError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Database(_) => "Internal server error".to_string(),
            TournamentError::NotFound(_) => "Match not found".to_string(),
            TournamentError::CreatorNotFound(_) => "User not found".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type TournamentResult<T> = Result<T, TournamentError>;
