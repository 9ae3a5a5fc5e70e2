//! Team error types.

use thiserror::Error;

use super::models::TeamId;
use crate::auth::UserId;

/// Team errors
#[derive(Debug, Error)]
pub enum TeamError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Team not found")]
    NotFound,

    #[error("User {user_id} is not a member of team {team_id}")]
    NotAMember { user_id: UserId, team_id: TeamId },

    #[error("User is already a member of this team")]
    AlreadyMember,

    /// Creator does not exist
    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Invalid team name: {0}")]
    InvalidName(String),

    /// Generated team code collided with an existing one
    #[error("Team code already exists")]
    CodeTaken,
}

impl TeamError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            TeamError::Database(_) | TeamError::CodeTaken => "Internal server error".to_string(),
            TeamError::NotAMember { .. } => "User is not a member of this team".to_string(),
            TeamError::UserNotFound(_) => "User not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for team operations
pub type TeamResult<T> = Result<T, TeamError>;
