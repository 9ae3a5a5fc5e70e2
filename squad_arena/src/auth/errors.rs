//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Mobile number already exists")]
    MobileTaken,

    /// Generated referral code collided with an existing one
    #[error("Referral code already exists")]
    ReferralCodeTaken,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// No identity token presented
    #[error("Unauthorized, no token provided")]
    Unauthorized,

    /// Token failed signature or expiry checks
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database and JWT errors are sanitized to prevent information disclosure
    /// about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::HashingFailed => {
                "Internal server error".to_string()
            }
            AuthError::InvalidToken(_) => "Invalid or expired token".to_string(),
            AuthError::UsernameTaken
            | AuthError::EmailTaken
            | AuthError::MobileTaken
            | AuthError::ReferralCodeTaken => {
                "Email, username, mobile, or referral code already exists".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
