//! Identity assertion: one verification step at the workflow boundary.

use super::{
    errors::{AuthError, AuthResult},
    models::{Identity, IdentityClaims, User},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

/// Turns a presented token into a typed identity
pub trait IdentityService: Send + Sync {
    /// Verify a token
    ///
    /// # Errors
    ///
    /// * `AuthError::Unauthorized` - No token presented
    /// * `AuthError::InvalidToken` - Bad signature, malformed or expired token
    fn verify(&self, token: Option<&str>) -> AuthResult<Identity>;
}

/// HS256 JWT identity tokens
#[derive(Clone)]
pub struct JwtIdentity {
    secret: String,
    token_duration: Duration,
}

impl JwtIdentity {
    /// Tokens are valid for seven days
    pub fn new(secret: String) -> Self {
        Self::with_duration(secret, Duration::days(7))
    }

    pub fn with_duration(secret: String, token_duration: Duration) -> Self {
        Self {
            secret,
            token_duration,
        }
    }

    /// Issue a token for a user
    pub fn issue(&self, user: &User) -> AuthResult<String> {
        let now = Utc::now();
        let claims = IdentityClaims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            exp: (now + self.token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }
}

impl IdentityService for JwtIdentity {
    fn verify(&self, token: Option<&str>) -> AuthResult<Identity> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthorized)?;

        let token_data = decode::<IdentityClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims.into())
    }
}
