//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wallet::WalletBalances;

/// User ID type
pub type UserId = i64;

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub mobile: Option<String>,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub in_game_name: Option<String>,
    pub in_game_player_id: Option<String>,
    pub wallet: WalletBalances,
    pub created_at: DateTime<Utc>,
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub mobile: Option<String>,
    pub referred_by: Option<String>,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile fields a user may change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub mobile: Option<String>,
    pub in_game_name: Option<String>,
    pub in_game_player_id: Option<String>,
}

/// Validated user row ready for insertion
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub mobile: Option<String>,
    pub password_hash: String,
    pub referral_code: String,
    pub referred_by: Option<String>,
}

/// Stored credentials looked up at login
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

/// JWT claims carried by an identity token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: UserId,
    pub email: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Verified caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub username: String,
}

impl From<IdentityClaims> for Identity {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            username: claims.username,
        }
    }
}
