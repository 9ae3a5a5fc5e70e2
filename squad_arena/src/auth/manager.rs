//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    identity::JwtIdentity,
    models::{LoginRequest, NewUser, ProfileUpdate, RegisterRequest, User, UserId},
};
use crate::codes::{self, MAX_CODE_ATTEMPTS};
use crate::db::UserRepository;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    pepper: String,
    identity: JwtIdentity,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - User storage
    /// * `pepper` - Server-side pepper for password hashing
    /// * `identity` - Token issuer used on login
    pub fn new(users: Arc<dyn UserRepository>, pepper: String, identity: JwtIdentity) -> Self {
        Self {
            users,
            pepper,
            identity,
        }
    }

    /// Register a new user with empty wallets
    ///
    /// # Errors
    ///
    /// * `AuthError::UsernameTaken` - Username already exists
    /// * `AuthError::EmailTaken` - Email already exists
    /// * `AuthError::MobileTaken` - Mobile number already exists
    /// * `AuthError::InvalidUsername` - Username format invalid
    /// * `AuthError::InvalidEmail` - Email format invalid
    /// * `AuthError::WeakPassword` - Password too weak
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        validate_username(&request.username)?;
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        let password_hash = self.hash_password(&request.password)?;
        let referred_by = request
            .referred_by
            .map(|code| code.trim().to_ascii_uppercase())
            .filter(|code| !code.is_empty());

        let mut attempt = 0;
        loop {
            attempt += 1;
            let new_user = NewUser {
                username: request.username.clone(),
                email: request.email.trim().to_ascii_lowercase(),
                mobile: request.mobile.clone(),
                password_hash: password_hash.clone(),
                referral_code: codes::referral_code(),
                referred_by: referred_by.clone(),
            };

            match self.users.create_user(&new_user).await {
                Ok(user) => {
                    log::info!("Registered user {} ({})", user.id, user.username);
                    return Ok(user);
                }
                Err(AuthError::ReferralCodeTaken) if attempt < MAX_CODE_ATTEMPTS => {
                    log::debug!("Referral code collision, regenerating");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Login a user
    ///
    /// # Returns
    ///
    /// * `AuthResult<(User, String)>` - User and identity token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown email or incorrect password
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, String)> {
        let email = request.email.trim().to_ascii_lowercase();
        let credentials = self
            .users
            .find_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.verify_password(&request.password, &credentials.password_hash)?;

        let token = self.identity.issue(&credentials.user)?;
        Ok((credentials.user, token))
    }

    /// Get a user's profile
    pub async fn profile(&self, user_id: UserId) -> AuthResult<User> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Update profile fields; absent fields keep their current value
    pub async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> AuthResult<User> {
        self.users.update_profile(user_id, &update).await
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);

        Ok(Argon2::default()
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }
}

fn validate_username(username: &str) -> AuthResult<()> {
    let len = username.chars().count();
    if !(3..=20).contains(&len) {
        return Err(AuthError::InvalidUsername(
            "Username must be 3-20 characters".to_string(),
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AuthError::InvalidUsername(
            "Username may only contain letters, digits and underscores".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> AuthResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') =>
        {
            Ok(())
        }
        _ => Err(AuthError::InvalidEmail),
    }
}

fn validate_password(password: &str) -> AuthResult<()> {
    if password.len() < 8 {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err(AuthError::WeakPassword(
            "Password must contain letters and digits".to_string(),
        ));
    }
    Ok(())
}
