//! Authentication module providing user registration, login and identity checks.
//!
//! This module implements:
//! - Argon2id password hashing with server-side pepper
//! - Referral codes generated explicitly at registration
//! - JWT identity tokens (7-day expiry)
//! - [`IdentityService`], the single identity check used by workflows
//!
//! ## Example
//!
//! ```no_run
//! use squad_arena::auth::{AuthManager, JwtIdentity, RegisterRequest};
//! use squad_arena::db::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let auth = AuthManager::new(
//!         store,
//!         "secret_pepper".to_string(),
//!         JwtIdentity::new("jwt_secret".to_string()),
//!     );
//!
//!     let user = auth
//!         .register(RegisterRequest {
//!             email: "player@example.com".to_string(),
//!             password: "SecurePass123".to_string(),
//!             username: "player1".to_string(),
//!             mobile: None,
//!             referred_by: None,
//!         })
//!         .await?;
//!     println!("Registered user {} with referral code {}", user.username, user.referral_code);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod identity;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use identity::{IdentityService, JwtIdentity};
pub use manager::AuthManager;
pub use models::{
    Credentials, Identity, IdentityClaims, LoginRequest, NewUser, ProfileUpdate, RegisterRequest,
    User, UserId,
};
