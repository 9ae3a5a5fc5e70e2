//! Short shareable codes for referrals and team invites.
//!
//! Codes are produced by the operation that creates the record, never by a
//! storage hook. Uniqueness is enforced by the store; callers retry on a
//! collision.

use rand::{Rng, distr::Alphanumeric};

/// Length of referral and team codes
pub const CODE_LENGTH: usize = 8;

/// Attempts made before a code collision is reported to the caller
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Random uppercase alphanumeric code
pub fn generate_code(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

/// Referral code assigned at registration
pub fn referral_code() -> String {
    generate_code(CODE_LENGTH)
}

/// Invite code assigned at team creation
pub fn team_code() -> String {
    generate_code(CODE_LENGTH)
}
