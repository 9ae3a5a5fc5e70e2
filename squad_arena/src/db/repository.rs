//! Repository trait definitions for testability and dependency injection.
//!
//! Managers depend on these traits rather than on a pool, so the same
//! business rules run against [`super::PgStore`] in production and
//! [`super::MemoryStore`] in tests. Every mutating ledger method is one
//! storage transaction: it either commits completely or leaves no trace.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::auth::{AuthResult, Credentials, NewUser, ProfileUpdate, User, UserId};
use crate::team::{NewTeam, Team, TeamId, TeamMember, TeamResult};
use crate::tournament::{NewTournament, Tournament, TournamentId, TournamentResult, TournamentStatus};
use crate::wallet::{
    JoinRequest, LedgerReceipt, LedgerResult, Participation, TransactionRecord, WalletBalances,
};

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user with zeroed wallets
    ///
    /// Unique conflicts map to `UsernameTaken`, `EmailTaken`, `MobileTaken`
    /// or `ReferralCodeTaken`.
    async fn create_user(&self, user: &NewUser) -> AuthResult<User>;

    /// Find user by ID
    async fn find_user(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Find user and password hash by (lowercased) email
    async fn find_credentials(&self, email: &str) -> AuthResult<Option<Credentials>>;

    /// Apply profile changes, keeping fields that are `None`
    async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> AuthResult<User>;
}

/// Trait for team repository operations
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Insert a team and its leader; a code conflict maps to `CodeTaken`
    async fn create_team(&self, team: &NewTeam) -> TeamResult<Team>;

    async fn find_team(&self, team_id: TeamId) -> TeamResult<Option<Team>>;

    async fn find_team_by_code(&self, code: &str) -> TeamResult<Option<Team>>;

    async fn teams_created_by(&self, user_id: UserId) -> TeamResult<Vec<Team>>;

    /// Add a member; an existing membership maps to `AlreadyMember`
    async fn add_member(&self, team_id: TeamId, member: &TeamMember) -> TeamResult<Team>;
}

/// Trait for tournament repository operations
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    async fn create_tournament(&self, tournament: &NewTournament) -> TournamentResult<Tournament>;

    async fn find_tournament(&self, tournament_id: TournamentId)
    -> TournamentResult<Option<Tournament>>;

    /// Tournaments in a status, earliest start first
    async fn tournaments_by_status(
        &self,
        status: TournamentStatus,
    ) -> TournamentResult<Vec<Tournament>>;

    /// Move `from` → `to`; returns false when the tournament is missing or not in `from`
    async fn update_status(
        &self,
        tournament_id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> TournamentResult<bool>;

    async fn participants(&self, tournament_id: TournamentId)
    -> TournamentResult<Vec<Participation>>;
}

/// Trait for ledger repository operations
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Current balances, `None` when the user does not exist
    async fn balances(&self, user_id: UserId) -> LedgerResult<Option<WalletBalances>>;

    /// Plan and apply an entry-fee debit under the user's lock.
    ///
    /// Implementations must, atomically: reject an existing participation
    /// with `AlreadyJoined`, run [`crate::wallet::plan_join_debit`] on the
    /// locked balances, reject a team new to a full tournament with
    /// `TournamentFull` while holding the tournament's lock, decrement the
    /// three wallets, record the transaction with its allocations, insert
    /// the participation and add the team to the tournament.
    async fn commit_join(&self, request: &JoinRequest) -> LedgerResult<LedgerReceipt>;

    /// Credit the deposit wallet and record a deposit transaction
    async fn credit_deposit(&self, user_id: UserId, amount: Decimal)
    -> LedgerResult<LedgerReceipt>;

    /// Debit the winnings wallet if it covers `amount` and record a withdrawal
    async fn debit_winnings(&self, user_id: UserId, amount: Decimal)
    -> LedgerResult<LedgerReceipt>;

    /// Transactions for a user, newest first
    async fn transactions(&self, user_id: UserId, limit: i64)
    -> LedgerResult<Vec<TransactionRecord>>;
}
