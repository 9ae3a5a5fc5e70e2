//! In-memory implementation of the repository traits.
//!
//! One async mutex guards the whole state, so every operation sees and
//! commits a consistent snapshot. Each mutating method runs all of its
//! checks before touching anything, matching the rollback behaviour of
//! [`super::PgStore`].

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::repository::{LedgerRepository, TeamRepository, TournamentRepository, UserRepository};
use crate::auth::{AuthError, AuthResult, Credentials, NewUser, ProfileUpdate, User, UserId};
use crate::codes;
use crate::team::{NewTeam, Team, TeamError, TeamId, TeamMember, TeamResult};
use crate::tournament::{
    NewTournament, Tournament, TournamentError, TournamentId, TournamentResult, TournamentStatus,
};
use crate::wallet::{
    EntryDirection, Entity, JoinRequest, LedgerError, LedgerReceipt, LedgerResult, NewTransaction,
    Participation, TransactionId, TransactionKind, TransactionRecord, WalletAllocation,
    WalletBalances, WalletKind, plan_join_debit,
};

struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct MemoryState {
    next_user_id: UserId,
    next_team_id: TeamId,
    next_tournament_id: TournamentId,
    next_transaction_id: TransactionId,
    users: HashMap<UserId, StoredUser>,
    teams: HashMap<TeamId, Team>,
    tournaments: HashMap<TournamentId, Tournament>,
    participants: Vec<Participation>,
    joined: HashSet<(UserId, TournamentId)>,
    transactions: Vec<TransactionRecord>,
}

impl MemoryState {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn record(&mut self, new: NewTransaction) -> TransactionRecord {
        let record = TransactionRecord {
            id: Self::next_id(&mut self.next_transaction_id),
            reference: new.reference,
            user_id: new.user_id,
            tournament_id: new.tournament_id,
            amount: new.amount,
            direction: new.direction,
            kind: new.kind,
            allocations: new.allocations,
            created_at: Utc::now(),
        };
        self.transactions.push(record.clone());
        record
    }

    fn wallet_mut(&mut self, user_id: UserId) -> LedgerResult<&mut WalletBalances> {
        self.users
            .get_mut(&user_id)
            .map(|stored| &mut stored.user.wallet)
            .ok_or(LedgerError::NotFound(Entity::User(user_id)))
    }
}

/// Repository kept entirely in process memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user with the given balances, bypassing registration.
    ///
    /// The email is derived from the username and the account has no
    /// password, so it cannot log in.
    pub async fn seed_user(&self, username: &str, balances: WalletBalances) -> User {
        let mut state = self.state.lock().await;
        let id = MemoryState::next_id(&mut state.next_user_id);
        let user = User {
            id,
            username: username.to_string(),
            email: format!("{}@seed.local", username.to_lowercase()),
            mobile: None,
            referral_code: codes::referral_code(),
            referred_by: None,
            in_game_name: None,
            in_game_player_id: None,
            wallet: balances,
            created_at: Utc::now(),
        };
        state.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash: String::new(),
            },
        );
        user
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, new: &NewUser) -> AuthResult<User> {
        let mut state = self.state.lock().await;

        for stored in state.users.values() {
            let existing = &stored.user;
            if existing.username == new.username {
                return Err(AuthError::UsernameTaken);
            }
            if existing.email == new.email {
                return Err(AuthError::EmailTaken);
            }
            if new.mobile.is_some() && existing.mobile == new.mobile {
                return Err(AuthError::MobileTaken);
            }
            if existing.referral_code == new.referral_code {
                return Err(AuthError::ReferralCodeTaken);
            }
        }

        let id = MemoryState::next_id(&mut state.next_user_id);
        let user = User {
            id,
            username: new.username.clone(),
            email: new.email.clone(),
            mobile: new.mobile.clone(),
            referral_code: new.referral_code.clone(),
            referred_by: new.referred_by.clone(),
            in_game_name: None,
            in_game_player_id: None,
            wallet: WalletBalances::default(),
            created_at: Utc::now(),
        };
        state.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash: new.password_hash.clone(),
            },
        );
        Ok(user)
    }

    async fn find_user(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&user_id).map(|stored| stored.user.clone()))
    }

    async fn find_credentials(&self, email: &str) -> AuthResult<Option<Credentials>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.email == email)
            .map(|stored| Credentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> AuthResult<User> {
        let mut state = self.state.lock().await;

        if let Some(mobile) = &update.mobile {
            let taken = state.users.values().any(|stored| {
                stored.user.id != user_id && stored.user.mobile.as_deref() == Some(mobile.as_str())
            });
            if taken {
                return Err(AuthError::MobileTaken);
            }
        }

        let stored = state.users.get_mut(&user_id).ok_or(AuthError::UserNotFound)?;
        let user = &mut stored.user;
        if let Some(mobile) = &update.mobile {
            user.mobile = Some(mobile.clone());
        }
        if let Some(name) = &update.in_game_name {
            user.in_game_name = Some(name.clone());
        }
        if let Some(player_id) = &update.in_game_player_id {
            user.in_game_player_id = Some(player_id.clone());
        }
        Ok(user.clone())
    }
}

#[async_trait]
impl TeamRepository for MemoryStore {
    async fn create_team(&self, new: &NewTeam) -> TeamResult<Team> {
        let mut state = self.state.lock().await;

        if !state.users.contains_key(&new.leader.user_id) {
            return Err(TeamError::UserNotFound(new.leader.user_id));
        }
        if state.teams.values().any(|team| team.code == new.code) {
            return Err(TeamError::CodeTaken);
        }

        let id = MemoryState::next_id(&mut state.next_team_id);
        let team = Team {
            id,
            name: new.name.clone(),
            logo: new.logo.clone(),
            code: new.code.clone(),
            created_by: new.leader.user_id,
            members: vec![new.leader.clone()],
            created_at: Utc::now(),
        };
        state.teams.insert(id, team.clone());
        Ok(team)
    }

    async fn find_team(&self, team_id: TeamId) -> TeamResult<Option<Team>> {
        let state = self.state.lock().await;
        Ok(state.teams.get(&team_id).cloned())
    }

    async fn find_team_by_code(&self, code: &str) -> TeamResult<Option<Team>> {
        let state = self.state.lock().await;
        Ok(state.teams.values().find(|team| team.code == code).cloned())
    }

    async fn teams_created_by(&self, user_id: UserId) -> TeamResult<Vec<Team>> {
        let state = self.state.lock().await;
        let mut teams: Vec<Team> = state
            .teams
            .values()
            .filter(|team| team.created_by == user_id)
            .cloned()
            .collect();
        teams.sort_by_key(|team| team.id);
        Ok(teams)
    }

    async fn add_member(&self, team_id: TeamId, member: &TeamMember) -> TeamResult<Team> {
        let mut state = self.state.lock().await;

        if !state.users.contains_key(&member.user_id) {
            return Err(TeamError::UserNotFound(member.user_id));
        }
        let team = state.teams.get_mut(&team_id).ok_or(TeamError::NotFound)?;
        if team.is_member(member.user_id) {
            return Err(TeamError::AlreadyMember);
        }
        team.members.push(member.clone());
        Ok(team.clone())
    }
}

#[async_trait]
impl TournamentRepository for MemoryStore {
    async fn create_tournament(&self, new: &NewTournament) -> TournamentResult<Tournament> {
        let mut state = self.state.lock().await;
        let request = &new.request;

        if !state.users.contains_key(&request.created_by) {
            return Err(TournamentError::CreatorNotFound(request.created_by));
        }

        let id = MemoryState::next_id(&mut state.next_tournament_id);
        let tournament = Tournament {
            id,
            name: request.name.clone(),
            entry_fee: request.entry_fee,
            prize: request.prize,
            per_kill: request.per_kill,
            map: request.map.clone(),
            mode: request.mode.clone(),
            max_team_join: new.max_team_join,
            start_date: request.start_date,
            end_date: request.end_date,
            banner_image: request.banner_image.clone(),
            host_name: request.host_name.clone(),
            host_link: request.host_link.clone(),
            status: TournamentStatus::Upcoming,
            created_by: request.created_by,
            teams: Vec::new(),
            created_at: Utc::now(),
        };
        state.tournaments.insert(id, tournament.clone());
        Ok(tournament)
    }

    async fn find_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Option<Tournament>> {
        let state = self.state.lock().await;
        Ok(state.tournaments.get(&tournament_id).cloned())
    }

    async fn tournaments_by_status(
        &self,
        status: TournamentStatus,
    ) -> TournamentResult<Vec<Tournament>> {
        let state = self.state.lock().await;
        let mut tournaments: Vec<Tournament> = state
            .tournaments
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        tournaments.sort_by_key(|t| (t.start_date, t.id));
        Ok(tournaments)
    }

    async fn update_status(
        &self,
        tournament_id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> TournamentResult<bool> {
        let mut state = self.state.lock().await;
        match state.tournaments.get_mut(&tournament_id) {
            Some(tournament) if tournament.status == from => {
                tournament.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn participants(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Participation>> {
        let state = self.state.lock().await;
        Ok(state
            .participants
            .iter()
            .filter(|p| p.tournament_id == tournament_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LedgerRepository for MemoryStore {
    async fn balances(&self, user_id: UserId) -> LedgerResult<Option<WalletBalances>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&user_id).map(|stored| stored.user.wallet))
    }

    async fn commit_join(&self, request: &JoinRequest) -> LedgerResult<LedgerReceipt> {
        let mut state = self.state.lock().await;

        let snapshot = *state.wallet_mut(request.user_id)?;
        if state.joined.contains(&(request.user_id, request.tournament_id)) {
            return Err(LedgerError::AlreadyJoined {
                user_id: request.user_id,
                tournament_id: request.tournament_id,
            });
        }
        let debit = plan_join_debit(&snapshot, request.entry_fee)?;
        let tournament = state
            .tournaments
            .get(&request.tournament_id)
            .ok_or(LedgerError::NotFound(Entity::Tournament(request.tournament_id)))?;
        if !tournament.has_team(request.team_id) && tournament.is_full() {
            return Err(LedgerError::TournamentFull(request.tournament_id));
        }
        if !state.teams.contains_key(&request.team_id) {
            return Err(LedgerError::NotFound(Entity::Team(request.team_id)));
        }

        let balances = debit.apply_to(&snapshot)?;
        *state.wallet_mut(request.user_id)? = balances;

        let transaction = state.record(NewTransaction {
            reference: Uuid::new_v4(),
            user_id: request.user_id,
            tournament_id: Some(request.tournament_id),
            amount: request.entry_fee,
            direction: EntryDirection::Debit,
            kind: TransactionKind::TournamentEntry,
            allocations: debit.allocations(),
        });

        state.joined.insert((request.user_id, request.tournament_id));
        state.participants.push(Participation {
            user_id: request.user_id,
            tournament_id: request.tournament_id,
            team_id: request.team_id,
            joined_at: transaction.created_at,
        });
        if let Some(tournament) = state.tournaments.get_mut(&request.tournament_id) {
            if !tournament.has_team(request.team_id) {
                tournament.teams.push(request.team_id);
            }
        }

        Ok(LedgerReceipt {
            transaction,
            balances,
        })
    }

    async fn credit_deposit(
        &self,
        user_id: UserId,
        amount: Decimal,
    ) -> LedgerResult<LedgerReceipt> {
        let mut state = self.state.lock().await;

        let wallet = state.wallet_mut(user_id)?;
        wallet.deposit = wallet
            .deposit
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount(amount))?;
        let balances = *wallet;

        let transaction = state.record(NewTransaction {
            reference: Uuid::new_v4(),
            user_id,
            tournament_id: None,
            amount,
            direction: EntryDirection::Credit,
            kind: TransactionKind::Deposit,
            allocations: vec![WalletAllocation::new(WalletKind::Deposit, amount)],
        });

        Ok(LedgerReceipt {
            transaction,
            balances,
        })
    }

    async fn debit_winnings(
        &self,
        user_id: UserId,
        amount: Decimal,
    ) -> LedgerResult<LedgerReceipt> {
        let mut state = self.state.lock().await;

        let wallet = state.wallet_mut(user_id)?;
        if wallet.winnings < amount {
            return Err(LedgerError::InsufficientFunds {
                available: wallet.winnings,
                required: amount,
            });
        }
        wallet.winnings -= amount;
        let balances = *wallet;

        let transaction = state.record(NewTransaction {
            reference: Uuid::new_v4(),
            user_id,
            tournament_id: None,
            amount,
            direction: EntryDirection::Debit,
            kind: TransactionKind::Withdrawal,
            allocations: vec![WalletAllocation::new(WalletKind::Winnings, amount)],
        });

        Ok(LedgerReceipt {
            transaction,
            balances,
        })
    }

    async fn transactions(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> LedgerResult<Vec<TransactionRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}
