//! PostgreSQL implementation of the repository traits.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use super::repository::{LedgerRepository, TeamRepository, TournamentRepository, UserRepository};
use crate::auth::{AuthError, AuthResult, Credentials, NewUser, ProfileUpdate, User, UserId};
use crate::team::{NewTeam, Team, TeamError, TeamId, TeamMember, TeamResult};
use crate::tournament::{
    NewTournament, Tournament, TournamentError, TournamentId, TournamentResult, TournamentStatus,
};
use crate::wallet::{
    EntryDirection, Entity, JoinRequest, LedgerError, LedgerReceipt, LedgerResult, NewTransaction,
    Participation, TransactionKind, TransactionRecord, WalletAllocation, WalletBalances,
    WalletKind, plan_join_debit,
};

const USER_COLUMNS: &str = "id, username, email, mobile, referral_code, referred_by, \
     in_game_name, in_game_player_id, deposit_wallet, winnings_wallet, bonus_wallet, created_at";

const TEAM_COLUMNS: &str = "id, name, logo, code, created_by, created_at";

const TOURNAMENT_COLUMNS: &str = "id, name, entry_fee, prize, per_kill, map, mode, \
     max_team_join, start_date, end_date, banner_image, host_name, host_link, status, \
     created_by, created_at";

/// Repository backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_members(&self, team_id: TeamId) -> sqlx::Result<Vec<TeamMember>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, in_game_name, in_game_player_id, role
            FROM team_members
            WHERE team_id = $1
            ORDER BY joined_at, user_id
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> sqlx::Result<TeamMember> {
                Ok(TeamMember {
                    user_id: row.try_get("user_id")?,
                    in_game_name: row.try_get("in_game_name")?,
                    in_game_player_id: row.try_get("in_game_player_id")?,
                    role: parse_column(row, "role")?,
                })
            })
            .collect()
    }

    async fn team_from_row(&self, row: &PgRow) -> sqlx::Result<Team> {
        let id: TeamId = row.try_get("id")?;
        Ok(Team {
            id,
            name: row.try_get("name")?,
            logo: row.try_get("logo")?,
            code: row.try_get("code")?,
            created_by: row.try_get("created_by")?,
            members: self.load_members(id).await?,
            created_at: row.try_get::<NaiveDateTime, _>("created_at")?.and_utc(),
        })
    }

    async fn load_team_ids(&self, tournament_id: TournamentId) -> sqlx::Result<Vec<TeamId>> {
        let rows = sqlx::query(
            "SELECT team_id FROM tournament_teams WHERE tournament_id = $1 ORDER BY added_at, team_id",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| row.try_get("team_id")).collect()
    }

    async fn tournament_from_row(&self, row: &PgRow) -> sqlx::Result<Tournament> {
        let id: TournamentId = row.try_get("id")?;
        Ok(Tournament {
            id,
            name: row.try_get("name")?,
            entry_fee: row.try_get("entry_fee")?,
            prize: row.try_get("prize")?,
            per_kill: row.try_get("per_kill")?,
            map: parse_column(row, "map")?,
            mode: row.try_get("mode")?,
            max_team_join: row.try_get("max_team_join")?,
            start_date: row.try_get::<NaiveDateTime, _>("start_date")?.and_utc(),
            end_date: row.try_get::<NaiveDateTime, _>("end_date")?.and_utc(),
            banner_image: row.try_get("banner_image")?,
            host_name: row.try_get("host_name")?,
            host_link: row.try_get("host_link")?,
            status: parse_column(row, "status")?,
            created_by: row.try_get("created_by")?,
            teams: self.load_team_ids(id).await?,
            created_at: row.try_get::<NaiveDateTime, _>("created_at")?.and_utc(),
        })
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: &NewUser) -> AuthResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (username, email, mobile, password_hash, referral_code, referred_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.mobile)
        .bind(&user.password_hash)
        .bind(&user.referral_code)
        .bind(&user.referred_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_conflict)?;

        Ok(user_from_row(&row)?)
    }

    async fn find_user(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_credentials(&self, email: &str) -> AuthResult<Option<Credentials>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Credentials {
                user: user_from_row(&row)?,
                password_hash: row.try_get("password_hash")?,
            })),
            None => Ok(None),
        }
    }

    async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> AuthResult<User> {
        let row = sqlx::query(&format!(
            "UPDATE users
             SET mobile = COALESCE($1, mobile),
                 in_game_name = COALESCE($2, in_game_name),
                 in_game_player_id = COALESCE($3, in_game_player_id)
             WHERE id = $4
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&update.mobile)
        .bind(&update.in_game_name)
        .bind(&update.in_game_player_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_conflict)?
        .ok_or(AuthError::UserNotFound)?;

        Ok(user_from_row(&row)?)
    }
}

#[async_trait]
impl TeamRepository for PgStore {
    async fn create_team(&self, team: &NewTeam) -> TeamResult<Team> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO teams (name, logo, code, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&team.name)
        .bind(&team.logo)
        .bind(&team.code)
        .bind(team.leader.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match constraint_of(&err) {
            Some("teams_code_key") => TeamError::CodeTaken,
            Some("teams_created_by_fkey") => TeamError::UserNotFound(team.leader.user_id),
            _ => TeamError::Database(err),
        })?;
        let team_id: TeamId = row.try_get("id")?;

        insert_member(&mut tx, team_id, &team.leader).await?;
        tx.commit().await?;

        self.find_team(team_id).await?.ok_or(TeamError::NotFound)
    }

    async fn find_team(&self, team_id: TeamId) -> TeamResult<Option<Team>> {
        let row = sqlx::query(&format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1"))
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.team_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    async fn find_team_by_code(&self, code: &str) -> TeamResult<Option<Team>> {
        let row = sqlx::query(&format!("SELECT {TEAM_COLUMNS} FROM teams WHERE code = $1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.team_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    async fn teams_created_by(&self, user_id: UserId) -> TeamResult<Vec<Team>> {
        let rows = sqlx::query(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE created_by = $1 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut teams = Vec::with_capacity(rows.len());
        for row in &rows {
            teams.push(self.team_from_row(row).await?);
        }
        Ok(teams)
    }

    async fn add_member(&self, team_id: TeamId, member: &TeamMember) -> TeamResult<Team> {
        let mut tx = self.pool.begin().await?;
        insert_member(&mut tx, team_id, member).await?;
        tx.commit().await?;

        self.find_team(team_id).await?.ok_or(TeamError::NotFound)
    }
}

#[async_trait]
impl TournamentRepository for PgStore {
    async fn create_tournament(&self, tournament: &NewTournament) -> TournamentResult<Tournament> {
        let request = &tournament.request;
        let row = sqlx::query(&format!(
            "INSERT INTO tournaments (name, entry_fee, prize, per_kill, map, mode, max_team_join,
                                      start_date, end_date, banner_image, host_name, host_link,
                                      status, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {TOURNAMENT_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(request.entry_fee)
        .bind(request.prize)
        .bind(request.per_kill)
        .bind(request.map.to_string())
        .bind(&request.mode)
        .bind(tournament.max_team_join)
        .bind(request.start_date.naive_utc())
        .bind(request.end_date.naive_utc())
        .bind(&request.banner_image)
        .bind(&request.host_name)
        .bind(&request.host_link)
        .bind(TournamentStatus::Upcoming.to_string())
        .bind(request.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match constraint_of(&err) {
            Some("tournaments_created_by_fkey") => {
                TournamentError::CreatorNotFound(request.created_by)
            }
            _ => TournamentError::Database(err),
        })?;

        Ok(self.tournament_from_row(&row).await?)
    }

    async fn find_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Option<Tournament>> {
        let row = sqlx::query(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1"
        ))
        .bind(tournament_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.tournament_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    async fn tournaments_by_status(
        &self,
        status: TournamentStatus,
    ) -> TournamentResult<Vec<Tournament>> {
        let rows = sqlx::query(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE status = $1 ORDER BY start_date, id"
        ))
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut tournaments = Vec::with_capacity(rows.len());
        for row in &rows {
            tournaments.push(self.tournament_from_row(row).await?);
        }
        Ok(tournaments)
    }

    async fn update_status(
        &self,
        tournament_id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> TournamentResult<bool> {
        let result = sqlx::query("UPDATE tournaments SET status = $1 WHERE id = $2 AND status = $3")
            .bind(to.to_string())
            .bind(tournament_id)
            .bind(from.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn participants(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Participation>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, tournament_id, team_id, joined_at
            FROM tournament_participants
            WHERE tournament_id = $1
            ORDER BY joined_at, id
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        let participants = rows
            .iter()
            .map(|row| -> sqlx::Result<Participation> {
                Ok(Participation {
                    user_id: row.try_get("user_id")?,
                    tournament_id: row.try_get("tournament_id")?,
                    team_id: row.try_get("team_id")?,
                    joined_at: row.try_get::<NaiveDateTime, _>("joined_at")?.and_utc(),
                })
            })
            .collect::<sqlx::Result<Vec<_>>>()?;

        Ok(participants)
    }
}

#[async_trait]
impl LedgerRepository for PgStore {
    async fn balances(&self, user_id: UserId) -> LedgerResult<Option<WalletBalances>> {
        let row = sqlx::query(
            "SELECT deposit_wallet, winnings_wallet, bonus_wallet FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(balances_from_row).transpose()?)
    }

    async fn commit_join(&self, request: &JoinRequest) -> LedgerResult<LedgerReceipt> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes every wallet mutation for this user until commit.
        let snapshot = sqlx::query(
            "SELECT deposit_wallet, winnings_wallet, bonus_wallet FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(request.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(LedgerError::NotFound(Entity::User(request.user_id)))?;
        let snapshot = balances_from_row(&snapshot)?;

        let existing = sqlx::query(
            "SELECT id FROM tournament_participants WHERE user_id = $1 AND tournament_id = $2",
        )
        .bind(request.user_id)
        .bind(request.tournament_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            return Err(LedgerError::AlreadyJoined {
                user_id: request.user_id,
                tournament_id: request.tournament_id,
            });
        }

        let debit = plan_join_debit(&snapshot, request.entry_fee)?;

        // Tournament row lock serializes team registration, so the slot
        // count below cannot change before commit.
        let tournament = sqlx::query("SELECT max_team_join FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(request.tournament_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(LedgerError::NotFound(Entity::Tournament(request.tournament_id)))?;
        let max_team_join: i32 = tournament.try_get("max_team_join")?;

        let slots = sqlx::query(
            "SELECT EXISTS (
                    SELECT 1 FROM tournament_teams WHERE tournament_id = $1 AND team_id = $2
                ) AS registered,
                (SELECT COUNT(*) FROM tournament_teams WHERE tournament_id = $1) AS team_count",
        )
        .bind(request.tournament_id)
        .bind(request.team_id)
        .fetch_one(&mut *tx)
        .await?;
        let registered: bool = slots.try_get("registered")?;
        let team_count: i64 = slots.try_get("team_count")?;

        if !registered && team_count >= i64::from(max_team_join) {
            return Err(LedgerError::TournamentFull(request.tournament_id));
        }

        let row = sqlx::query(
            "UPDATE users
             SET deposit_wallet = deposit_wallet - $1,
                 winnings_wallet = winnings_wallet - $2,
                 bonus_wallet = bonus_wallet - $3
             WHERE id = $4
               AND deposit_wallet >= $1
               AND winnings_wallet >= $2
               AND bonus_wallet >= $3
             RETURNING deposit_wallet, winnings_wallet, bonus_wallet",
        )
        .bind(debit.deposit)
        .bind(debit.winnings)
        .bind(debit.bonus)
        .bind(request.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(LedgerError::InsufficientFunds {
            available: snapshot.spendable(),
            required: request.entry_fee,
        })?;
        let balances = balances_from_row(&row)?;

        let transaction = insert_transaction(
            &mut tx,
            &NewTransaction {
                reference: Uuid::new_v4(),
                user_id: request.user_id,
                tournament_id: Some(request.tournament_id),
                amount: request.entry_fee,
                direction: EntryDirection::Debit,
                kind: TransactionKind::TournamentEntry,
                allocations: debit.allocations(),
            },
        )
        .await
        .map_err(|err| map_join_conflict(err, request))?;

        sqlx::query(
            "INSERT INTO tournament_participants (user_id, tournament_id, team_id) VALUES ($1, $2, $3)",
        )
        .bind(request.user_id)
        .bind(request.tournament_id)
        .bind(request.team_id)
        .execute(&mut *tx)
        .await
        .map_err(|err| map_join_conflict(err, request))?;

        sqlx::query(
            "INSERT INTO tournament_teams (tournament_id, team_id) VALUES ($1, $2)
             ON CONFLICT (tournament_id, team_id) DO NOTHING",
        )
        .bind(request.tournament_id)
        .bind(request.team_id)
        .execute(&mut *tx)
        .await
        .map_err(|err| map_join_conflict(err, request))?;

        tx.commit().await?;

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
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query(
            "SELECT deposit_wallet, winnings_wallet, bonus_wallet FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(LedgerError::NotFound(Entity::User(user_id)))?;
        let current = balances_from_row(&current)?;

        // Computed here so the stored balance always decodes back into a Decimal.
        let deposit = current
            .deposit
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount(amount))?;

        let row = sqlx::query(
            "UPDATE users
             SET deposit_wallet = $1
             WHERE id = $2
             RETURNING deposit_wallet, winnings_wallet, bonus_wallet",
        )
        .bind(deposit)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        let balances = balances_from_row(&row)?;

        let transaction = insert_transaction(
            &mut tx,
            &NewTransaction {
                reference: Uuid::new_v4(),
                user_id,
                tournament_id: None,
                amount,
                direction: EntryDirection::Credit,
                kind: TransactionKind::Deposit,
                allocations: vec![WalletAllocation::new(WalletKind::Deposit, amount)],
            },
        )
        .await?;

        tx.commit().await?;

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
        let mut tx = self.pool.begin().await?;

        // Check and decrement in one statement so concurrent withdrawals cannot overdraw.
        let row = sqlx::query(
            "UPDATE users
             SET winnings_wallet = winnings_wallet - $1
             WHERE id = $2 AND winnings_wallet >= $1
             RETURNING deposit_wallet, winnings_wallet, bonus_wallet",
        )
        .bind(amount)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let balances = match row {
            Some(row) => balances_from_row(&row)?,
            None => {
                // Either user doesn't exist or winnings are too low
                let current = sqlx::query("SELECT winnings_wallet FROM users WHERE id = $1")
                    .bind(user_id)
                    .fetch_optional(&mut *tx)
                    .await?;

                return match current {
                    Some(row) => Err(LedgerError::InsufficientFunds {
                        available: row.try_get("winnings_wallet")?,
                        required: amount,
                    }),
                    None => Err(LedgerError::NotFound(Entity::User(user_id))),
                };
            }
        };

        let transaction = insert_transaction(
            &mut tx,
            &NewTransaction {
                reference: Uuid::new_v4(),
                user_id,
                tournament_id: None,
                amount,
                direction: EntryDirection::Debit,
                kind: TransactionKind::Withdrawal,
                allocations: vec![WalletAllocation::new(WalletKind::Winnings, amount)],
            },
        )
        .await?;

        tx.commit().await?;

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
        let rows = sqlx::query(
            r#"
            SELECT id, reference, user_id, tournament_id, amount, direction, kind, created_at
            FROM transactions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let ids = rows
            .iter()
            .map(|row| row.try_get::<i64, _>("id"))
            .collect::<sqlx::Result<Vec<_>>>()?;

        let allocation_rows = sqlx::query(
            r#"
            SELECT transaction_id, wallet, amount
            FROM transaction_allocations
            WHERE transaction_id = ANY($1)
            ORDER BY transaction_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut allocations: HashMap<i64, Vec<WalletAllocation>> = HashMap::new();
        for row in &allocation_rows {
            allocations
                .entry(row.try_get("transaction_id")?)
                .or_default()
                .push(WalletAllocation::new(
                    parse_column(row, "wallet")?,
                    row.try_get("amount")?,
                ));
        }

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: i64 = row.try_get("id")?;
            records.push(TransactionRecord {
                id,
                reference: row.try_get("reference")?,
                user_id: row.try_get("user_id")?,
                tournament_id: row.try_get("tournament_id")?,
                amount: row.try_get("amount")?,
                direction: parse_column(row, "direction")?,
                kind: parse_column(row, "kind")?,
                allocations: allocations.remove(&id).unwrap_or_default(),
                created_at: row.try_get::<NaiveDateTime, _>("created_at")?.and_utc(),
            });
        }

        Ok(records)
    }
}

/// Insert a transaction and its allocation rows inside an open transaction
async fn insert_transaction(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewTransaction,
) -> sqlx::Result<TransactionRecord> {
    let row = sqlx::query(
        r#"
        INSERT INTO transactions (reference, user_id, tournament_id, amount, direction, kind)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, created_at
        "#,
    )
    .bind(new.reference)
    .bind(new.user_id)
    .bind(new.tournament_id)
    .bind(new.amount)
    .bind(new.direction.to_string())
    .bind(new.kind.to_string())
    .fetch_one(&mut **tx)
    .await?;

    let id: i64 = row.try_get("id")?;

    for (position, allocation) in new.allocations.iter().enumerate() {
        sqlx::query(
            "INSERT INTO transaction_allocations (transaction_id, position, wallet, amount)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(position as i16)
        .bind(allocation.wallet.to_string())
        .bind(allocation.amount)
        .execute(&mut **tx)
        .await?;
    }

    Ok(TransactionRecord {
        id,
        reference: new.reference,
        user_id: new.user_id,
        tournament_id: new.tournament_id,
        amount: new.amount,
        direction: new.direction,
        kind: new.kind,
        allocations: new.allocations.clone(),
        created_at: row.try_get::<NaiveDateTime, _>("created_at")?.and_utc(),
    })
}

async fn insert_member(
    tx: &mut Transaction<'_, Postgres>,
    team_id: TeamId,
    member: &TeamMember,
) -> TeamResult<()> {
    sqlx::query(
        r#"
        INSERT INTO team_members (team_id, user_id, in_game_name, in_game_player_id, role)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(team_id)
    .bind(member.user_id)
    .bind(&member.in_game_name)
    .bind(&member.in_game_player_id)
    .bind(member.role.to_string())
    .execute(&mut **tx)
    .await
    .map_err(|err| match constraint_of(&err) {
        Some("team_members_pkey") => TeamError::AlreadyMember,
        Some("team_members_team_id_fkey") => TeamError::NotFound,
        Some("team_members_user_id_fkey") => TeamError::UserNotFound(member.user_id),
        _ => TeamError::Database(err),
    })?;

    Ok(())
}

fn user_from_row(row: &PgRow) -> sqlx::Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        mobile: row.try_get("mobile")?,
        referral_code: row.try_get("referral_code")?,
        referred_by: row.try_get("referred_by")?,
        in_game_name: row.try_get("in_game_name")?,
        in_game_player_id: row.try_get("in_game_player_id")?,
        wallet: balances_from_row(row)?,
        created_at: row.try_get::<NaiveDateTime, _>("created_at")?.and_utc(),
    })
}

fn balances_from_row(row: &PgRow) -> sqlx::Result<WalletBalances> {
    Ok(WalletBalances {
        deposit: row.try_get("deposit_wallet")?,
        winnings: row.try_get("winnings_wallet")?,
        bonus: row.try_get("bonus_wallet")?,
    })
}

/// Decode a text column into one of the model enums
fn parse_column<T>(row: &PgRow, column: &str) -> sqlx::Result<T>
where
    T: FromStr<Err = String>,
{
    let value: String = row.try_get(column)?;
    value.parse().map_err(|err: String| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: err.into(),
    })
}

/// Name of the violated constraint, for unique and foreign key violations
fn constraint_of(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
        {
            db_err.constraint()
        }
        _ => None,
    }
}

fn map_user_conflict(err: sqlx::Error) -> AuthError {
    match constraint_of(&err) {
        Some("users_username_key") => AuthError::UsernameTaken,
        Some("users_email_key") => AuthError::EmailTaken,
        Some("users_mobile_key") => AuthError::MobileTaken,
        Some("users_referral_code_key") => AuthError::ReferralCodeTaken,
        _ => AuthError::Database(err),
    }
}

/// Map storage constraint failures during a join to ledger errors
fn map_join_conflict(err: sqlx::Error, request: &JoinRequest) -> LedgerError {
    match constraint_of(&err) {
        Some("tournament_participants_user_tournament_key") => LedgerError::AlreadyJoined {
            user_id: request.user_id,
            tournament_id: request.tournament_id,
        },
        Some(
            "transactions_tournament_id_fkey"
            | "tournament_participants_tournament_id_fkey"
            | "tournament_teams_tournament_id_fkey",
        ) => LedgerError::NotFound(Entity::Tournament(request.tournament_id)),
        Some("tournament_participants_team_id_fkey" | "tournament_teams_team_id_fkey") => {
            LedgerError::NotFound(Entity::Team(request.team_id))
        }
        _ => LedgerError::Database(err),
    }
}
