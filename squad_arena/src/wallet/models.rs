//! Wallet data models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::UserId;
use crate::team::TeamId;
use crate::tournament::TournamentId;

/// Transaction ID type
pub type TransactionId = i64;

/// The three balances embedded in every user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalances {
    pub deposit: Decimal,
    pub winnings: Decimal,
    pub bonus: Decimal,
}

impl WalletBalances {
    pub fn new(deposit: Decimal, winnings: Decimal, bonus: Decimal) -> Self {
        Self {
            deposit,
            winnings,
            bonus,
        }
    }

    /// Funds that can pay an entry fee (bonus only subsidizes)
    ///
    /// Saturates at `Decimal::MAX`.
    pub fn spendable(&self) -> Decimal {
        self.deposit.saturating_add(self.winnings)
    }

    /// True when no wallet is below zero
    pub fn is_non_negative(&self) -> bool {
        !self.deposit.is_sign_negative()
            && !self.winnings.is_sign_negative()
            && !self.bonus.is_sign_negative()
    }

    pub fn get(&self, wallet: WalletKind) -> Decimal {
        match wallet {
            WalletKind::Deposit => self.deposit,
            WalletKind::Winnings => self.winnings,
            WalletKind::Bonus => self.bonus,
        }
    }
}

/// Wallet source of an allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletKind {
    Deposit,
    Winnings,
    Bonus,
}

impl std::fmt::Display for WalletKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletKind::Deposit => write!(f, "DEPOSIT"),
            WalletKind::Winnings => write!(f, "WINNINGS"),
            WalletKind::Bonus => write!(f, "BONUS"),
        }
    }
}

impl std::str::FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(WalletKind::Deposit),
            "WINNINGS" => Ok(WalletKind::Winnings),
            "BONUS" => Ok(WalletKind::Bonus),
            other => Err(format!("unknown wallet kind: {other}")),
        }
    }
}

/// Entry direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryDirection {
    Debit,
    Credit,
}

impl std::fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryDirection::Debit => write!(f, "DEBIT"),
            EntryDirection::Credit => write!(f, "CREDIT"),
        }
    }
}

impl std::str::FromStr for EntryDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEBIT" => Ok(EntryDirection::Debit),
            "CREDIT" => Ok(EntryDirection::Credit),
            other => Err(format!("unknown entry direction: {other}")),
        }
    }
}

/// What a transaction was recorded for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    TournamentEntry,
    Deposit,
    Withdrawal,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::TournamentEntry => write!(f, "TOURNAMENT_ENTRY"),
            TransactionKind::Deposit => write!(f, "DEPOSIT"),
            TransactionKind::Withdrawal => write!(f, "WITHDRAWAL"),
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TOURNAMENT_ENTRY" => Ok(TransactionKind::TournamentEntry),
            "DEPOSIT" => Ok(TransactionKind::Deposit),
            "WITHDRAWAL" => Ok(TransactionKind::Withdrawal),
            other => Err(format!("unknown transaction kind: {other}")),
        }
    }
}

/// Amount taken from (or credited to) one wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAllocation {
    pub wallet: WalletKind,
    pub amount: Decimal,
}

impl WalletAllocation {
    pub fn new(wallet: WalletKind, amount: Decimal) -> Self {
        Self { wallet, amount }
    }
}

/// Immutable ledger record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub reference: Uuid,
    pub user_id: UserId,
    pub tournament_id: Option<TournamentId>,
    pub amount: Decimal,
    pub direction: EntryDirection,
    pub kind: TransactionKind,
    pub allocations: Vec<WalletAllocation>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Allocated amount for a wallet (zero when absent)
    pub fn allocated(&self, wallet: WalletKind) -> Decimal {
        self.allocations
            .iter()
            .filter(|a| a.wallet == wallet)
            .map(|a| a.amount)
            .sum()
    }
}

/// Transaction about to be written; storage assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub reference: Uuid,
    pub user_id: UserId,
    pub tournament_id: Option<TournamentId>,
    pub amount: Decimal,
    pub direction: EntryDirection,
    pub kind: TransactionKind,
    pub allocations: Vec<WalletAllocation>,
}

/// Request to debit an entry fee and register a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub user_id: UserId,
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub entry_fee: Decimal,
}

/// A user's team registered for a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub user_id: UserId,
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub joined_at: DateTime<Utc>,
}

/// Successful ledger operation: the recorded transaction and balances after it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    pub transaction: TransactionRecord,
    pub balances: WalletBalances,
}
