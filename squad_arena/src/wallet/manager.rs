//! Wallet ledger: validates requests and hands them to storage for atomic commit.

use super::{
    errors::{Entity, LedgerError, LedgerResult},
    models::{JoinRequest, LedgerReceipt, TransactionRecord, WalletBalances},
};
use crate::auth::UserId;
use crate::db::LedgerRepository;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Default number of transactions returned by [`WalletLedger::history`]
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Wallet ledger
#[derive(Clone)]
pub struct WalletLedger {
    store: Arc<dyn LedgerRepository>,
}

impl WalletLedger {
    /// Create a new wallet ledger
    ///
    /// # Arguments
    ///
    /// * `store` - Storage that applies each operation in one transaction
    pub fn new(store: Arc<dyn LedgerRepository>) -> Self {
        Self { store }
    }

    /// Get wallet balances for a user
    pub async fn balances(&self, user_id: UserId) -> LedgerResult<WalletBalances> {
        self.store
            .balances(user_id)
            .await?
            .ok_or(LedgerError::NotFound(Entity::User(user_id)))
    }

    /// Debit an entry fee and register the user's team for a tournament
    ///
    /// Deposit pays first, winnings cover the remainder, and 2% of the fee is
    /// additionally taken from the bonus wallet when it has funds. A team new
    /// to the tournament needs a free slot. Team membership is the caller's
    /// responsibility.
    ///
    /// # Arguments
    ///
    /// * `request` - User, tournament, team and entry fee
    ///
    /// # Returns
    ///
    /// * `LedgerResult<LedgerReceipt>` - Recorded transaction and balances after the debit
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Negative entry fee
    /// * `LedgerError::NotFound` - User does not exist
    /// * `LedgerError::AlreadyJoined` - User already holds a participation for the tournament
    /// * `LedgerError::InsufficientFunds` - Deposit and winnings cannot cover the fee
    /// * `LedgerError::NotFound` - Tournament or team does not exist
    /// * `LedgerError::TournamentFull` - Team is new to the tournament and no slot is left
    pub async fn join_tournament(&self, request: JoinRequest) -> LedgerResult<LedgerReceipt> {
        if request.entry_fee.is_sign_negative() && !request.entry_fee.is_zero() {
            return Err(LedgerError::InvalidAmount(request.entry_fee));
        }

        match self.store.commit_join(&request).await {
            Ok(receipt) => {
                log::info!(
                    "User {} joined tournament {} with team {} (fee {}, transaction {})",
                    request.user_id,
                    request.tournament_id,
                    request.team_id,
                    request.entry_fee,
                    receipt.transaction.id
                );
                Ok(receipt)
            }
            Err(err) => {
                log::warn!(
                    "Join rejected for user {} on tournament {}: {}",
                    request.user_id,
                    request.tournament_id,
                    err
                );
                Err(err)
            }
        }
    }

    /// Credit the deposit wallet
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Amount is zero or negative
    /// * `LedgerError::NotFound` - User does not exist
    pub async fn deposit(&self, user_id: UserId, amount: Decimal) -> LedgerResult<LedgerReceipt> {
        ensure_positive(amount)?;

        let receipt = self.store.credit_deposit(user_id, amount).await?;
        log::info!("Deposited {amount} for user {user_id}");
        Ok(receipt)
    }

    /// Withdraw from the winnings wallet, the only withdrawable wallet
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Amount is zero or negative
    /// * `LedgerError::NotFound` - User does not exist
    /// * `LedgerError::InsufficientFunds` - Winnings below the amount
    pub async fn withdraw(&self, user_id: UserId, amount: Decimal) -> LedgerResult<LedgerReceipt> {
        ensure_positive(amount)?;

        let receipt = self.store.debit_winnings(user_id, amount).await?;
        log::info!("Withdrew {amount} of winnings for user {user_id}");
        Ok(receipt)
    }

    /// Get transactions for a user, newest first
    pub async fn history(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> LedgerResult<Vec<TransactionRecord>> {
        if self.store.balances(user_id).await?.is_none() {
            return Err(LedgerError::NotFound(Entity::User(user_id)));
        }
        self.store.transactions(user_id, limit.max(0)).await
    }
}

fn ensure_positive(amount: Decimal) -> LedgerResult<()> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount(amount))
    }
}
