//! Entry-fee waterfall: deposit first, then winnings, plus a bonus subsidy.
//!
//! Planning is a pure function over a balance snapshot. Storage calls it
//! while holding the user's row lock and commits the returned [`JoinDebit`]
//! in the same transaction, so nothing is mutated when planning fails.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::{LedgerError, LedgerResult};
use super::models::{WalletAllocation, WalletBalances, WalletKind};

/// Share of the entry fee taken from the bonus wallet (2%)
pub const BONUS_SUBSIDY_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

/// Per-wallet deductions for one tournament entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinDebit {
    pub deposit: Decimal,
    pub winnings: Decimal,
    pub bonus: Decimal,
}

impl JoinDebit {
    /// Portion of the fee paid by deposit and winnings
    pub fn charged(&self) -> Decimal {
        self.deposit + self.winnings
    }

    /// Breakdown recorded on the transaction, always in wallet order
    pub fn allocations(&self) -> Vec<WalletAllocation> {
        vec![
            WalletAllocation::new(WalletKind::Deposit, self.deposit),
            WalletAllocation::new(WalletKind::Winnings, self.winnings),
            WalletAllocation::new(WalletKind::Bonus, self.bonus),
        ]
    }

    /// Balances after this debit is applied
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - A deduction overflows its wallet
    pub fn apply_to(&self, balances: &WalletBalances) -> LedgerResult<WalletBalances> {
        let subtract = |balance: Decimal, deduction: Decimal| {
            balance
                .checked_sub(deduction)
                .ok_or(LedgerError::InvalidAmount(deduction))
        };

        Ok(WalletBalances {
            deposit: subtract(balances.deposit, self.deposit)?,
            winnings: subtract(balances.winnings, self.winnings)?,
            bonus: subtract(balances.bonus, self.bonus)?,
        })
    }
}

/// Bonus wallet share of an entry fee
pub fn bonus_fee(entry_fee: Decimal) -> Decimal {
    entry_fee * BONUS_SUBSIDY_RATE
}

/// Plan the deductions for an entry fee against a balance snapshot.
///
/// # Errors
///
/// * `LedgerError::InvalidAmount` - Negative fee
/// * `LedgerError::InsufficientFunds` - Deposit and winnings together cannot cover the fee
pub fn plan_join_debit(balances: &WalletBalances, entry_fee: Decimal) -> LedgerResult<JoinDebit> {
    if entry_fee.is_sign_negative() && !entry_fee.is_zero() {
        return Err(LedgerError::InvalidAmount(entry_fee));
    }
    if entry_fee.is_zero() {
        return Ok(JoinDebit::default());
    }

    let deposit = balances.deposit.max(Decimal::ZERO).min(entry_fee);
    let mut remaining = entry_fee - deposit;

    let mut winnings = Decimal::ZERO;
    if remaining > Decimal::ZERO {
        winnings = balances.winnings.max(Decimal::ZERO).min(remaining);
        remaining -= winnings;
    }

    if remaining > Decimal::ZERO {
        return Err(LedgerError::InsufficientFunds {
            available: deposit + winnings,
            required: entry_fee,
        });
    }

    // Subsidy is taken on top of the fee, never instead of it.
    let bonus = if balances.bonus > Decimal::ZERO {
        balances.bonus.min(bonus_fee(entry_fee))
    } else {
        Decimal::ZERO
    };

    Ok(JoinDebit {
        deposit,
        winnings,
        bonus,
    })
}
