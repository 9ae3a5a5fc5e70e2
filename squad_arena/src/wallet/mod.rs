//! Wallet module: three-tier balances and the tournament entry ledger.
//!
//! Every user carries a deposit, a winnings and a bonus wallet. This module
//! implements:
//! - The entry-fee waterfall (deposit, then winnings, plus a 2% bonus subsidy)
//! - Deposits into the deposit wallet and withdrawals from the winnings wallet
//! - An append-only transaction log with per-wallet allocations
//! - All-or-nothing commits through [`crate::db::LedgerRepository`]
//!
//! ## Example
//!
//! ```no_run
//! use squad_arena::db::MemoryStore;
//! use squad_arena::wallet::{WalletBalances, WalletLedger};
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let user = store.seed_user("player1", WalletBalances::default()).await;
//!     let ledger = WalletLedger::new(store);
//!
//!     ledger.deposit(user.id, Decimal::new(100, 0)).await?;
//!     let receipt = ledger.withdraw(user.id, Decimal::new(10, 0)).await;
//!     assert!(receipt.is_err(), "deposits are not withdrawable");
//!     println!("Balances: {:?}", ledger.balances(user.id).await?);
//!     Ok(())
//! }
//! ```

pub mod allocation;
pub mod errors;
pub mod manager;
pub mod models;

pub use allocation::{BONUS_SUBSIDY_RATE, JoinDebit, bonus_fee, plan_join_debit};
pub use errors::{Entity, LedgerError, LedgerResult};
pub use manager::{DEFAULT_HISTORY_LIMIT, WalletLedger};
pub use models::{
    EntryDirection, JoinRequest, LedgerReceipt, NewTransaction, Participation, TransactionId,
    TransactionKind, TransactionRecord, WalletAllocation, WalletBalances, WalletKind,
};
