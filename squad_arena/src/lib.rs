//! # Squad Arena
//!
//! Accounts, teams and paid tournament entry for squad-based battle royale
//! matches, built around a three-wallet ledger.
//!
//! Every user holds three balances:
//!
//! - **Deposit**: money the user added; spent first
//! - **Winnings**: prize money; spent second and the only withdrawable wallet
//! - **Bonus**: promotional credit; subsidizes 2% of each entry fee
//!
//! Joining a tournament debits the entry fee across these wallets in one
//! storage transaction, records an immutable transaction with per-wallet
//! allocations, and registers the user's team for the match.
//!
//! ## Core Modules
//!
//! - [`auth`]: Registration, login and JWT identity
//! - [`team`]: Teams and invite codes
//! - [`tournament`]: Tournament creation, listing and lifecycle
//! - [`wallet`]: Balances, the entry-fee waterfall and the transaction log
//! - [`entry`]: The join-match workflow tying the above together
//! - [`db`]: Repository traits with PostgreSQL and in-memory stores
//!
//! ## Example
//!
//! ```
//! use squad_arena::wallet::{WalletBalances, plan_join_debit};
//! use rust_decimal::Decimal;
//!
//! let balances = WalletBalances::new(Decimal::new(80, 0), Decimal::new(30, 0), Decimal::new(10, 0));
//! let debit = plan_join_debit(&balances, Decimal::new(100, 0)).unwrap();
//! assert_eq!(debit.winnings, Decimal::new(20, 0));
//! assert_eq!(debit.bonus, Decimal::new(2, 0));
//! ```

/// User accounts and identity tokens.
pub mod auth;

/// Referral and team invite codes.
pub mod codes;

/// Storage: repository traits, PostgreSQL and in-memory implementations.
pub mod db;

/// Join-match workflow.
pub mod entry;

/// Teams and membership.
pub mod team;

/// Tournaments and their lifecycle.
pub mod tournament;

/// Wallets and the entry-fee ledger.
pub mod wallet;

pub use entry::MatchEntryService;
pub use wallet::{WalletBalances, WalletLedger};
