//! Match entry: the workflow that turns a join request into a ledger debit.
//!
//! The caller's identity is verified once, the tournament and team are
//! checked, and only then is [`crate::wallet::WalletLedger::join_tournament`]
//! invoked with the tournament's entry fee.

pub mod errors;
pub mod service;

pub use errors::{EntryError, EntryResult};
pub use service::MatchEntryService;
