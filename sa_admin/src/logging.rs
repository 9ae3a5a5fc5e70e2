//! Structured logging configuration.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! forwards those records so everything lands in one stream.

use rust_decimal::Decimal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}

/// Log an operator action against a user's wallets
///
/// # Arguments
///
/// * `action` - Command name (deposit, withdraw, join)
/// * `user_id` - Affected user
/// * `amount` - Amount moved, if any
/// * `outcome` - Result summary
pub fn log_ledger_event(action: &str, user_id: i64, amount: Option<Decimal>, outcome: &str) {
    tracing::info!(
        action = action,
        user_id = user_id,
        amount = ?amount,
        "LEDGER: {}",
        outcome
    );
}

/// Log a rejected operator action
pub fn log_ledger_rejection(action: &str, user_id: Option<i64>, reason: &str) {
    tracing::warn!(
        action = action,
        user_id = user_id,
        "LEDGER: rejected: {}",
        reason
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_ledger_event() {
        // Just ensure it doesn't panic
        log_ledger_event("deposit", 1, Some(Decimal::new(100, 0)), "ok");
        log_ledger_event("history", 1, None, "3 transactions");
    }

    #[test]
    fn test_log_ledger_rejection() {
        log_ledger_rejection("withdraw", Some(7), "Insufficient funds");
        log_ledger_rejection("join", None, "Unauthorized");
    }
}
