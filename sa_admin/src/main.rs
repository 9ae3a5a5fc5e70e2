//! Operator console for the squad arena ledger.
//!
//! Runs one command against the PostgreSQL store: schema migrations,
//! wallet inspection and adjustments, tournament lifecycle, and match joins
//! on behalf of a token holder.

mod commands;
mod config;
mod logging;

use std::sync::Arc;

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use squad_arena::{auth::JwtIdentity, db::Database};

use commands::{Command, Services};
use config::AdminConfig;

const HELP: &str = "\
Operate the squad arena tournament ledger

USAGE:
  sa_admin [OPTIONS] <COMMAND> [COMMAND OPTIONS]

COMMANDS:
  migrate                                      Apply database migrations
  register  --email EMAIL --username NAME --password PASS [--referred-by CODE]
                                               Create an account with empty wallets
  balance   --user ID                          Show wallet balances
  deposit   --user ID --amount AMOUNT          Credit the deposit wallet
  withdraw  --user ID --amount AMOUNT          Debit the winnings wallet
  history   --user ID [--limit N]              Show transactions, newest first
  listing                                      List tournaments by status
  start     --tournament ID                    Close registration and start a match
  complete  --tournament ID                    Finish a match
  join      --token JWT --tournament ID --team ID
                                               Join a match as the token holder

OPTIONS:
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/squad_arena]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (at least 32 characters)
  PASSWORD_PEPPER          Password hashing pepper (at least 16 characters)
  RUST_LOG                 Log filter [default: info,sqlx=warn]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let command = Command::parse(&mut pargs)?;

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("unexpected arguments: {remaining:?}");
    }

    logging::init();

    let config = AdminConfig::from_env(database_url)?;

    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    info!("Database connected");

    if command == Command::Migrate {
        db.migrate()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
        info!("Migrations applied");
        db.close().await;
        return Ok(());
    }

    let services = Services::new(
        Arc::new(db.store()),
        config.security.password_pepper.clone(),
        JwtIdentity::new(config.security.jwt_secret.clone()),
    );

    let result = services.run(command).await;
    db.close().await;

    println!("{}", result?);
    Ok(())
}
