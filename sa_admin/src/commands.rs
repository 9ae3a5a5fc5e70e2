//! Operator commands: parsing and execution against the ledger.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Error, bail};
use pico_args::Arguments;
use rust_decimal::Decimal;
use squad_arena::{
    MatchEntryService,
    auth::{AuthManager, JwtIdentity, RegisterRequest},
    db::{LedgerRepository, TeamRepository, TournamentRepository, UserRepository},
    team::TeamManager,
    tournament::{Tournament, TournamentManager},
    wallet::{DEFAULT_HISTORY_LIMIT, LedgerReceipt, WalletLedger},
};

use crate::logging::{log_ledger_event, log_ledger_rejection};

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Migrate,
    Register {
        email: String,
        username: String,
        password: String,
        referred_by: Option<String>,
    },
    Balance {
        user_id: i64,
    },
    Deposit {
        user_id: i64,
        amount: Decimal,
    },
    Withdraw {
        user_id: i64,
        amount: Decimal,
    },
    History {
        user_id: i64,
        limit: i64,
    },
    Listing,
    Start {
        tournament_id: i64,
    },
    Complete {
        tournament_id: i64,
    },
    Join {
        token: String,
        tournament_id: i64,
        team_id: i64,
    },
}

impl Command {
    /// Parse the subcommand and its options
    pub fn parse(pargs: &mut Arguments) -> Result<Self, Error> {
        let Some(name) = pargs.subcommand()? else {
            bail!("missing command, see --help");
        };

        let command = match name.as_str() {
            "migrate" => Command::Migrate,
            "register" => Command::Register {
                email: pargs.value_from_str("--email")?,
                username: pargs.value_from_str("--username")?,
                password: pargs.value_from_str("--password")?,
                referred_by: pargs.opt_value_from_str("--referred-by")?,
            },
            "balance" => Command::Balance {
                user_id: pargs.value_from_str("--user")?,
            },
            "deposit" => Command::Deposit {
                user_id: pargs.value_from_str("--user")?,
                amount: pargs.value_from_str("--amount")?,
            },
            "withdraw" => Command::Withdraw {
                user_id: pargs.value_from_str("--user")?,
                amount: pargs.value_from_str("--amount")?,
            },
            "history" => Command::History {
                user_id: pargs.value_from_str("--user")?,
                limit: pargs
                    .opt_value_from_str("--limit")?
                    .unwrap_or(DEFAULT_HISTORY_LIMIT),
            },
            "listing" => Command::Listing,
            "start" => Command::Start {
                tournament_id: pargs.value_from_str("--tournament")?,
            },
            "complete" => Command::Complete {
                tournament_id: pargs.value_from_str("--tournament")?,
            },
            "join" => Command::Join {
                token: pargs.value_from_str("--token")?,
                tournament_id: pargs.value_from_str("--tournament")?,
                team_id: pargs.value_from_str("--team")?,
            },
            other => bail!("unknown command: {other}"),
        };

        Ok(command)
    }
}

/// Managers the console drives, built over a single store
pub struct Services {
    auth: AuthManager,
    ledger: WalletLedger,
    tournaments: TournamentManager,
    entry: MatchEntryService,
}

impl Services {
    pub fn new<S>(store: Arc<S>, pepper: String, identity: JwtIdentity) -> Self
    where
        S: UserRepository + LedgerRepository + TeamRepository + TournamentRepository + 'static,
    {
        let auth = AuthManager::new(store.clone(), pepper, identity.clone());
        let ledger = WalletLedger::new(store.clone());
        let tournaments = TournamentManager::new(store.clone());
        let entry = MatchEntryService::new(
            Arc::new(identity),
            TeamManager::new(store),
            tournaments.clone(),
            ledger.clone(),
        );

        Self {
            auth,
            ledger,
            tournaments,
            entry,
        }
    }

    /// Execute a command and return the report to print
    ///
    /// `Command::Migrate` needs a live database and is handled by the caller.
    pub async fn run(&self, command: Command) -> Result<String, Error> {
        match command {
            Command::Migrate => bail!("migrate must run against a database"),
            Command::Register {
                email,
                username,
                password,
                referred_by,
            } => {
                let user = self
                    .auth
                    .register(RegisterRequest {
                        email,
                        password,
                        username,
                        mobile: None,
                        referred_by,
                    })
                    .await
                    .inspect_err(|err| log_ledger_rejection("register", None, &err.client_message()))?;
                log_ledger_event("register", user.id, None, "account created");
                Ok(format!(
                    "user {} ({}) referral code {}",
                    user.id, user.username, user.referral_code
                ))
            }
            Command::Balance { user_id } => {
                let balances = self.ledger.balances(user_id).await?;
                Ok(format!(
                    "user {user_id}: deposit {} winnings {} bonus {}",
                    balances.deposit, balances.winnings, balances.bonus
                ))
            }
            Command::Deposit { user_id, amount } => {
                let receipt = self
                    .ledger
                    .deposit(user_id, amount)
                    .await
                    .inspect_err(|err| {
                        log_ledger_rejection("deposit", Some(user_id), &err.client_message())
                    })?;
                log_ledger_event("deposit", user_id, Some(amount), "credited");
                Ok(receipt_line(&receipt))
            }
            Command::Withdraw { user_id, amount } => {
                let receipt = self
                    .ledger
                    .withdraw(user_id, amount)
                    .await
                    .inspect_err(|err| {
                        log_ledger_rejection("withdraw", Some(user_id), &err.client_message())
                    })?;
                log_ledger_event("withdraw", user_id, Some(amount), "debited");
                Ok(receipt_line(&receipt))
            }
            Command::History { user_id, limit } => {
                let history = self.ledger.history(user_id, limit).await?;
                let mut out = String::new();
                for tx in &history {
                    let allocations = tx
                        .allocations
                        .iter()
                        .map(|a| format!("{}={}", a.wallet, a.amount))
                        .collect::<Vec<_>>()
                        .join(" ");
                    writeln!(
                        out,
                        "#{} {} {} {} {} [{}]",
                        tx.id,
                        tx.created_at.format("%Y-%m-%d %H:%M:%S"),
                        tx.kind,
                        tx.direction,
                        tx.amount,
                        allocations
                    )?;
                }
                log_ledger_event("history", user_id, None, &format!("{} transactions", history.len()));
                Ok(out.trim_end().to_string())
            }
            Command::Listing => {
                let listing = self.tournaments.listing().await?;
                let mut out = String::new();
                for (label, tournaments) in [
                    ("upcoming", &listing.upcoming),
                    ("ongoing", &listing.ongoing),
                    ("completed", &listing.completed),
                ] {
                    writeln!(out, "{label}:")?;
                    for tournament in tournaments {
                        writeln!(out, "  {}", tournament_line(tournament))?;
                    }
                }
                Ok(out.trim_end().to_string())
            }
            Command::Start { tournament_id } => {
                let tournament = self.tournaments.start_tournament(tournament_id).await?;
                Ok(tournament_line(&tournament))
            }
            Command::Complete { tournament_id } => {
                let tournament = self.tournaments.complete_tournament(tournament_id).await?;
                Ok(tournament_line(&tournament))
            }
            Command::Join {
                token,
                tournament_id,
                team_id,
            } => {
                let receipt = self
                    .entry
                    .join_match(Some(&token), tournament_id, team_id)
                    .await
                    .inspect_err(|err| log_ledger_rejection("join", None, &err.client_message()))?;
                log_ledger_event(
                    "join",
                    receipt.transaction.user_id,
                    Some(receipt.transaction.amount),
                    &format!("joined tournament {tournament_id} with team {team_id}"),
                );
                Ok(receipt_line(&receipt))
            }
        }
    }
}

fn receipt_line(receipt: &LedgerReceipt) -> String {
    let b = &receipt.balances;
    format!(
        "transaction #{} ({}): deposit {} winnings {} bonus {}",
        receipt.transaction.id, receipt.transaction.reference, b.deposit, b.winnings, b.bonus
    )
}

fn tournament_line(t: &Tournament) -> String {
    format!(
        "#{} {} [{}] {} fee {} teams {}/{}",
        t.id,
        t.name,
        t.status,
        t.map,
        t.entry_fee,
        t.teams.len(),
        t.max_team_join
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use squad_arena::db::MemoryStore;
    use squad_arena::team::{DEFAULT_TEAM_LOGO, NewTeam, TeamMember, TeamRole};
    use squad_arena::tournament::{CreateTournamentRequest, GameMap};
    use squad_arena::wallet::WalletBalances;
    use std::ffi::OsString;

    const SECRET: &str = "sa_admin_commands_test_secret_0123456789";
    const PEPPER: &str = "sa_admin_test_pepper";

    fn parse(args: &[&str]) -> Result<Command, Error> {
        let mut pargs = Arguments::from_vec(args.iter().map(OsString::from).collect());
        Command::parse(&mut pargs)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse(&["migrate"]).unwrap(), Command::Migrate);
        assert_eq!(
            parse(&["deposit", "--user", "3", "--amount", "12.50"]).unwrap(),
            Command::Deposit {
                user_id: 3,
                amount: Decimal::new(1250, 2),
            }
        );
        assert_eq!(
            parse(&["history", "--user", "3"]).unwrap(),
            Command::History {
                user_id: 3,
                limit: DEFAULT_HISTORY_LIMIT,
            }
        );
        assert_eq!(
            parse(&["join", "--token", "t", "--tournament", "4", "--team", "5"]).unwrap(),
            Command::Join {
                token: "t".to_string(),
                tournament_id: 4,
                team_id: 5,
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["launch"]).is_err());
        assert!(parse(&["deposit", "--user", "3"]).is_err());
        assert!(parse(&["deposit", "--user", "x", "--amount", "1"]).is_err());
    }

    #[tokio::test]
    async fn test_run_register() {
        let store = Arc::new(MemoryStore::new());
        let services = Services::new(store, PEPPER.to_string(), JwtIdentity::new(SECRET.to_string()));
        let command = Command::Register {
            email: "ops@example.com".to_string(),
            username: "ops_user".to_string(),
            password: "SecurePass123".to_string(),
            referred_by: None,
        };

        let report = services.run(command.clone()).await.unwrap();
        assert!(report.starts_with("user 1 (ops_user) referral code "));
        assert!(services.run(command).await.is_err());
    }

    #[tokio::test]
    async fn test_run_deposit_withdraw_and_history() {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .seed_user("operator", WalletBalances::new(Decimal::ZERO, Decimal::new(10, 0), Decimal::ZERO))
            .await;
        let services = Services::new(store, PEPPER.to_string(), JwtIdentity::new(SECRET.to_string()));

        services
            .run(Command::Deposit {
                user_id: user.id,
                amount: Decimal::new(30, 0),
            })
            .await
            .unwrap();
        assert!(services
            .run(Command::Withdraw {
                user_id: user.id,
                amount: Decimal::new(11, 0),
            })
            .await
            .is_err());

        let balance = services.run(Command::Balance { user_id: user.id }).await.unwrap();
        assert_eq!(balance, format!("user {}: deposit 30 winnings 10 bonus 0", user.id));

        let history = services
            .run(Command::History {
                user_id: user.id,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(history.lines().count(), 1);
        assert!(history.contains("DEPOSIT CREDIT 30"));
    }

    #[tokio::test]
    async fn test_run_join_and_lifecycle() {
        let store = Arc::new(MemoryStore::new());
        let identity = JwtIdentity::new(SECRET.to_string());
        let user = store
            .seed_user("joiner", WalletBalances::new(Decimal::new(100, 0), Decimal::ZERO, Decimal::new(5, 0)))
            .await;
        let token = identity.issue(&user).unwrap();
        let team = store
            .create_team(&NewTeam {
                name: "Console".to_string(),
                logo: DEFAULT_TEAM_LOGO.to_string(),
                code: "CONSOLE1".to_string(),
                leader: TeamMember {
                    user_id: user.id,
                    in_game_name: None,
                    in_game_player_id: None,
                    role: TeamRole::Leader,
                },
            })
            .await
            .unwrap();
        let services = Services::new(store, PEPPER.to_string(), identity);
        let start = chrono::Utc::now();
        let tournament = services
            .tournaments
            .create_tournament(CreateTournamentRequest {
                name: "Console Cup".to_string(),
                entry_fee: Decimal::new(50, 0),
                prize: Decimal::new(500, 0),
                per_kill: Decimal::ONE,
                map: GameMap::Livik,
                mode: "SQUAD".to_string(),
                start_date: start,
                end_date: start,
                banner_image: None,
                host_name: "Console".to_string(),
                host_link: None,
                created_by: user.id,
            })
            .await
            .unwrap();

        let report = services
            .run(Command::Join {
                token,
                tournament_id: tournament.id,
                team_id: team.id,
            })
            .await
            .unwrap();
        assert!(report.ends_with("deposit 50 winnings 0 bonus 4.00"));

        let listing = services.run(Command::Listing).await.unwrap();
        assert!(listing.contains("teams 1/13"));

        services
            .run(Command::Start {
                tournament_id: tournament.id,
            })
            .await
            .unwrap();
        let report = services
            .run(Command::Complete {
                tournament_id: tournament.id,
            })
            .await
            .unwrap();
        assert!(report.contains("[completed]"));

        assert!(services.run(Command::Migrate).await.is_err());
    }
}
