/// Property-based tests for the entry-fee waterfall using proptest
///
/// These tests check that planning and committing a join keep every wallet
/// non-negative, charge exactly the fee and never exceed the bonus subsidy,
/// across randomly generated balances and fees (in cents). Whole sessions of
/// deposits, withdrawals and joins are replayed against a simple model.
use proptest::prelude::*;
use rust_decimal::Decimal;
use squad_arena::db::{LedgerRepository, MemoryStore, TeamRepository, TournamentRepository};
use squad_arena::team::{DEFAULT_TEAM_LOGO, NewTeam, TeamMember, TeamRole};
use squad_arena::tournament::{CreateTournamentRequest, GameMap, NewTournament};
use squad_arena::wallet::{
    JoinRequest, LedgerError, WalletBalances, WalletLedger, bonus_fee, plan_join_debit,
};
use std::collections::HashSet;
use std::sync::Arc;

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

// Strategy for a wallet snapshot with up to 1000.00 in each wallet
fn balances_strategy() -> impl Strategy<Value = WalletBalances> {
    (0i64..=100_000, 0i64..=100_000, 0i64..=100_000)
        .prop_map(|(d, w, b)| WalletBalances::new(cents(d), cents(w), cents(b)))
}

// Strategy for an entry fee up to 1500.00
fn fee_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=150_000).prop_map(cents)
}

proptest! {
    #[test]
    fn test_plan_charges_exactly_the_fee(balances in balances_strategy(), fee in fee_strategy()) {
        match plan_join_debit(&balances, fee) {
            Ok(debit) => {
                prop_assert_eq!(debit.deposit + debit.winnings, fee);
                prop_assert!(debit.apply_to(&balances).unwrap().is_non_negative());
            }
            Err(LedgerError::InsufficientFunds { available, required }) => {
                prop_assert!(balances.spendable() < fee);
                prop_assert_eq!(available, balances.spendable());
                prop_assert_eq!(required, fee);
            }
            Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_deposit_is_drained_before_winnings(balances in balances_strategy(), fee in fee_strategy()) {
        if let Ok(debit) = plan_join_debit(&balances, fee) {
            if debit.winnings > Decimal::ZERO {
                prop_assert_eq!(debit.deposit, balances.deposit);
            }
        }
    }

    #[test]
    fn test_bonus_subsidy_is_capped(balances in balances_strategy(), fee in fee_strategy()) {
        if let Ok(debit) = plan_join_debit(&balances, fee) {
            prop_assert!(debit.bonus <= bonus_fee(fee));
            prop_assert!(debit.bonus <= balances.bonus);
            prop_assert_eq!(debit.bonus, balances.bonus.min(bonus_fee(fee)));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_committed_join_matches_plan(balances in balances_strategy(), fee in fee_strategy()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (planned, after, history_len) = runtime.block_on(async {
            let store = MemoryStore::new();
            let user = store.seed_user("prop", balances).await;
            let team = store
                .create_team(&NewTeam {
                    name: "Prop".to_string(),
                    logo: DEFAULT_TEAM_LOGO.to_string(),
                    code: "PROPTEAM".to_string(),
                    leader: TeamMember {
                        user_id: user.id,
                        in_game_name: None,
                        in_game_player_id: None,
                        role: TeamRole::Leader,
                    },
                })
                .await
                .unwrap();
            let start = chrono::Utc::now();
            let tournament = store
                .create_tournament(&NewTournament {
                    request: CreateTournamentRequest {
                        name: "Prop Cup".to_string(),
                        entry_fee: fee,
                        prize: Decimal::ZERO,
                        per_kill: Decimal::ZERO,
                        map: GameMap::Sanhok,
                        mode: "SQUAD".to_string(),
                        start_date: start,
                        end_date: start,
                        banner_image: None,
                        host_name: "Prop".to_string(),
                        host_link: None,
                        created_by: user.id,
                    },
                    max_team_join: GameMap::Sanhok.max_teams(),
                })
                .await
                .unwrap();

            let result = store
                .commit_join(&JoinRequest {
                    user_id: user.id,
                    tournament_id: tournament.id,
                    team_id: team.id,
                    entry_fee: fee,
                })
                .await;
            let after = store.balances(user.id).await.unwrap().unwrap();
            let history_len = store.transactions(user.id, 10).await.unwrap().len();
            (result.map(|receipt| receipt.balances), after, history_len)
        });

        match (plan_join_debit(&balances, fee), planned) {
            (Ok(debit), Ok(committed)) => {
                prop_assert_eq!(committed, debit.apply_to(&balances).unwrap());
                prop_assert_eq!(after, committed);
                prop_assert_eq!(history_len, 1);
            }
            (Err(_), Err(_)) => {
                prop_assert_eq!(after, balances);
                prop_assert_eq!(history_len, 0);
            }
            (plan, commit) => prop_assert!(
                false,
                "plan and commit disagree: {:?} vs {:?}",
                plan.map(|d| d.charged()),
                commit.map(|b| b.spendable())
            ),
        }
    }
}

/// One step of a wallet session
#[derive(Debug, Clone)]
enum Op {
    Deposit(i64),
    Withdraw(i64),
    Join { fee: i64, slot: usize },
}

const SLOTS: usize = 3;

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..=50_000).prop_map(Op::Deposit),
        (1i64..=50_000).prop_map(Op::Withdraw),
        (0i64..=80_000, 0..SLOTS).prop_map(|(fee, slot)| Op::Join { fee, slot }),
    ]
}

/// Store with one seeded user, one team and a few free tournaments
async fn session(balances: WalletBalances) -> (WalletLedger, i64, i64, Vec<i64>) {
    let store = Arc::new(MemoryStore::new());
    let user = store.seed_user("session", balances).await;
    let team = store
        .create_team(&NewTeam {
            name: "Session".to_string(),
            logo: DEFAULT_TEAM_LOGO.to_string(),
            code: "SESSION1".to_string(),
            leader: TeamMember {
                user_id: user.id,
                in_game_name: None,
                in_game_player_id: None,
                role: TeamRole::Leader,
            },
        })
        .await
        .unwrap();

    let start = chrono::Utc::now();
    let mut tournaments = Vec::new();
    for slot in 0..SLOTS {
        let tournament = store
            .create_tournament(&NewTournament {
                request: CreateTournamentRequest {
                    name: format!("Session Cup {slot}"),
                    entry_fee: Decimal::ZERO,
                    prize: Decimal::ZERO,
                    per_kill: Decimal::ZERO,
                    map: GameMap::Erangel,
                    mode: "SQUAD".to_string(),
                    start_date: start,
                    end_date: start,
                    banner_image: None,
                    host_name: "Session".to_string(),
                    host_link: None,
                    created_by: user.id,
                },
                max_team_join: GameMap::Erangel.max_teams(),
            })
            .await
            .unwrap();
        tournaments.push(tournament.id);
    }

    (WalletLedger::new(store), user.id, team.id, tournaments)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_wallets_stay_non_negative_across_sessions(
        initial in balances_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..24),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let steps = runtime.block_on(async {
            let (ledger, user_id, team_id, tournaments) = session(initial).await;
            let mut steps = Vec::new();
            for op in &ops {
                let result = match *op {
                    Op::Deposit(amount) => ledger.deposit(user_id, cents(amount)).await,
                    Op::Withdraw(amount) => ledger.withdraw(user_id, cents(amount)).await,
                    Op::Join { fee, slot } => {
                        ledger
                            .join_tournament(JoinRequest {
                                user_id,
                                tournament_id: tournaments[slot],
                                team_id,
                                entry_fee: cents(fee),
                            })
                            .await
                    }
                };
                let after = ledger.balances(user_id).await.unwrap();
                steps.push((result.map(|receipt| receipt.balances), after));
            }
            steps
        });

        // Replay against a plain model of the three wallets.
        let mut expected = initial;
        let mut joined = HashSet::new();
        for (op, (result, after)) in ops.iter().zip(steps) {
            prop_assert!(after.is_non_negative(), "negative wallet after {:?}: {:?}", op, after);

            let model = match *op {
                Op::Deposit(amount) => Some(WalletBalances {
                    deposit: expected.deposit + cents(amount),
                    ..expected
                }),
                Op::Withdraw(amount) if expected.winnings >= cents(amount) => Some(WalletBalances {
                    winnings: expected.winnings - cents(amount),
                    ..expected
                }),
                Op::Withdraw(_) => None,
                Op::Join { slot, .. } if joined.contains(&slot) => None,
                Op::Join { fee, slot } => match plan_join_debit(&expected, cents(fee)) {
                    Ok(debit) => {
                        joined.insert(slot);
                        Some(debit.apply_to(&expected).unwrap())
                    }
                    Err(_) => None,
                },
            };

            match (model, result) {
                (Some(next), Ok(committed)) => {
                    prop_assert_eq!(committed, next);
                    expected = next;
                }
                (None, Err(_)) => {}
                (model, result) => prop_assert!(
                    false,
                    "{:?} diverged: model {:?}, ledger {:?}",
                    op,
                    model,
                    result.map_err(|err| err.to_string())
                ),
            }
            prop_assert_eq!(after, expected);
        }
    }
}
