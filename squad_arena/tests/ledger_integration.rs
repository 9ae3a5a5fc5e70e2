//! Integration tests for the wallet ledger against the in-memory store.
//!
//! Covers the entry-fee waterfall end to end: balance updates, recorded
//! allocations, participation bookkeeping, all-or-nothing failures and
//! concurrent joins by the same user.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use squad_arena::db::{LedgerRepository, MemoryStore};
use squad_arena::team::{CreateTeamRequest, TeamManager};
use squad_arena::tournament::{CreateTournamentRequest, GameMap, Tournament, TournamentManager};
use squad_arena::wallet::{
    DEFAULT_HISTORY_LIMIT, EntryDirection, Entity, JoinRequest, LedgerError, TransactionKind,
    WalletBalances, WalletKind, WalletLedger,
};
use std::sync::Arc;
use tokio::sync::Barrier;

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

fn balances(deposit: i64, winnings: i64, bonus: i64) -> WalletBalances {
    WalletBalances::new(dec(deposit), dec(winnings), dec(bonus))
}

struct Fixture {
    store: Arc<MemoryStore>,
    ledger: WalletLedger,
    tournaments: TournamentManager,
    teams: TeamManager,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            ledger: WalletLedger::new(store.clone()),
            tournaments: TournamentManager::new(store.clone()),
            teams: TeamManager::new(store.clone()),
            store,
        }
    }

    async fn tournament(&self, host: i64, entry_fee: i64) -> Tournament {
        self.tournament_on(host, GameMap::Erangel, entry_fee).await
    }

    async fn tournament_on(&self, host: i64, map: GameMap, entry_fee: i64) -> Tournament {
        let start = Utc::now() + Duration::days(1);
        self.tournaments
            .create_tournament(CreateTournamentRequest {
                name: "Evening Cup".to_string(),
                entry_fee: dec(entry_fee),
                prize: dec(500),
                per_kill: dec(5),
                map,
                mode: "SQUAD".to_string(),
                start_date: start,
                end_date: start + Duration::hours(1),
                banner_image: None,
                host_name: "Host".to_string(),
                host_link: None,
                created_by: host,
            })
            .await
            .expect("tournament should be created")
    }

    async fn team(&self, leader: i64) -> i64 {
        self.teams
            .create_team(
                leader,
                CreateTeamRequest {
                    name: "Night Owls".to_string(),
                    logo: None,
                    in_game_name: None,
                    in_game_player_id: None,
                },
            )
            .await
            .expect("team should be created")
            .id
    }
}

#[tokio::test]
async fn test_join_spills_into_winnings_and_takes_bonus_subsidy() {
    let fx = Fixture::new();
    let user = fx.store.seed_user("player", balances(80, 30, 10)).await;
    let tournament = fx.tournament(user.id, 100).await;
    let team_id = fx.team(user.id).await;

    let receipt = fx
        .ledger
        .join_tournament(JoinRequest {
            user_id: user.id,
            tournament_id: tournament.id,
            team_id,
            entry_fee: tournament.entry_fee,
        })
        .await
        .unwrap();

    assert_eq!(receipt.balances, balances(0, 10, 8));
    assert_eq!(fx.ledger.balances(user.id).await.unwrap(), balances(0, 10, 8));

    let tx = &receipt.transaction;
    assert_eq!(tx.amount, dec(100));
    assert_eq!(tx.direction, EntryDirection::Debit);
    assert_eq!(tx.kind, TransactionKind::TournamentEntry);
    assert_eq!(tx.tournament_id, Some(tournament.id));
    assert_eq!(tx.allocations.len(), 3);
    assert_eq!(tx.allocated(WalletKind::Deposit), dec(80));
    assert_eq!(tx.allocated(WalletKind::Winnings), dec(20));
    assert_eq!(tx.allocated(WalletKind::Bonus), dec(2));

    let participants = fx.tournaments.participants(tournament.id).await.unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].user_id, user.id);
    assert_eq!(participants[0].team_id, team_id);

    let tournament = fx.tournaments.tournament(tournament.id).await.unwrap();
    assert_eq!(tournament.teams, vec![team_id]);
}

#[tokio::test]
async fn test_insufficient_funds_changes_nothing() {
    let fx = Fixture::new();
    let user = fx.store.seed_user("short", balances(50, 0, 10)).await;
    let tournament = fx.tournament(user.id, 100).await;
    let team_id = fx.team(user.id).await;

    let err = fx
        .ledger
        .join_tournament(JoinRequest {
            user_id: user.id,
            tournament_id: tournament.id,
            team_id,
            entry_fee: tournament.entry_fee,
        })
        .await
        .unwrap_err();

    match err {
        LedgerError::InsufficientFunds {
            available,
            required,
        } => {
            assert_eq!(available, dec(50));
            assert_eq!(required, dec(100));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(fx.ledger.balances(user.id).await.unwrap(), balances(50, 0, 10));
    assert!(fx.ledger.history(user.id, DEFAULT_HISTORY_LIMIT).await.unwrap().is_empty());
    assert!(fx.tournaments.participants(tournament.id).await.unwrap().is_empty());
    assert!(fx.tournaments.tournament(tournament.id).await.unwrap().teams.is_empty());
}

#[tokio::test]
async fn test_second_join_is_rejected() {
    let fx = Fixture::new();
    let user = fx.store.seed_user("repeat", balances(300, 0, 0)).await;
    let tournament = fx.tournament(user.id, 100).await;
    let team_id = fx.team(user.id).await;
    let request = JoinRequest {
        user_id: user.id,
        tournament_id: tournament.id,
        team_id,
        entry_fee: tournament.entry_fee,
    };

    fx.ledger.join_tournament(request).await.unwrap();
    let err = fx.ledger.join_tournament(request).await.unwrap_err();

    assert!(matches!(err, LedgerError::AlreadyJoined { .. }));
    assert_eq!(fx.ledger.balances(user.id).await.unwrap(), balances(200, 0, 0));
    assert_eq!(fx.ledger.history(user.id, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_free_tournament_records_zero_debit() {
    let fx = Fixture::new();
    let user = fx.store.seed_user("freebie", balances(0, 0, 10)).await;
    let tournament = fx.tournament(user.id, 0).await;
    let team_id = fx.team(user.id).await;

    let receipt = fx
        .ledger
        .join_tournament(JoinRequest {
            user_id: user.id,
            tournament_id: tournament.id,
            team_id,
            entry_fee: Decimal::ZERO,
        })
        .await
        .unwrap();

    assert_eq!(receipt.balances, balances(0, 0, 10));
    assert!(receipt.transaction.allocations.iter().all(|a| a.amount.is_zero()));
    assert_eq!(fx.tournaments.participants(tournament.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_records_are_not_found() {
    let fx = Fixture::new();
    let user = fx.store.seed_user("lost", balances(500, 0, 0)).await;
    let tournament = fx.tournament(user.id, 100).await;
    let team_id = fx.team(user.id).await;

    let err = fx
        .ledger
        .join_tournament(JoinRequest {
            user_id: user.id,
            tournament_id: 999,
            team_id,
            entry_fee: dec(100),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(Entity::Tournament(999))));

    let err = fx
        .ledger
        .join_tournament(JoinRequest {
            user_id: user.id,
            tournament_id: tournament.id,
            team_id: 999,
            entry_fee: dec(100),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(Entity::Team(999))));

    let err = fx
        .ledger
        .join_tournament(JoinRequest {
            user_id: 999,
            tournament_id: tournament.id,
            team_id,
            entry_fee: dec(100),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(Entity::User(999))));

    assert_eq!(fx.ledger.balances(user.id).await.unwrap(), balances(500, 0, 0));
}

#[tokio::test]
async fn test_negative_fee_is_invalid() {
    let fx = Fixture::new();
    let user = fx.store.seed_user("neg", balances(10, 0, 0)).await;

    let err = fx
        .ledger
        .join_tournament(JoinRequest {
            user_id: user.id,
            tournament_id: 1,
            team_id: 1,
            entry_fee: dec(-1),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InvalidAmount(_)));
}

#[tokio::test]
async fn test_teammates_share_one_team_slot() {
    let fx = Fixture::new();
    let leader = fx.store.seed_user("leader", balances(100, 0, 0)).await;
    let mate = fx.store.seed_user("mate", balances(100, 0, 0)).await;
    let tournament = fx.tournament(leader.id, 40).await;
    let team_id = fx.team(leader.id).await;

    for user_id in [leader.id, mate.id] {
        fx.ledger
            .join_tournament(JoinRequest {
                user_id,
                tournament_id: tournament.id,
                team_id,
                entry_fee: tournament.entry_fee,
            })
            .await
            .unwrap();
    }

    let tournament = fx.tournaments.tournament(tournament.id).await.unwrap();
    assert_eq!(tournament.teams, vec![team_id]);
    assert_eq!(fx.tournaments.participants(tournament.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_deposit_and_withdraw() {
    let fx = Fixture::new();
    let user = fx.store.seed_user("banker", balances(0, 25, 0)).await;

    let receipt = fx.ledger.deposit(user.id, dec(40)).await.unwrap();
    assert_eq!(receipt.balances, balances(40, 25, 0));
    assert_eq!(receipt.transaction.kind, TransactionKind::Deposit);
    assert_eq!(receipt.transaction.direction, EntryDirection::Credit);

    // Deposits are spendable but not withdrawable.
    let err = fx.ledger.withdraw(user.id, dec(30)).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

    let receipt = fx.ledger.withdraw(user.id, dec(25)).await.unwrap();
    assert_eq!(receipt.balances, balances(40, 0, 0));
    assert_eq!(receipt.transaction.allocated(WalletKind::Winnings), dec(25));

    assert!(matches!(
        fx.ledger.deposit(user.id, Decimal::ZERO).await,
        Err(LedgerError::InvalidAmount(_))
    ));
    assert!(matches!(
        fx.ledger.deposit(404, dec(1)).await,
        Err(LedgerError::NotFound(Entity::User(404)))
    ));
}

#[tokio::test]
async fn test_deposit_overflow_is_rejected() {
    let fx = Fixture::new();
    let whale = WalletBalances::new(Decimal::MAX, Decimal::MAX, Decimal::ZERO);
    let user = fx.store.seed_user("whale", whale).await;

    let err = fx.ledger.deposit(user.id, dec(1)).await.unwrap_err();

    assert!(matches!(err, LedgerError::InvalidAmount(_)));
    assert_eq!(fx.ledger.balances(user.id).await.unwrap(), whale);
    assert!(fx.ledger.history(user.id, 10).await.unwrap().is_empty());

    // Joins still work on balances at the top of the range.
    let tournament = fx.tournament(user.id, 10).await;
    let team_id = fx.team(user.id).await;
    let receipt = fx
        .ledger
        .join_tournament(JoinRequest {
            user_id: user.id,
            tournament_id: tournament.id,
            team_id,
            entry_fee: tournament.entry_fee,
        })
        .await
        .unwrap();
    assert_eq!(receipt.balances.deposit, Decimal::MAX - dec(10));
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let fx = Fixture::new();
    let user = fx.store.seed_user("historian", balances(0, 0, 0)).await;
    let tournament = fx.tournament(user.id, 30).await;
    let team_id = fx.team(user.id).await;

    fx.ledger.deposit(user.id, dec(50)).await.unwrap();
    fx.ledger
        .join_tournament(JoinRequest {
            user_id: user.id,
            tournament_id: tournament.id,
            team_id,
            entry_fee: tournament.entry_fee,
        })
        .await
        .unwrap();

    let history = fx.ledger.history(user.id, DEFAULT_HISTORY_LIMIT).await.unwrap();
    let kinds: Vec<_> = history.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![TransactionKind::TournamentEntry, TransactionKind::Deposit]);

    assert_eq!(fx.ledger.history(user.id, 1).await.unwrap().len(), 1);
    assert!(matches!(
        fx.ledger.history(404, 10).await,
        Err(LedgerError::NotFound(Entity::User(404)))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_never_overdraw() {
    let fx = Fixture::new();
    let user = fx.store.seed_user("racer", balances(150, 0, 3)).await;
    let team_id = fx.team(user.id).await;

    let mut tournament_ids = Vec::new();
    for _ in 0..4 {
        tournament_ids.push(fx.tournament(user.id, 100).await.id);
    }

    let user_id = user.id;
    let handles: Vec<_> = tournament_ids
        .iter()
        .map(|&tournament_id| {
            let ledger = fx.ledger.clone();
            tokio::spawn(async move {
                ledger
                    .join_tournament(JoinRequest {
                        user_id,
                        tournament_id,
                        team_id,
                        entry_fee: dec(100),
                    })
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(LedgerError::InsufficientFunds { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(succeeded, 1);
    let after = fx.store.balances(user.id).await.unwrap().unwrap();
    assert_eq!(after, balances(50, 0, 1));
    assert!(after.is_non_negative());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_last_team_slot_goes_to_exactly_one_team() {
    let fx = Fixture::new();
    let host = fx.store.seed_user("organizer", balances(0, 0, 0)).await;
    let tournament = fx.tournament_on(host.id, GameMap::Sanhok, 10).await;
    let tournament_id = tournament.id;
    assert_eq!(tournament.max_team_join, 13);

    for i in 0..12 {
        let user = fx.store.seed_user(&format!("early_{i}"), balances(10, 0, 0)).await;
        let team_id = fx.team(user.id).await;
        fx.ledger
            .join_tournament(JoinRequest {
                user_id: user.id,
                tournament_id,
                team_id,
                entry_fee: dec(10),
            })
            .await
            .unwrap();
    }

    let mut contenders = Vec::new();
    for i in 0..8 {
        let user = fx.store.seed_user(&format!("late_{i}"), balances(10, 0, 0)).await;
        contenders.push((user.id, fx.team(user.id).await));
    }

    let barrier = Arc::new(Barrier::new(contenders.len()));
    let handles: Vec<_> = contenders
        .iter()
        .map(|&(user_id, team_id)| {
            let ledger = fx.ledger.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                ledger
                    .join_tournament(JoinRequest {
                        user_id,
                        tournament_id,
                        team_id,
                        entry_fee: dec(10),
                    })
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(LedgerError::TournamentFull(id)) => {
                assert_eq!(id, tournament_id);
                rejected += 1;
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(rejected, 7);
    assert_eq!(fx.tournaments.tournament(tournament_id).await.unwrap().teams.len(), 13);
    assert_eq!(fx.tournaments.participants(tournament_id).await.unwrap().len(), 13);

    // Only the winner paid.
    let mut charged = 0;
    for &(user_id, _) in &contenders {
        if fx.ledger.balances(user_id).await.unwrap().deposit.is_zero() {
            charged += 1;
        }
    }
    assert_eq!(charged, 1);
}

#[tokio::test]
async fn test_full_tournament_still_admits_registered_team() {
    let fx = Fixture::new();
    let host = fx.store.seed_user("captain", balances(0, 0, 0)).await;
    let tournament = fx.tournament_on(host.id, GameMap::Livik, 0).await;
    let host_team = fx.team(host.id).await;

    let request = |user_id, team_id| JoinRequest {
        user_id,
        tournament_id: tournament.id,
        team_id,
        entry_fee: Decimal::ZERO,
    };

    fx.ledger.join_tournament(request(host.id, host_team)).await.unwrap();
    for i in 1..13 {
        let user = fx.store.seed_user(&format!("filler_{i}"), balances(0, 0, 0)).await;
        let team_id = fx.team(user.id).await;
        fx.ledger.join_tournament(request(user.id, team_id)).await.unwrap();
    }

    let outsider = fx.store.seed_user("outsider", balances(0, 0, 0)).await;
    let outsider_team = fx.team(outsider.id).await;
    let err = fx
        .ledger
        .join_tournament(request(outsider.id, outsider_team))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::TournamentFull(_)));

    // Registered teams keep their slot for teammates.
    let mate = fx.store.seed_user("second", balances(0, 0, 0)).await;
    fx.ledger.join_tournament(request(mate.id, host_team)).await.unwrap();
    assert_eq!(fx.tournaments.tournament(tournament.id).await.unwrap().teams.len(), 13);
}
