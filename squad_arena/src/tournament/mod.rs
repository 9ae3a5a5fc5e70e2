//! Tournament module for paid squad matches.
//!
//! This module provides:
//! - Tournament creation with map-derived team capacity
//! - Lookup and listing by lifecycle stage
//! - Lifecycle transitions (upcoming, ongoing, completed)
//!
//! ## Example
//!
//! ```no_run
//! use squad_arena::db::MemoryStore;
//! use squad_arena::tournament::{CreateTournamentRequest, GameMap, TournamentManager};
//! use squad_arena::wallet::WalletBalances;
//! use chrono::{Duration, Utc};
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let host = store.seed_user("host", WalletBalances::default()).await;
//!     let tournaments = TournamentManager::new(store);
//!
//!     let start = Utc::now() + Duration::days(1);
//!     let tournament = tournaments
//!         .create_tournament(CreateTournamentRequest {
//!             name: "Sunday Scrims".to_string(),
//!             entry_fee: Decimal::new(50, 0),
//!             prize: Decimal::new(1000, 0),
//!             per_kill: Decimal::new(5, 0),
//!             map: GameMap::Erangel,
//!             mode: "SQUAD".to_string(),
//!             start_date: start,
//!             end_date: start + Duration::hours(1),
//!             banner_image: None,
//!             host_name: "Arena Host".to_string(),
//!             host_link: None,
//!             created_by: host.id,
//!         })
//!         .await?;
//!     println!("Created tournament {} for {} teams", tournament.id, tournament.max_team_join);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    CreateTournamentRequest, GameMap, NewTournament, Tournament, TournamentId, TournamentListing,
    TournamentStatus,
};
