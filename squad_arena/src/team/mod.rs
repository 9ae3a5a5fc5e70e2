//! Team module: squads that register for tournaments together.
//!
//! Teams are created with an explicitly generated invite code; other users
//! join by presenting that code. The entry workflow relies on
//! [`TeamManager::verify_membership`] before any funds move.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{TeamError, TeamResult};
pub use manager::TeamManager;
pub use models::{
    CreateTeamRequest, DEFAULT_TEAM_LOGO, NewTeam, Team, TeamId, TeamMember, TeamMembership,
    TeamRole,
};
