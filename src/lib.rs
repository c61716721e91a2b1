//! Beach tennis tournament web app: Super 8 / Super 12 doubles scheduling,
//! score tracking, and standings.

pub mod logic;
pub mod models;
pub mod scheduler;

pub use logic::{compute_standings, PlayerStats, SortCriterion, DEFAULT_CRITERIA};
pub use models::{
    Event, EventError, EventId, GameMatch, MatchId, Player, PlayerId, Round, TournamentFormat,
};
pub use scheduler::{
    generate_all_rounds, generate_round, total_pairs, PairKey, PairLedger, SchedulingError,
};
