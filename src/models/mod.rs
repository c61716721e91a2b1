//! Data structures for the tournament: players, matches, rounds, events.

mod event;
mod game;
mod player;

pub use event::{Event, EventError, EventId, TournamentFormat};
pub use game::{GameMatch, MatchId, Round};
pub use player::{Player, PlayerId};
