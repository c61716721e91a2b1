//! Business logic around the scheduler: standings computation.

mod standings;

pub use standings::{compute_standings, PlayerStats, SortCriterion, DEFAULT_CRITERIA};
