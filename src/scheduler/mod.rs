//! Round-robin pairing scheduler for Super 8 / Super 12 doubles play.

mod engine;
mod error;
mod ledger;

pub use engine::{generate_all_rounds, generate_round};
pub use error::SchedulingError;
pub use ledger::{total_pairs, PairKey, PairLedger};
