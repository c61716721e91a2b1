//! Partnership and opposition ledger.
//!
//! Tracks which unordered pairs of players have partnered (ever) and how
//! often each pair has opposed. The ledger is rebuilt from match history on
//! every scheduling call, so it is always recomputable and never drifts from
//! the matches it was derived from.

use crate::models::{GameMatch, PlayerId};
use std::collections::{HashMap, HashSet};

/// Canonical key for an unordered pair of players: `PairKey::new(a, b)`
/// equals `PairKey::new(b, a)`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PairKey(PlayerId, PlayerId);

impl PairKey {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Total number of unordered pairs among `n` players.
pub fn total_pairs(n: usize) -> usize {
    n * (n - 1) / 2
}

/// Partnership and opposition history for one roster.
///
/// `used` only grows; the only way to shrink it is to build a fresh ledger
/// from a smaller history (full tournament reset).
#[derive(Clone, Debug, Default)]
pub struct PairLedger {
    used: HashSet<PairKey>,
    oppositions: HashMap<PairKey, u32>,
}

impl PairLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the ledger from match history. Both completed and still-scheduled
    /// matches count: a scheduled partnership must not be offered again.
    pub fn from_matches(matches: &[GameMatch]) -> Self {
        let mut ledger = Self::new();
        for m in matches {
            ledger.record_match(m);
        }
        ledger
    }

    /// Register one match: two partnerships and four cross-team oppositions.
    pub fn record_match(&mut self, m: &GameMatch) {
        self.record_partnership(m.team_1[0], m.team_1[1]);
        self.record_partnership(m.team_2[0], m.team_2[1]);
        for &a in &m.team_1 {
            for &b in &m.team_2 {
                self.record_opposition(a, b);
            }
        }
    }

    /// Mark a partnership as used. Returns false if it already was.
    pub fn record_partnership(&mut self, a: PlayerId, b: PlayerId) -> bool {
        self.used.insert(PairKey::new(a, b))
    }

    pub fn record_opposition(&mut self, a: PlayerId, b: PlayerId) {
        *self.oppositions.entry(PairKey::new(a, b)).or_insert(0) += 1;
    }

    pub fn partnership_used(&self, a: PlayerId, b: PlayerId) -> bool {
        self.used.contains(&PairKey::new(a, b))
    }

    /// How many times two players have faced each other across the net.
    pub fn opposition_count(&self, a: PlayerId, b: PlayerId) -> u32 {
        self.oppositions
            .get(&PairKey::new(a, b))
            .copied()
            .unwrap_or(0)
    }

    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Completion oracle: true iff every possible partnership among
    /// `roster_len` players has been used. Pure and idempotent.
    pub fn is_complete(&self, roster_len: usize) -> bool {
        self.used.len() >= total_pairs(roster_len)
    }
}
