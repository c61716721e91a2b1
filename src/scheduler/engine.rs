//! Pairing engine: schedules doubles matches so that no two players partner
//! together more than once, with opposition variety as a secondary goal.
//!
//! Two generation modes:
//! - [`generate_round`]: one round at a time, shuffle-and-scan with a bounded
//!   retry loop and a best-effort fallback.
//! - [`generate_all_rounds`]: the whole remaining tournament at once. From a
//!   clean slate this uses a round-robin decomposition (circle method), which
//!   guarantees every partnership occurs exactly once across `n - 1` rounds;
//!   opposition counts then decide which teams face each other inside a
//!   round. With prior history the rounds are filled greedily from the
//!   remaining unused pairs instead, and a round that cannot be completed is
//!   emitted short rather than aborting the whole generation.
//!
//! The engine is pure with respect to its inputs: the ledger is rebuilt from
//! `history` on every call and nothing is committed on failure. Callers pass
//! their own [`Rng`] so schedules are reproducible in tests.

use crate::models::{GameMatch, Player, PlayerId, Round};
use crate::scheduler::error::SchedulingError;
use crate::scheduler::ledger::PairLedger;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Shuffle-and-scan attempts before giving up on a full round.
const MAX_ATTEMPTS: usize = 10;

/// Reject rosters that are not exactly 8 or 12 players.
fn check_roster(roster: &[Player]) -> Result<(), SchedulingError> {
    match roster.len() {
        8 | 12 => Ok(()),
        found => Err(SchedulingError::UnsupportedRosterSize { found }),
    }
}

/// Generate one round of matches for `roster`, avoiding every partnership
/// present in `history`.
///
/// 1. Shuffle the roster; greedily take the first unused pair whose members
///    are still free this round; repeat until `n / 2` teams are formed.
/// 2. Teams pair off sequentially into matches (1&2, 3&4, ...).
/// 3. On a dead end, reshuffle and retry up to a fixed bound; after that,
///    fall back to scheduling as many valid matches as the remaining unused
///    pairs allow. Only a completely empty result is a failure.
pub fn generate_round(
    roster: &[Player],
    history: &[GameMatch],
    round_number: u32,
    rng: &mut impl Rng,
) -> Result<Vec<GameMatch>, SchedulingError> {
    check_roster(roster)?;
    let ledger = PairLedger::from_matches(history);
    if ledger.is_complete(roster.len()) {
        return Err(SchedulingError::Exhausted);
    }

    let num_teams = roster.len() / 2;
    let mut ids: Vec<PlayerId> = roster.iter().map(|p| p.id).collect();

    for _ in 0..MAX_ATTEMPTS {
        ids.shuffle(rng);
        if let Some(teams) = scan_teams(&ids, &ledger, num_teams) {
            return Ok(teams_into_matches(&teams, round_number));
        }
    }

    let matches = best_effort_round(&ids, &ledger, round_number, rng);
    if matches.is_empty() {
        return Err(SchedulingError::Failed);
    }
    log::warn!(
        "round {}: only {} of {} matches could be scheduled from the remaining pairs",
        round_number,
        matches.len(),
        num_teams / 2
    );
    Ok(matches)
}

/// Greedy scan over unordered pairs in `ids` order. Selected players go into
/// an exclusion set rather than being spliced out of the pool, so iteration
/// never invalidates indices. Returns `None` when no unused pair remains
/// before `num_teams` teams are formed.
fn scan_teams(
    ids: &[PlayerId],
    ledger: &PairLedger,
    num_teams: usize,
) -> Option<Vec<[PlayerId; 2]>> {
    let mut taken: HashSet<PlayerId> = HashSet::new();
    let mut teams: Vec<[PlayerId; 2]> = Vec::with_capacity(num_teams);

    while teams.len() < num_teams {
        let mut found = None;
        'scan: for (i, &a) in ids.iter().enumerate() {
            if taken.contains(&a) {
                continue;
            }
            for &b in &ids[i + 1..] {
                if taken.contains(&b) || ledger.partnership_used(a, b) {
                    continue;
                }
                found = Some([a, b]);
                break 'scan;
            }
        }
        let pair = found?;
        taken.insert(pair[0]);
        taken.insert(pair[1]);
        teams.push(pair);
    }
    Some(teams)
}

/// Sequential team pairing: teams 1&2 form match A, 3&4 match B, ...
/// All four players per match are distinct because teams never share members.
fn teams_into_matches(teams: &[[PlayerId; 2]], round_number: u32) -> Vec<GameMatch> {
    teams
        .chunks_exact(2)
        .map(|pair| GameMatch::new(pair[0], pair[1], round_number))
        .collect()
}

/// Degraded mode: when a full round is infeasible, schedule whatever the
/// unused-pair inventory still allows. Pairs are taken greedily in shuffled
/// order, each player at most once, then combined two at a time.
fn best_effort_round(
    ids: &[PlayerId],
    ledger: &PairLedger,
    round_number: u32,
    rng: &mut impl Rng,
) -> Vec<GameMatch> {
    let mut unused = unused_pairs(ids, ledger);
    unused.shuffle(rng);

    let mut taken: HashSet<PlayerId> = HashSet::new();
    let mut teams: Vec<[PlayerId; 2]> = Vec::new();
    for pair in unused {
        if taken.contains(&pair[0]) || taken.contains(&pair[1]) {
            continue;
        }
        taken.insert(pair[0]);
        taken.insert(pair[1]);
        teams.push(pair);
    }
    teams_into_matches(&teams, round_number)
}

/// All unordered pairs of `ids` whose partnership has not been used yet.
fn unused_pairs(ids: &[PlayerId], ledger: &PairLedger) -> Vec<[PlayerId; 2]> {
    let mut pairs = Vec::new();
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            if !ledger.partnership_used(a, b) {
                pairs.push([a, b]);
            }
        }
    }
    pairs
}

/// Generate the full remaining schedule: `n - 1` rounds of `n / 4` matches,
/// numbered from 1.
///
/// With no prior partnerships this is a round-robin decomposition, so every
/// pair partners exactly once and every round is full. With prior history the
/// remaining pairs are placed greedily; a round that cannot reach its match
/// count is emitted short with a logged warning.
pub fn generate_all_rounds(
    roster: &[Player],
    history: &[GameMatch],
    rng: &mut impl Rng,
) -> Result<Vec<Round>, SchedulingError> {
    check_roster(roster)?;
    let mut ledger = PairLedger::from_matches(history);
    if ledger.is_complete(roster.len()) {
        return Err(SchedulingError::Exhausted);
    }

    let ids: Vec<PlayerId> = roster.iter().map(|p| p.id).collect();
    if ledger.used_count() == 0 {
        Ok(round_robin_rounds(&ids, &mut ledger, rng))
    } else {
        Ok(greedy_rounds(&ids, &mut ledger, rng))
    }
}

/// Circle-method decomposition of all partnerships into `n - 1` perfect
/// rounds: one player stays fixed, the rest rotate one step per round. The
/// roster is shuffled first so every draw produces a different schedule.
/// Within each round, teams are matched against each other by lowest summed
/// opposition count, accumulated across the rounds generated so far.
fn round_robin_rounds(ids: &[PlayerId], ledger: &mut PairLedger, rng: &mut impl Rng) -> Vec<Round> {
    let mut seats: Vec<PlayerId> = ids.to_vec();
    seats.shuffle(rng);

    let n = seats.len();
    let fixed = seats[n - 1];
    let ring = &seats[..n - 1];
    let m = n - 1;

    let mut rounds = Vec::with_capacity(m);
    for r in 0..m {
        let mut teams: Vec<[PlayerId; 2]> = Vec::with_capacity(n / 2);
        teams.push([fixed, ring[r]]);
        for k in 1..n / 2 {
            teams.push([ring[(r + k) % m], ring[(r + m - k) % m]]);
        }

        let number = (r + 1) as u32;
        let mut matches = Vec::with_capacity(n / 4);
        let mut remaining = teams;
        while remaining.len() >= 2 {
            let team = remaining.remove(0);
            let best = lowest_opposition_opponent(&team, &remaining, ledger);
            let opponent = remaining.remove(best);
            let game = GameMatch::new(team, opponent, number);
            ledger.record_match(&game);
            matches.push(game);
        }
        rounds.push(Round { number, matches });
    }
    rounds
}

/// Index into `candidates` of the team whose members have opposed `team`'s
/// members the fewest times in total. Ties go to the first candidate.
fn lowest_opposition_opponent(
    team: &[PlayerId; 2],
    candidates: &[[PlayerId; 2]],
    ledger: &PairLedger,
) -> usize {
    let mut best = 0;
    let mut best_cost = u32::MAX;
    for (i, other) in candidates.iter().enumerate() {
        let cost = cross_opposition(team, other, ledger);
        if cost < best_cost {
            best_cost = cost;
            best = i;
        }
    }
    best
}

/// Sum of pairwise opposition counts between the members of two teams.
fn cross_opposition(a: &[PlayerId; 2], b: &[PlayerId; 2], ledger: &PairLedger) -> u32 {
    a.iter()
        .map(|&x| b.iter().map(|&y| ledger.opposition_count(x, y)).sum::<u32>())
        .sum()
}

/// History-aware fallback: fill `n - 1` rounds greedily from the remaining
/// unused pairs, always taking the two free pairs with the lowest summed
/// cross opposition. Rounds that come up short are kept as-is.
fn greedy_rounds(ids: &[PlayerId], ledger: &mut PairLedger, rng: &mut impl Rng) -> Vec<Round> {
    let matches_per_round = ids.len() / 4;
    let total_rounds = ids.len() - 1;

    // Shuffled once so tie-breaking is stable within one call but differs
    // between draws (and is reproducible for a seeded rng).
    let mut pool = unused_pairs(ids, ledger);
    pool.shuffle(rng);

    let mut rounds = Vec::with_capacity(total_rounds);
    for number in 1..=total_rounds as u32 {
        let mut used_this_round: HashSet<PlayerId> = HashSet::new();
        let mut matches = Vec::with_capacity(matches_per_round);
        while matches.len() < matches_per_round {
            let Some((t1, t2)) = best_pool_combination(&pool, ledger, &used_this_round) else {
                break;
            };
            let game = GameMatch::new(t1, t2, number);
            for id in game.player_ids() {
                used_this_round.insert(id);
            }
            ledger.record_match(&game);
            matches.push(game);
        }
        if matches.len() < matches_per_round {
            log::warn!(
                "round {}: scheduled {} of {} matches, remaining pairs do not combine",
                number,
                matches.len(),
                matches_per_round
            );
        }
        rounds.push(Round { number, matches });
    }
    rounds
}

/// Best pair of pairs from the pool: both unused, both free this round, four
/// distinct members, minimal summed cross opposition. Scan order breaks ties.
fn best_pool_combination(
    pool: &[[PlayerId; 2]],
    ledger: &PairLedger,
    used_this_round: &HashSet<PlayerId>,
) -> Option<([PlayerId; 2], [PlayerId; 2])> {
    let free = |p: &[PlayerId; 2]| {
        !ledger.partnership_used(p[0], p[1])
            && !used_this_round.contains(&p[0])
            && !used_this_round.contains(&p[1])
    };

    let mut best: Option<([PlayerId; 2], [PlayerId; 2])> = None;
    let mut best_cost = u32::MAX;
    for (i, a) in pool.iter().enumerate() {
        if !free(a) {
            continue;
        }
        for b in &pool[i + 1..] {
            if !free(b) {
                continue;
            }
            if a.contains(&b[0]) || a.contains(&b[1]) {
                continue;
            }
            let cost = cross_opposition(a, b, ledger);
            if cost < best_cost {
                best_cost = cost;
                best = Some((*a, *b));
            }
        }
    }
    best
}
