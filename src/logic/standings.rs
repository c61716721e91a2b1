//! Standings: per-player statistics computed from completed matches, sorted
//! by a configurable list of criteria.

use crate::models::{GameMatch, Player};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Statistics view of one player, derived from completed matches only.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player: Player,
    /// Matches won (both members of the winning team get one).
    pub wins: u32,
    /// Games (points) won across all matches played.
    pub total_games_won: u32,
    pub total_games_lost: u32,
    /// `total_games_won - total_games_lost`.
    pub game_balance: i64,
    pub matches_played: u32,
}

/// One sortable field of [`PlayerStats`]. Each criterion ranks "better"
/// first: more wins, higher balance, more games won, fewer games lost.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortCriterion {
    Wins,
    GameBalance,
    TotalGamesWon,
    TotalGamesLost,
}

/// Default ranking: wins, then game balance, then games won, then games lost.
pub const DEFAULT_CRITERIA: [SortCriterion; 4] = [
    SortCriterion::Wins,
    SortCriterion::GameBalance,
    SortCriterion::TotalGamesWon,
    SortCriterion::TotalGamesLost,
];

/// Compute stats for every rostered player from the given matches.
/// Uncompleted matches are ignored. Output order follows `criteria`, falling
/// back to roster order for full ties.
pub fn compute_standings(
    players: &[Player],
    matches: &[GameMatch],
    criteria: &[SortCriterion],
) -> Vec<PlayerStats> {
    let mut stats: Vec<PlayerStats> = players
        .iter()
        .map(|p| PlayerStats {
            player: p.clone(),
            wins: 0,
            total_games_won: 0,
            total_games_lost: 0,
            game_balance: 0,
            matches_played: 0,
        })
        .collect();

    for m in matches {
        if !m.completed {
            continue;
        }
        let team_1_won = m.score_1 > m.score_2;
        let team_2_won = m.score_2 > m.score_1;
        for s in stats.iter_mut() {
            let id = s.player.id;
            let (own, other, won) = if m.team_1.contains(&id) {
                (m.score_1, m.score_2, team_1_won)
            } else if m.team_2.contains(&id) {
                (m.score_2, m.score_1, team_2_won)
            } else {
                continue;
            };
            s.matches_played += 1;
            s.total_games_won += own;
            s.total_games_lost += other;
            if won {
                s.wins += 1;
            }
        }
    }

    for s in stats.iter_mut() {
        s.game_balance = i64::from(s.total_games_won) - i64::from(s.total_games_lost);
    }

    stats.sort_by(|a, b| compare(a, b, criteria));
    stats
}

fn compare(a: &PlayerStats, b: &PlayerStats, criteria: &[SortCriterion]) -> Ordering {
    for c in criteria {
        let ord = match c {
            SortCriterion::Wins => b.wins.cmp(&a.wins),
            SortCriterion::GameBalance => b.game_balance.cmp(&a.game_balance),
            SortCriterion::TotalGamesWon => b.total_games_won.cmp(&a.total_games_won),
            SortCriterion::TotalGamesLost => a.total_games_lost.cmp(&b.total_games_lost),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
