//! Match and Round data structures for 2v2 doubles play.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// A single doubles match: two teams of two players each.
///
/// The four player ids are pairwise distinct. Created by the scheduler with
/// zero scores and `completed = false`; score entry sets the scores and flips
/// `completed` exactly once. Later score edits keep the match completed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    /// Team 1 player ids, in draw order (display); unordered for pairing checks.
    pub team_1: [PlayerId; 2],
    /// Team 2 player ids.
    pub team_2: [PlayerId; 2],
    pub score_1: u32,
    pub score_2: u32,
    /// Round this match belongs to (1-based).
    pub round: u32,
    pub completed: bool,
    /// Group tag for the bracket format variant; unused in Super 8/12 play.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl GameMatch {
    /// Create a freshly scheduled match with zero scores.
    pub fn new(team_1: [PlayerId; 2], team_2: [PlayerId; 2], round: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_1,
            team_2,
            score_1: 0,
            score_2: 0,
            round,
            completed: false,
            group_id: None,
        }
    }

    /// All four participant ids, team 1 first.
    pub fn player_ids(&self) -> [PlayerId; 4] {
        [self.team_1[0], self.team_1[1], self.team_2[0], self.team_2[1]]
    }

    /// True if the given player plays in this match (either team).
    pub fn involves(&self, id: PlayerId) -> bool {
        self.team_1.contains(&id) || self.team_2.contains(&id)
    }
}

/// One round of play: a set of matches played concurrently.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number.
    pub number: u32,
    pub matches: Vec<GameMatch>,
}
