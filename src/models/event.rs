//! Event: one named tournament (roster, schedule, history, share code).

use crate::models::game::{GameMatch, MatchId};
use crate::models::player::{Player, PlayerId};
use crate::scheduler::{self, PairLedger, SchedulingError};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an event.
pub type EventId = Uuid;

/// Errors that can occur during event operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EventError {
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// Player name is empty after trimming.
    EmptyPlayerName,
    /// The roster already has as many players as the format allows.
    RosterFull { limit: usize },
    /// Player not found in the roster.
    PlayerNotFound(PlayerId),
    /// Player is referenced by a match and cannot be removed.
    PlayerInMatches(PlayerId),
    /// Match not found in the current schedule or history.
    MatchNotFound(MatchId),
    /// The current round still has unfinished matches.
    RoundInProgress,
    /// The pairing engine rejected or failed the generation.
    Scheduling(SchedulingError),
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventError::DuplicatePlayerName => write!(f, "A player with this name already exists"),
            EventError::EmptyPlayerName => write!(f, "Player name cannot be empty"),
            EventError::RosterFull { limit } => {
                write!(f, "Maximum number of players reached ({limit})")
            }
            EventError::PlayerNotFound(_) => write!(f, "Player not found"),
            EventError::PlayerInMatches(_) => {
                write!(f, "Player already appears in matches and cannot be removed")
            }
            EventError::MatchNotFound(_) => write!(f, "Match not found"),
            EventError::RoundInProgress => {
                write!(f, "Finish all matches of the current round before drawing new ones")
            }
            EventError::Scheduling(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EventError {}

impl From<SchedulingError> for EventError {
    fn from(e: SchedulingError) -> Self {
        EventError::Scheduling(e)
    }
}

/// Supported tournament formats.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    #[default]
    Super8,
    Super12,
}

impl TournamentFormat {
    /// Roster size this format plays with.
    pub fn required_players(self) -> usize {
        match self {
            TournamentFormat::Super8 => 8,
            TournamentFormat::Super12 => 12,
        }
    }
}

/// One tournament event: roster, current schedule, completed history, and a
/// short share code for finding the event from another device.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Share code: 3 letters + 3 digits (e.g. "ABC123"), matched case-insensitively.
    pub code: String,
    pub format: TournamentFormat,
    pub players: Vec<Player>,
    /// Round currently being played or drawn next (1-based).
    pub current_round: u32,
    /// Matches of the current schedule (may span several drawn rounds).
    pub matches: Vec<GameMatch>,
    /// Matches archived after their round finished.
    pub completed_matches: Vec<GameMatch>,
    pub created_at: DateTime<Utc>,
    /// Set once the completion notice has been delivered (edge-triggered).
    #[serde(default)]
    complete_notified: bool,
}

impl Event {
    /// Create a new empty event with a fresh id and share code.
    pub fn new(name: impl Into<String>, format: TournamentFormat, rng: &mut impl Rng) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: Self::generate_code(rng),
            format,
            players: Vec::new(),
            current_round: 1,
            matches: Vec::new(),
            completed_matches: Vec::new(),
            created_at: Utc::now(),
            complete_notified: false,
        }
    }

    /// Random share code: 3 uppercase letters followed by 3 digits.
    pub fn generate_code(rng: &mut impl Rng) -> String {
        const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        const DIGITS: &[u8] = b"0123456789";
        let mut code = String::with_capacity(6);
        for _ in 0..3 {
            code.push(LETTERS[rng.gen_range(0..LETTERS.len())] as char);
        }
        for _ in 0..3 {
            code.push(DIGITS[rng.gen_range(0..DIGITS.len())] as char);
        }
        code
    }

    /// Add a player. Names must be non-empty and unique (case-insensitive),
    /// and the roster is capped at the format's player count.
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<PlayerId, EventError> {
        let limit = self.format.required_players();
        if self.players.len() >= limit {
            return Err(EventError::RosterFull { limit });
        }
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EventError::EmptyPlayerName);
        }
        if self.name_taken(trimmed, None) {
            return Err(EventError::DuplicatePlayerName);
        }
        let player = Player::new(trimmed);
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Remove a player. Only allowed while no match references them.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), EventError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(EventError::PlayerNotFound(player_id))?;
        let referenced = self
            .matches
            .iter()
            .chain(self.completed_matches.iter())
            .any(|m| m.involves(player_id));
        if referenced {
            return Err(EventError::PlayerInMatches(player_id));
        }
        self.players.remove(idx);
        Ok(())
    }

    /// Rename a player. Identity (id) is unchanged, so existing matches keep
    /// referring to them; allowed at any time.
    pub fn rename_player(
        &mut self,
        player_id: PlayerId,
        name: impl Into<String>,
    ) -> Result<(), EventError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EventError::EmptyPlayerName);
        }
        if self.name_taken(trimmed, Some(player_id)) {
            return Err(EventError::DuplicatePlayerName);
        }
        let p = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(EventError::PlayerNotFound(player_id))?;
        p.name = trimmed.to_string();
        Ok(())
    }

    fn name_taken(&self, name: &str, exclude: Option<PlayerId>) -> bool {
        self.players
            .iter()
            .filter(|p| Some(p.id) != exclude)
            .any(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Every match the event knows about: archived history plus the current
    /// schedule. Scheduled-but-unplayed matches count so their partnerships
    /// are never offered again.
    pub fn all_matches(&self) -> Vec<GameMatch> {
        self.completed_matches
            .iter()
            .chain(self.matches.iter())
            .cloned()
            .collect()
    }

    /// Draw the next round of matches with the pairing engine and append it
    /// to the current schedule. The previous round must be finished first.
    pub fn generate_next_round(&mut self, rng: &mut impl Rng) -> Result<&[GameMatch], EventError> {
        if self.matches.iter().any(|m| !m.completed) {
            return Err(EventError::RoundInProgress);
        }
        let history = self.all_matches();
        let generated =
            scheduler::generate_round(&self.players, &history, self.current_round, rng)?;
        let start = self.matches.len();
        self.matches.extend(generated);
        Ok(&self.matches[start..])
    }

    /// Draw every remaining round at once and append the matches to the
    /// current schedule, renumbered to continue from the current round.
    pub fn generate_all_rounds(&mut self, rng: &mut impl Rng) -> Result<&[GameMatch], EventError> {
        if self.matches.iter().any(|m| !m.completed) {
            return Err(EventError::RoundInProgress);
        }
        let history = self.all_matches();
        let rounds = scheduler::generate_all_rounds(&self.players, &history, rng)?;
        let offset = self.current_round - 1;
        let start = self.matches.len();
        for round in rounds {
            for mut m in round.matches {
                m.round += offset;
                self.matches.push(m);
            }
        }
        Ok(&self.matches[start..])
    }

    /// Record (or edit) a score. First submission completes the match; when
    /// every match of the lowest unfinished round is complete, the round is
    /// archived and the round counter advances.
    pub fn record_score(
        &mut self,
        match_id: MatchId,
        score_1: u32,
        score_2: u32,
    ) -> Result<(), EventError> {
        if let Some(m) = self.matches.iter_mut().find(|m| m.id == match_id) {
            m.score_1 = score_1;
            m.score_2 = score_2;
            m.completed = true;
            self.archive_finished_rounds();
            return Ok(());
        }
        // Post-completion edit: scores change, the match stays completed.
        if let Some(m) = self
            .completed_matches
            .iter_mut()
            .find(|m| m.id == match_id)
        {
            m.score_1 = score_1;
            m.score_2 = score_2;
            return Ok(());
        }
        Err(EventError::MatchNotFound(match_id))
    }

    /// Move fully completed leading rounds from the current schedule into the
    /// archive and advance the round counter past them.
    fn archive_finished_rounds(&mut self) {
        loop {
            let round = self.current_round;
            let in_round = self.matches.iter().filter(|m| m.round == round).count();
            if in_round == 0 {
                break;
            }
            let done = self
                .matches
                .iter()
                .filter(|m| m.round == round && m.completed)
                .count();
            if done < in_round {
                break;
            }
            let mut archived: Vec<GameMatch> = Vec::with_capacity(in_round);
            self.matches.retain(|m| {
                if m.round == round {
                    archived.push(m.clone());
                    false
                } else {
                    true
                }
            });
            self.completed_matches.append(&mut archived);
            self.current_round += 1;
        }
    }

    /// Completion oracle: true iff every possible partnership in the roster
    /// has been scheduled or played. Derived from match history on every
    /// call, never cached.
    pub fn is_complete(&self) -> bool {
        if self.players.len() < self.format.required_players() {
            return false;
        }
        let ledger = PairLedger::from_matches(&self.all_matches());
        ledger.is_complete(self.players.len())
    }

    /// One-shot completion notice: true exactly once, the first time the
    /// event is observed complete. Subsequent calls return false until reset.
    pub fn take_completion_notice(&mut self) -> bool {
        if self.complete_notified || !self.is_complete() {
            return false;
        }
        self.complete_notified = true;
        true
    }

    /// Full tournament reset: clears the schedule and history, keeps the
    /// roster. The partnership ledger is implicitly emptied since it is
    /// derived from matches.
    pub fn reset(&mut self) {
        self.matches.clear();
        self.completed_matches.clear();
        self.current_round = 1;
        self.complete_notified = false;
    }
}
