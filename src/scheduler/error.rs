//! Scheduler error/state signals.

/// Outcome signals from the pairing engine.
///
/// `Exhausted` is not a failure: it is the terminal state of a tournament in
/// which every partnership has already been scheduled. Callers must present
/// it differently from `Failed`, which is transient and worth retrying.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SchedulingError {
    /// Roster length is neither 8 nor 12.
    UnsupportedRosterSize { found: usize },
    /// All partnerships already used; the tournament is complete.
    Exhausted,
    /// No valid pairing found within the retry bound despite unused pairs remaining.
    Failed,
}

impl std::fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulingError::UnsupportedRosterSize { found } => write!(
                f,
                "This system supports only 8 or 12 players (Super 8 or Super 12), got {}",
                found
            ),
            SchedulingError::Exhausted => {
                write!(f, "All partnerships have been played; the tournament is complete")
            }
            SchedulingError::Failed => {
                write!(f, "Could not find a valid combination of teams, try again")
            }
        }
    }
}

impl std::error::Error for SchedulingError {}
