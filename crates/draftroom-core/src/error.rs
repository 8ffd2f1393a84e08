// Typed rejections returned by every coordinator operation.

use thiserror::Error;

use crate::draft::state::DraftStatus;

/// Every way a coordinator operation can decline to act.
///
/// All variants except [`DraftError::Storage`] are local and recoverable: the
/// caller re-fetches the overview and may retry. Storage failures are carried
/// opaquely and are safe to retry in full because every operation re-derives
/// its decision from persisted state.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("player {player_id} has already been drafted")]
    PlayerTaken { player_id: String },

    #[error("no slot exists at overall {overall}")]
    NoSlot { overall: u32 },

    #[error("draft is not live (status {status})")]
    NotLive { status: DraftStatus },

    #[error("team {team} is not on the clock (slot {overall} belongs to {on_clock})")]
    NotOnClock {
        team: String,
        on_clock: String,
        overall: u32,
    },

    #[error("no team could be resolved for the current slot")]
    NoTeam,

    #[error("draft has no recorded picks")]
    NoPicks,

    #[error("no available player for team {team} at overall {overall}")]
    NoAvailablePlayer { team: String, overall: u32 },

    #[error("draft {draft_id} does not exist")]
    NoDraft { draft_id: String },

    #[error("cannot {action} a draft that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: DraftStatus,
    },

    #[error("invalid draft definition: {0}")]
    InvalidDefinition(String),

    #[error("overall {requested} is not the most recent pick (last is {last})")]
    NotLastPick { requested: u32, last: u32 },

    #[error("draft {draft_id} was modified concurrently")]
    StaleState { draft_id: String },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl DraftError {
    /// Stable, transport-agnostic code for this rejection.
    pub fn code(&self) -> &'static str {
        match self {
            DraftError::PlayerTaken { .. } => "player_taken",
            DraftError::NoSlot { .. } => "no_slot",
            DraftError::NotLive { .. } => "not_live",
            DraftError::NotOnClock { .. } => "not_on_clock",
            DraftError::NoTeam => "no_team",
            DraftError::NoPicks => "no_picks",
            DraftError::NoAvailablePlayer { .. } => "no_available_player",
            DraftError::NoDraft { .. } => "no_draft",
            DraftError::InvalidTransition { .. } => "invalid_transition",
            DraftError::InvalidDefinition(_) => "invalid_definition",
            DraftError::NotLastPick { .. } => "not_last_pick",
            DraftError::StaleState { .. } => "stale_state",
            DraftError::Storage(_) => "storage",
        }
    }

    /// Whether repeating the exact same call can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DraftError::StaleState { .. } | DraftError::Storage(_))
    }
}

impl From<rusqlite::Error> for DraftError {
    fn from(e: rusqlite::Error) -> Self {
        DraftError::Storage(e.into())
    }
}

pub type DraftResult<T> = Result<T, DraftError>;
