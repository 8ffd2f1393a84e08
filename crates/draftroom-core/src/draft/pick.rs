// Ledger entries: recorded picks and skipped slots.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity recorded as `made_by` for selections the autopick resolver makes.
pub const AUTO_ACTOR: &str = "auto";

/// What occupies a filled overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A player was selected.
    Pick,
    /// The clock expired and nothing could be selected.
    Skip,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Pick => "pick",
            EntryKind::Skip => "skip",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pick" => Ok(EntryKind::Pick),
            "skip" => Ok(EntryKind::Skip),
            other => Err(format!("unknown ledger entry kind '{other}'")),
        }
    }
}

/// One append-only ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    pub id: i64,
    pub draft_id: String,
    pub overall: u32,
    pub round: u32,
    pub team: String,
    pub kind: EntryKind,
    /// `None` only for skips.
    pub player_id: Option<String>,
    /// Display label supplied by the caller or copied from the pool.
    pub player_name: Option<String>,
    pub made_by: String,
    pub made_at: DateTime<Utc>,
}

impl DraftPick {
    pub fn is_skip(&self) -> bool {
        self.kind == EntryKind::Skip
    }
}

/// A ledger row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewEntry<'a> {
    pub draft_id: &'a str,
    pub overall: u32,
    pub round: u32,
    pub team: &'a str,
    pub kind: EntryKind,
    pub player_id: Option<&'a str>,
    pub player_name: Option<&'a str>,
    pub made_by: &'a str,
    pub made_at: DateTime<Utc>,
}

/// What a successful pick recorded and where the draft went next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickReceipt {
    pub overall: u32,
    pub round: u32,
    pub team: String,
    pub player_id: String,
    pub player_name: Option<String>,
    pub made_by: String,
    /// Next overall on the clock, or `None` if this pick completed the draft.
    pub next_overall: Option<u32>,
}

impl PickReceipt {
    pub fn completed_draft(&self) -> bool {
        self.next_overall.is_none()
    }
}

/// The entry an undo removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoReceipt {
    pub removed: DraftPick,
    /// The overall now on the clock (equal to `removed.overall`).
    pub cur_overall: u32,
}
