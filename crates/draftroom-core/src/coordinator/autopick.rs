// Clock-expiry resolution: queue first, then the ranked pool, then a skip.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::apply::{apply_pick, PickTeam};
use super::{commit_head, load_head, DraftCoordinator};
use crate::clock::Clock;
use crate::db::picks::{self, InsertOutcome};
use crate::db::{drafts, pool, queues};
use crate::draft::pick::{EntryKind, NewEntry, AUTO_ACTOR};
use crate::draft::state::HeadCommand;
use crate::error::{DraftError, DraftResult};

/// Where an autopick selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickSource {
    Queue,
    Pool,
}

/// What a single autopick check did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AutopickOutcome {
    /// The draft is not live or the clock has not expired.
    NotDue,
    Picked {
        overall: u32,
        team: String,
        player_id: String,
        player_name: Option<String>,
        source: PickSource,
    },
    /// Nothing was selectable; the slot was recorded as skipped.
    Skipped { overall: u32, team: String },
    /// The slot was already filled in the ledger. Nothing was written.
    AlreadyPicked { cur_overall: u32 },
}

impl AutopickOutcome {
    /// True when this call recorded a player.
    pub fn picked(&self) -> bool {
        matches!(self, AutopickOutcome::Picked { .. })
    }

    /// The rejection to surface to callers, if any. Only skips carry one.
    pub fn error(&self) -> Option<DraftError> {
        match self {
            AutopickOutcome::Skipped { overall, team } => Some(DraftError::NoAvailablePlayer {
                team: team.clone(),
                overall: *overall,
            }),
            _ => None,
        }
    }
}

impl<C: Clock> DraftCoordinator<C> {
    /// Resolve the on-clock slot if its deadline has passed.
    ///
    /// Safe to call from any number of callers at once: exactly one of them
    /// fills the slot. Writers are serialized, so the rest normally re-read
    /// the advanced head and report [`AutopickOutcome::NotDue`]. A write that
    /// still collides with the ledger (a head left behind it) rolls back and
    /// reports [`AutopickOutcome::AlreadyPicked`].
    pub fn check_autopick(&self, draft_id: &str) -> DraftResult<AutopickOutcome> {
        let now = self.clock.now();
        match self.db.write(|tx| resolve_expired(tx, draft_id, now)) {
            Err(DraftError::PlayerTaken { .. }) | Err(DraftError::StaleState { .. }) => {
                let head = self.get_draft(draft_id)?;
                warn!(
                    "Draft {}: autopick lost a race; now at overall {}",
                    draft_id, head.cur_overall
                );
                Ok(AutopickOutcome::AlreadyPicked {
                    cur_overall: head.cur_overall,
                })
            }
            other => other,
        }
    }
}

fn resolve_expired(
    conn: &Connection,
    draft_id: &str,
    now: DateTime<Utc>,
) -> DraftResult<AutopickOutcome> {
    let head = load_head(conn, draft_id)?;
    if !head.is_expired(now) {
        debug!("Draft {}: autopick not due ({})", draft_id, head.status);
        return Ok(AutopickOutcome::NotDue);
    }

    let slot = drafts::load_slot(conn, draft_id, head.cur_overall)?.ok_or(DraftError::NoSlot {
        overall: head.cur_overall,
    })?;
    let on_clock = PickTeam::Forced(Some(slot.team.as_str()));

    if let Some(entry) = queues::first_undrafted(conn, draft_id, &slot.team)? {
        let receipt = apply_pick(conn, draft_id, &entry.player_id, None, on_clock, AUTO_ACTOR, now)?;
        queues::remove_entry(conn, draft_id, &slot.team, entry.rank)?;
        info!(
            "Draft {}: autopicked {} for {} from queue rank {}",
            draft_id, receipt.player_id, receipt.team, entry.rank
        );
        return Ok(AutopickOutcome::Picked {
            overall: receipt.overall,
            team: receipt.team,
            player_id: receipt.player_id,
            player_name: receipt.player_name,
            source: PickSource::Queue,
        });
    }

    if let Some(best) = pool::available(conn, draft_id, Some(1))?.into_iter().next() {
        let receipt = apply_pick(
            conn,
            draft_id,
            &best.player_id,
            Some(&best.name),
            on_clock,
            AUTO_ACTOR,
            now,
        )?;
        info!(
            "Draft {}: autopicked {} for {} from pool (rank {:?})",
            draft_id, receipt.player_id, receipt.team, best.rank
        );
        return Ok(AutopickOutcome::Picked {
            overall: receipt.overall,
            team: receipt.team,
            player_id: receipt.player_id,
            player_name: receipt.player_name,
            source: PickSource::Pool,
        });
    }

    let skip = NewEntry {
        draft_id,
        overall: slot.overall,
        round: slot.round,
        team: &slot.team,
        kind: EntryKind::Skip,
        player_id: None,
        player_name: None,
        made_by: AUTO_ACTOR,
        made_at: now,
    };
    if !matches!(picks::insert_entry(conn, &skip)?, InsertOutcome::Inserted(_)) {
        return Err(DraftError::StaleState {
            draft_id: draft_id.to_string(),
        });
    }
    let next_open = drafts::first_open_overall(conn, draft_id, slot.overall)?;
    commit_head(conn, head.apply(HeadCommand::Advance { next_open }, now)?)?;

    warn!(
        "Draft {}: no available player for {} at #{}; slot skipped",
        draft_id, slot.team, slot.overall
    );
    Ok(AutopickOutcome::Skipped {
        overall: slot.overall,
        team: slot.team,
    })
}
