// Recording and reverting picks.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};

use super::{commit_head, load_head, require_team, DraftCoordinator};
use crate::clock::Clock;
use crate::db::picks::{self, InsertOutcome};
use crate::db::{drafts, pool};
use crate::draft::pick::{EntryKind, NewEntry, PickReceipt, UndoReceipt};
use crate::draft::state::{DraftStatus, HeadCommand};
use crate::error::{DraftError, DraftResult};

/// Who a pick is recorded for.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PickTeam<'a> {
    /// The caller claims to be this team; it must own the current slot.
    OnClock(&'a str),
    /// Record under this team, or the slot's own team when `None`.
    Forced(Option<&'a str>),
}

/// Apply one pick at the draft's current overall.
///
/// Checks run in a fixed order: taken player, missing slot, status, turn.
/// Must run inside an immediate transaction.
pub(crate) fn apply_pick(
    conn: &Connection,
    draft_id: &str,
    player_id: &str,
    player_name: Option<&str>,
    team: PickTeam<'_>,
    actor: &str,
    now: DateTime<Utc>,
) -> DraftResult<PickReceipt> {
    let head = load_head(conn, draft_id)?;

    if picks::is_player_taken(conn, draft_id, player_id)? {
        return Err(DraftError::PlayerTaken {
            player_id: player_id.to_string(),
        });
    }

    let slot = match drafts::load_slot(conn, draft_id, head.cur_overall)? {
        Some(slot) => slot,
        None if matches!(team, PickTeam::Forced(None)) => return Err(DraftError::NoTeam),
        None => {
            return Err(DraftError::NoSlot {
                overall: head.cur_overall,
            })
        }
    };

    if head.status != DraftStatus::Live {
        return Err(DraftError::NotLive {
            status: head.status,
        });
    }

    let record_team = match team {
        PickTeam::OnClock(claimed) => {
            if claimed != slot.team {
                return Err(DraftError::NotOnClock {
                    team: claimed.to_string(),
                    on_clock: slot.team.clone(),
                    overall: slot.overall,
                });
            }
            claimed
        }
        PickTeam::Forced(Some(team)) => {
            require_team(conn, draft_id, team)?;
            team
        }
        PickTeam::Forced(None) => slot.team.as_str(),
    };

    let label = match player_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => Some(name.to_string()),
        None => pool::player_name(conn, draft_id, player_id)?,
    };

    let entry = NewEntry {
        draft_id,
        overall: slot.overall,
        round: slot.round,
        team: record_team,
        kind: EntryKind::Pick,
        player_id: Some(player_id),
        player_name: label.as_deref(),
        made_by: actor,
        made_at: now,
    };
    match picks::insert_entry(conn, &entry)? {
        InsertOutcome::Inserted(_) => {}
        InsertOutcome::PlayerTaken => {
            return Err(DraftError::PlayerTaken {
                player_id: player_id.to_string(),
            })
        }
        InsertOutcome::OverallTaken => {
            warn!(
                "Draft {}: overall {} already filled; head is behind the ledger",
                draft_id, slot.overall
            );
            return Err(DraftError::StaleState {
                draft_id: draft_id.to_string(),
            });
        }
    }

    let next_open = drafts::first_open_overall(conn, draft_id, slot.overall)?;
    let stored = commit_head(conn, head.apply(HeadCommand::Advance { next_open }, now)?)?;

    info!(
        "Draft {}: #{} (R{}.{}) {} takes {} [{}] by {}",
        draft_id,
        slot.overall,
        slot.round,
        slot.pick_in_round,
        record_team,
        label.as_deref().unwrap_or(player_id),
        player_id,
        actor
    );
    if stored.status == DraftStatus::Completed {
        info!("Draft {} completed", draft_id);
    }

    Ok(PickReceipt {
        overall: slot.overall,
        round: slot.round,
        team: record_team.to_string(),
        player_id: player_id.to_string(),
        player_name: label,
        made_by: actor.to_string(),
        next_overall: next_open,
    })
}

impl<C: Clock> DraftCoordinator<C> {
    /// Record `player_id` for `team`, which must be on the clock.
    pub fn pick(
        &self,
        draft_id: &str,
        team: &str,
        player_id: &str,
        player_name: Option<&str>,
        actor: &str,
    ) -> DraftResult<PickReceipt> {
        let now = self.clock.now();
        self.db.write(|tx| {
            apply_pick(
                tx,
                draft_id,
                player_id,
                player_name,
                PickTeam::OnClock(team),
                actor,
                now,
            )
        })
    }

    /// Commissioner pick at the current overall, skipping the turn check.
    /// The entry is recorded under `team` when given, else under the slot's
    /// team. An explicit team must belong to the draft.
    pub fn force_pick(
        &self,
        draft_id: &str,
        player_id: &str,
        player_name: Option<&str>,
        team: Option<&str>,
        actor: &str,
    ) -> DraftResult<PickReceipt> {
        let now = self.clock.now();
        let team = team.map(str::trim).filter(|t| !t.is_empty());
        self.db.write(|tx| {
            apply_pick(
                tx,
                draft_id,
                player_id,
                player_name,
                PickTeam::Forced(team),
                actor,
                now,
            )
        })
    }

    /// Remove the most recent ledger entry and pause on its slot.
    pub fn undo_last_pick(&self, draft_id: &str) -> DraftResult<UndoReceipt> {
        self.undo(draft_id, None)
    }

    /// Like [`undo_last_pick`](Self::undo_last_pick), but refuses unless
    /// `overall` is the most recent entry.
    pub fn undo_pick(&self, draft_id: &str, overall: u32) -> DraftResult<UndoReceipt> {
        self.undo(draft_id, Some(overall))
    }

    fn undo(&self, draft_id: &str, expected: Option<u32>) -> DraftResult<UndoReceipt> {
        let now = self.clock.now();
        self.db.write(|tx| {
            let conn: &Connection = tx;
            let head = load_head(conn, draft_id)?;
            let last = picks::last_entry(conn, draft_id)?.ok_or(DraftError::NoPicks)?;

            if let Some(requested) = expected {
                if requested != last.overall {
                    return Err(DraftError::NotLastPick {
                        requested,
                        last: last.overall,
                    });
                }
            }

            picks::delete_entry(conn, draft_id, last.overall)?;
            let stored = commit_head(
                conn,
                head.apply(
                    HeadCommand::Rewind {
                        overall: last.overall,
                    },
                    now,
                )?,
            )?;

            info!(
                "Draft {}: undid #{} ({} {}); draft paused",
                draft_id,
                last.overall,
                last.team,
                last.player_id.as_deref().unwrap_or("skip")
            );

            Ok(UndoReceipt {
                cur_overall: stored.cur_overall,
                removed: last,
            })
        })
    }
}
