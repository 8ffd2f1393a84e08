// Read-side snapshots: overview, board, and per-team picks.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{load_head, DraftCoordinator};
use crate::clock::Clock;
use crate::db::{drafts, picks};
use crate::draft::pick::DraftPick;
use crate::draft::slots::DraftSlot;
use crate::draft::state::{DraftHead, DraftStatus};
use crate::error::DraftResult;

/// The slot whose turn it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnClock {
    pub overall: u32,
    pub round: u32,
    pub pick_in_round: u32,
    pub team: String,
    pub deadline_ts: Option<DateTime<Utc>>,
    /// `None` unless the draft is live.
    pub seconds_remaining: Option<i64>,
}

/// Everything a client needs to render the draft room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftOverview {
    pub draft: DraftHead,
    /// Round-1 order.
    pub teams: Vec<String>,
    /// `None` before the first slot or after completion.
    pub on_clock: Option<OnClock>,
    /// Newest first.
    pub recent_picks: Vec<DraftPick>,
    /// Unfilled slots after the one on the clock.
    pub upcoming: Vec<DraftSlot>,
    pub total_slots: u32,
    pub picks_made: u32,
    pub server_time: DateTime<Utc>,
}

/// One cell of the full draft board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardCell {
    pub slot: DraftSlot,
    pub entry: Option<DraftPick>,
}

impl<C: Clock> DraftCoordinator<C> {
    pub fn get_overview(&self, draft_id: &str) -> DraftResult<DraftOverview> {
        let now = self.clock.now();
        let conn = self.db.conn();
        let head = load_head(&conn, draft_id)?;

        let on_clock = if head.status == DraftStatus::Completed {
            None
        } else {
            drafts::load_slot(&conn, draft_id, head.cur_overall)?.map(|slot| OnClock {
                overall: slot.overall,
                round: slot.round,
                pick_in_round: slot.pick_in_round,
                team: slot.team,
                deadline_ts: head.deadline_ts,
                seconds_remaining: head.seconds_remaining(now),
            })
        };

        let upcoming = drafts::open_slots_from(
            &conn,
            draft_id,
            head.cur_overall + 1,
            self.limits.upcoming_slots,
        )?;

        Ok(DraftOverview {
            teams: drafts::load_teams(&conn, draft_id)?,
            recent_picks: picks::recent_entries(&conn, draft_id, self.limits.recent_picks)?,
            picks_made: picks::entry_count(&conn, draft_id)?,
            total_slots: head.total_slots(),
            on_clock,
            upcoming,
            draft: head,
            server_time: now,
        })
    }

    /// Every slot in overall order with its ledger entry, if filled.
    pub fn get_board(&self, draft_id: &str) -> DraftResult<Vec<BoardCell>> {
        let conn = self.db.conn();
        load_head(&conn, draft_id)?;

        let slots = drafts::load_slots(&conn, draft_id)?;
        let mut entries = picks::load_entries(&conn, draft_id)?.into_iter().peekable();

        let mut board = Vec::with_capacity(slots.len());
        for slot in slots {
            let entry = match entries.peek() {
                Some(e) if e.overall == slot.overall => entries.next(),
                _ => None,
            };
            board.push(BoardCell { slot, entry });
        }
        Ok(board)
    }

    pub fn get_team_picks(&self, draft_id: &str, team: &str) -> DraftResult<Vec<DraftPick>> {
        let conn = self.db.conn();
        load_head(&conn, draft_id)?;
        Ok(picks::team_entries(&conn, draft_id, team)?)
    }
}
