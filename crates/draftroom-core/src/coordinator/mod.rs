// Live draft coordinator: the operations callers invoke against a draft.
//
// The coordinator keeps no draft state of its own. Each operation opens an
// immediate transaction, re-reads the head, decides, and writes back with a
// version check. Any number of coordinators (threads or processes) may share
// one database file.

mod apply;
mod autopick;
mod overview;
mod pool;
mod queue;

pub use autopick::{AutopickOutcome, PickSource};
pub use overview::{BoardCell, DraftOverview, OnClock};

use rusqlite::Connection;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::db::{drafts, Database};
use crate::draft::slots::{build_slots, DraftDefinition};
use crate::draft::state::{DraftHead, DraftStatus, HeadCommand};
use crate::error::{DraftError, DraftResult};

/// How much history and lookahead the overview carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverviewLimits {
    pub recent_picks: u32,
    pub upcoming_slots: u32,
}

impl Default for OverviewLimits {
    fn default() -> Self {
        Self {
            recent_picks: 10,
            upcoming_slots: 10,
        }
    }
}

pub struct DraftCoordinator<C: Clock = SystemClock> {
    db: Database,
    clock: C,
    limits: OverviewLimits,
}

impl DraftCoordinator<SystemClock> {
    pub fn with_system_clock(db: Database) -> Self {
        Self::new(db, SystemClock)
    }
}

impl<C: Clock> DraftCoordinator<C> {
    pub fn new(db: Database, clock: C) -> Self {
        Self {
            db,
            clock,
            limits: OverviewLimits::default(),
        }
    }

    pub fn with_overview_limits(mut self, limits: OverviewLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Lay out a new draft and persist it in NOT_STARTED.
    ///
    /// Idempotent per draft id: if the id already exists its slots are left
    /// untouched and the existing id is returned.
    pub fn create_draft(&self, definition: &DraftDefinition) -> DraftResult<String> {
        let teams = definition.validate()?;
        let slots = build_slots(&teams, definition.rounds, definition.snake);
        let draft_id = definition.draft_id();

        let head = DraftHead {
            id: draft_id.clone(),
            year: definition.year,
            rounds: definition.rounds,
            team_count: teams.len() as u32,
            clock_seconds: definition.clock_seconds,
            snake: definition.snake,
            status: DraftStatus::NotStarted,
            cur_overall: 1,
            clock_started_at: None,
            deadline_ts: None,
            started_at: None,
            completed_at: None,
            version: 0,
        };

        let created = self.db.write(|tx| -> DraftResult<bool> {
            Ok(drafts::insert_draft(tx, &head, &teams, &slots)?)
        })?;

        if created {
            info!(
                "Created draft {}: {} rounds x {} teams ({} slots, snake={}, clock={}s)",
                draft_id,
                definition.rounds,
                teams.len(),
                slots.len(),
                definition.snake,
                definition.clock_seconds
            );
        } else {
            info!("Draft {} already exists; leaving its slots untouched", draft_id);
        }

        Ok(draft_id)
    }

    pub fn get_draft(&self, draft_id: &str) -> DraftResult<DraftHead> {
        let conn = self.db.conn();
        load_head(&conn, draft_id)
    }

    /// All drafts, newest season first.
    pub fn list_drafts(&self) -> DraftResult<Vec<DraftHead>> {
        Ok(drafts::list_heads(&self.db.conn())?)
    }

    pub fn live_draft_ids(&self) -> DraftResult<Vec<String>> {
        Ok(drafts::live_draft_ids(&self.db.conn())?)
    }

    /// NOT_STARTED -> LIVE at the first overall without a ledger entry.
    pub fn start(&self, draft_id: &str) -> DraftResult<DraftHead> {
        self.transition(draft_id, |conn, _| {
            let first_open = drafts::first_open_overall(conn, draft_id, 0)?;
            Ok(HeadCommand::Start { first_open })
        })
    }

    /// LIVE -> PAUSED.
    pub fn pause(&self, draft_id: &str) -> DraftResult<DraftHead> {
        self.transition(draft_id, |_, _| Ok(HeadCommand::Pause))
    }

    /// PAUSED -> LIVE with a fresh clock.
    pub fn resume(&self, draft_id: &str) -> DraftResult<DraftHead> {
        self.transition(draft_id, |_, _| Ok(HeadCommand::Resume))
    }

    pub fn set_clock_seconds(&self, draft_id: &str, seconds: u32) -> DraftResult<DraftHead> {
        self.transition(draft_id, |_, _| Ok(HeadCommand::SetClock { seconds }))
    }

    fn transition(
        &self,
        draft_id: &str,
        command: impl FnOnce(&Connection, &DraftHead) -> DraftResult<HeadCommand>,
    ) -> DraftResult<DraftHead> {
        let now = self.clock.now();
        self.db.write(|tx| {
            let conn: &Connection = tx;
            let head = load_head(conn, draft_id)?;
            let cmd = command(conn, &head)?;
            let next = head.apply(cmd, now)?;
            let stored = commit_head(conn, next)?;
            info!(
                "Draft {}: {:?} ({} -> {}, overall {})",
                draft_id, cmd, head.status, stored.status, stored.cur_overall
            );
            Ok(stored)
        })
    }
}

/// Load a head or report the draft as missing.
pub(crate) fn load_head(conn: &Connection, draft_id: &str) -> DraftResult<DraftHead> {
    drafts::load_head(conn, draft_id)?.ok_or_else(|| DraftError::NoDraft {
        draft_id: draft_id.to_string(),
    })
}

/// Reject a team name that is not part of the draft's order.
pub(crate) fn require_team(conn: &Connection, draft_id: &str, team: &str) -> DraftResult<()> {
    if drafts::load_teams(conn, draft_id)?.iter().any(|t| t == team) {
        Ok(())
    } else {
        Err(DraftError::InvalidDefinition(format!(
            "team '{team}' is not part of draft {draft_id}"
        )))
    }
}

/// Write `next` guarded by its version and return it as stored.
pub(crate) fn commit_head(conn: &Connection, mut next: DraftHead) -> DraftResult<DraftHead> {
    if !drafts::update_head(conn, &next)? {
        return Err(DraftError::StaleState {
            draft_id: next.id.clone(),
        });
    }
    next.version += 1;
    Ok(next)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use chrono::Duration;

    #[test]
    fn create_is_idempotent_per_id() {
        let (coord, _) = coordinator();
        let id = coord.create_draft(&definition(&["A", "B"], 2, true)).unwrap();
        assert_eq!(id, "draft-2026");

        let again = coord
            .create_draft(&definition(&["X", "Y", "Z"], 5, false))
            .unwrap();
        assert_eq!(again, id);

        let head = coord.get_draft(&id).unwrap();
        assert_eq!(head.rounds, 2);
        assert_eq!(head.team_count, 2);
        assert_eq!(head.status, DraftStatus::NotStarted);
        assert_eq!(coord.get_board(&id).unwrap().len(), 4);
    }

    #[test]
    fn create_rejects_empty_team_list() {
        let (coord, _) = coordinator();
        let err = coord.create_draft(&definition(&[], 2, true)).unwrap_err();
        assert_eq!(err.code(), "invalid_definition");
        assert!(coord.list_drafts().unwrap().is_empty());
    }

    #[test]
    fn unknown_draft_is_reported() {
        let (coord, _) = coordinator();
        assert_eq!(coord.get_draft("nope").unwrap_err().code(), "no_draft");
        assert_eq!(coord.start("nope").unwrap_err().code(), "no_draft");
    }

    #[test]
    fn start_pause_resume_cycle() {
        let (coord, clock) = coordinator();
        let id = coord.create_draft(&definition(&["A", "B"], 2, true)).unwrap();

        let live = coord.start(&id).unwrap();
        assert_eq!(live.status, DraftStatus::Live);
        assert_eq!(live.cur_overall, 1);
        assert_eq!(live.deadline_ts, Some(t0() + Duration::seconds(60)));
        assert_eq!(coord.live_draft_ids().unwrap(), vec![id.clone()]);

        let paused = coord.pause(&id).unwrap();
        assert_eq!(paused.status, DraftStatus::Paused);
        assert!(coord.live_draft_ids().unwrap().is_empty());

        clock.advance(Duration::seconds(300));
        let resumed = coord.resume(&id).unwrap();
        assert_eq!(resumed.status, DraftStatus::Live);
        assert_eq!(resumed.deadline_ts, Some(t0() + Duration::seconds(360)));
    }

    #[test]
    fn invalid_transitions_are_typed() {
        let (coord, _) = coordinator();
        let id = coord.create_draft(&definition(&["A"], 1, true)).unwrap();
        assert_eq!(coord.pause(&id).unwrap_err().code(), "invalid_transition");
        assert_eq!(coord.resume(&id).unwrap_err().code(), "invalid_transition");
        coord.start(&id).unwrap();
        assert_eq!(coord.start(&id).unwrap_err().code(), "invalid_transition");
    }

    #[test]
    fn set_clock_seconds_updates_live_deadline() {
        let (coord, _) = coordinator();
        let id = coord.create_draft(&definition(&["A", "B"], 1, true)).unwrap();
        coord.start(&id).unwrap();
        let head = coord.set_clock_seconds(&id, 120).unwrap();
        assert_eq!(head.clock_seconds, 120);
        assert_eq!(head.deadline_ts, Some(t0() + Duration::seconds(120)));
        assert_eq!(
            coord.set_clock_seconds(&id, 0).unwrap_err().code(),
            "invalid_definition"
        );
    }

    #[test]
    fn every_write_bumps_version() {
        let (coord, _) = coordinator();
        let id = coord.create_draft(&definition(&["A", "B"], 1, true)).unwrap();
        assert_eq!(coord.get_draft(&id).unwrap().version, 0);
        let live = coord.start(&id).unwrap();
        assert_eq!(live.version, 1);
        assert_eq!(coord.get_draft(&id).unwrap().version, 1);
    }
}
