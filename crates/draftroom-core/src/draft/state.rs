// Draft head: status, turn pointer, and pick clock.
//
// Transitions are pure functions of (persisted head, command, now). The
// database layer writes the result back with a version check, so no caller
// ever holds the head in memory across operations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DraftError, DraftResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    NotStarted,
    Live,
    Paused,
    Completed,
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::NotStarted => "NOT_STARTED",
            DraftStatus::Live => "LIVE",
            DraftStatus::Paused => "PAUSED",
            DraftStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DraftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_STARTED" => Ok(DraftStatus::NotStarted),
            "LIVE" => Ok(DraftStatus::Live),
            "PAUSED" => Ok(DraftStatus::Paused),
            "COMPLETED" => Ok(DraftStatus::Completed),
            other => Err(format!("unknown draft status '{other}'")),
        }
    }
}

/// Persisted head state of one draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftHead {
    pub id: String,
    pub year: i32,
    pub rounds: u32,
    pub team_count: u32,
    pub clock_seconds: u32,
    pub snake: bool,
    pub status: DraftStatus,
    /// Next overall awaiting a pick. Exceeds `total_slots()` once completed.
    pub cur_overall: u32,
    pub clock_started_at: Option<DateTime<Utc>>,
    pub deadline_ts: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Optimistic-lock counter, bumped on every write.
    pub version: i64,
}

/// A state-machine input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadCommand {
    /// Begin the draft at the first unfilled overall (`None` when every
    /// slot is already filled).
    Start { first_open: Option<u32> },
    Pause,
    Resume,
    SetClock { seconds: u32 },
    /// A slot at `cur_overall` was filled; move to `next_open` or finish.
    Advance { next_open: Option<u32> },
    /// The entry at `overall` was removed by undo.
    Rewind { overall: u32 },
}

impl HeadCommand {
    fn action(&self) -> &'static str {
        match self {
            HeadCommand::Start { .. } => "start",
            HeadCommand::Pause => "pause",
            HeadCommand::Resume => "resume",
            HeadCommand::SetClock { .. } => "set the clock of",
            HeadCommand::Advance { .. } => "advance",
            HeadCommand::Rewind { .. } => "rewind",
        }
    }
}

impl DraftHead {
    pub fn total_slots(&self) -> u32 {
        self.rounds * self.team_count
    }

    /// True once the on-clock team has run out of time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == DraftStatus::Live && self.deadline_ts.is_some_and(|d| now >= d)
    }

    /// Whole seconds left on the clock, clamped at zero. `None` unless live.
    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.status != DraftStatus::Live {
            return None;
        }
        self.deadline_ts
            .map(|d| (d - now).num_seconds().max(0))
    }

    fn restart_clock(&mut self, now: DateTime<Utc>) {
        self.clock_started_at = Some(now);
        self.deadline_ts = Some(now + Duration::seconds(i64::from(self.clock_seconds)));
    }

    fn clear_clock(&mut self) {
        self.clock_started_at = None;
        self.deadline_ts = None;
    }

    fn complete(&mut self, now: DateTime<Utc>) {
        self.status = DraftStatus::Completed;
        self.cur_overall = self.total_slots() + 1;
        self.completed_at = Some(now);
        self.clear_clock();
    }

    fn reject(&self, cmd: HeadCommand) -> DraftError {
        DraftError::InvalidTransition {
            action: cmd.action(),
            status: self.status,
        }
    }

    /// Compute the head that results from `cmd` at time `now`.
    ///
    /// The returned head keeps the same `version`; the writer bumps it.
    pub fn apply(&self, cmd: HeadCommand, now: DateTime<Utc>) -> DraftResult<DraftHead> {
        let mut next = self.clone();

        match cmd {
            HeadCommand::Start { first_open } => {
                if self.status != DraftStatus::NotStarted {
                    return Err(self.reject(cmd));
                }
                next.started_at = Some(now);
                match first_open {
                    Some(overall) => {
                        next.status = DraftStatus::Live;
                        next.cur_overall = overall;
                        next.restart_clock(now);
                    }
                    None => next.complete(now),
                }
            }
            HeadCommand::Pause => {
                if self.status != DraftStatus::Live {
                    return Err(self.reject(cmd));
                }
                next.status = DraftStatus::Paused;
            }
            HeadCommand::Resume => {
                if self.status != DraftStatus::Paused {
                    return Err(self.reject(cmd));
                }
                next.status = DraftStatus::Live;
                next.restart_clock(now);
            }
            HeadCommand::SetClock { seconds } => {
                if seconds == 0 {
                    return Err(DraftError::InvalidDefinition(
                        "clock_seconds must be at least 1".into(),
                    ));
                }
                next.clock_seconds = seconds;
                if next.status == DraftStatus::Live {
                    if let Some(started) = next.clock_started_at {
                        next.deadline_ts = Some(started + Duration::seconds(i64::from(seconds)));
                    }
                }
            }
            HeadCommand::Advance { next_open } => {
                if self.status != DraftStatus::Live {
                    return Err(DraftError::NotLive {
                        status: self.status,
                    });
                }
                match next_open {
                    Some(overall) => {
                        next.cur_overall = overall;
                        next.restart_clock(now);
                    }
                    None => next.complete(now),
                }
            }
            HeadCommand::Rewind { overall } => {
                next.status = DraftStatus::Paused;
                next.cur_overall = overall;
                next.completed_at = None;
                next.clear_clock();
            }
        }

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 30, 18, 0, 0).unwrap()
    }

    fn head(status: DraftStatus) -> DraftHead {
        DraftHead {
            id: "draft-2026".into(),
            year: 2026,
            rounds: 2,
            team_count: 2,
            clock_seconds: 60,
            snake: true,
            status,
            cur_overall: 1,
            clock_started_at: None,
            deadline_ts: None,
            started_at: None,
            completed_at: None,
            version: 0,
        }
    }

    #[test]
    fn start_goes_live_and_starts_clock() {
        let live = head(DraftStatus::NotStarted)
            .apply(HeadCommand::Start { first_open: Some(1) }, t0())
            .unwrap();
        assert_eq!(live.status, DraftStatus::Live);
        assert_eq!(live.cur_overall, 1);
        assert_eq!(live.clock_started_at, Some(t0()));
        assert_eq!(live.deadline_ts, Some(t0() + Duration::seconds(60)));
        assert_eq!(live.started_at, Some(t0()));
    }

    #[test]
    fn start_resumes_at_first_unfilled_overall() {
        let live = head(DraftStatus::NotStarted)
            .apply(HeadCommand::Start { first_open: Some(3) }, t0())
            .unwrap();
        assert_eq!(live.cur_overall, 3);
    }

    #[test]
    fn start_twice_is_rejected() {
        let err = head(DraftStatus::Live)
            .apply(HeadCommand::Start { first_open: Some(1) }, t0())
            .unwrap_err();
        assert_eq!(err.code(), "invalid_transition");
    }

    #[test]
    fn pause_keeps_clock_fields() {
        let live = head(DraftStatus::NotStarted)
            .apply(HeadCommand::Start { first_open: Some(1) }, t0())
            .unwrap();
        let paused = live.apply(HeadCommand::Pause, t0()).unwrap();
        assert_eq!(paused.status, DraftStatus::Paused);
        assert_eq!(paused.deadline_ts, live.deadline_ts);
        assert_eq!(paused.cur_overall, live.cur_overall);
    }

    #[test]
    fn resume_restarts_clock_from_now() {
        let later = t0() + Duration::seconds(500);
        let resumed = head(DraftStatus::Paused)
            .apply(HeadCommand::Resume, later)
            .unwrap();
        assert_eq!(resumed.status, DraftStatus::Live);
        assert_eq!(resumed.deadline_ts, Some(later + Duration::seconds(60)));
    }

    #[test]
    fn advance_restarts_clock_from_pick_time() {
        let live = head(DraftStatus::NotStarted)
            .apply(HeadCommand::Start { first_open: Some(1) }, t0())
            .unwrap();
        let pick_time = t0() + Duration::seconds(12);
        let next = live
            .apply(HeadCommand::Advance { next_open: Some(2) }, pick_time)
            .unwrap();
        assert_eq!(next.cur_overall, 2);
        assert_eq!(next.deadline_ts, Some(pick_time + Duration::seconds(60)));
    }

    #[test]
    fn advance_past_last_slot_completes() {
        let mut live = head(DraftStatus::Live);
        live.cur_overall = 4;
        let done = live
            .apply(HeadCommand::Advance { next_open: None }, t0())
            .unwrap();
        assert_eq!(done.status, DraftStatus::Completed);
        assert_eq!(done.cur_overall, 5);
        assert!(done.deadline_ts.is_none());
        assert_eq!(done.completed_at, Some(t0()));
    }

    #[test]
    fn advance_requires_live() {
        let err = head(DraftStatus::Paused)
            .apply(HeadCommand::Advance { next_open: Some(2) }, t0())
            .unwrap_err();
        assert_eq!(err.code(), "not_live");
    }

    #[test]
    fn rewind_pauses_from_any_state() {
        let mut done = head(DraftStatus::Completed);
        done.cur_overall = 5;
        done.completed_at = Some(t0());
        let rewound = done.apply(HeadCommand::Rewind { overall: 4 }, t0()).unwrap();
        assert_eq!(rewound.status, DraftStatus::Paused);
        assert_eq!(rewound.cur_overall, 4);
        assert!(rewound.completed_at.is_none());
        assert!(rewound.deadline_ts.is_none());
    }

    #[test]
    fn set_clock_while_live_moves_deadline() {
        let live = head(DraftStatus::NotStarted)
            .apply(HeadCommand::Start { first_open: Some(1) }, t0())
            .unwrap();
        let longer = live
            .apply(HeadCommand::SetClock { seconds: 90 }, t0() + Duration::seconds(5))
            .unwrap();
        assert_eq!(longer.clock_seconds, 90);
        assert_eq!(longer.deadline_ts, Some(t0() + Duration::seconds(90)));
    }

    #[test]
    fn set_clock_rejects_zero() {
        assert!(head(DraftStatus::NotStarted)
            .apply(HeadCommand::SetClock { seconds: 0 }, t0())
            .is_err());
    }

    #[test]
    fn expiry_is_only_reported_while_live() {
        let live = head(DraftStatus::NotStarted)
            .apply(HeadCommand::Start { first_open: Some(1) }, t0())
            .unwrap();
        let deadline = t0() + Duration::seconds(60);
        assert!(!live.is_expired(deadline - Duration::seconds(1)));
        assert!(live.is_expired(deadline));
        assert_eq!(live.seconds_remaining(t0() + Duration::seconds(45)), Some(15));
        assert_eq!(live.seconds_remaining(deadline + Duration::seconds(30)), Some(0));

        let paused = live.apply(HeadCommand::Pause, t0()).unwrap();
        assert!(!paused.is_expired(deadline + Duration::seconds(600)));
        assert_eq!(paused.seconds_remaining(deadline), None);
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            DraftStatus::NotStarted,
            DraftStatus::Live,
            DraftStatus::Paused,
            DraftStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<DraftStatus>().unwrap(), status);
        }
        assert!("DONE".parse::<DraftStatus>().is_err());
    }
}
