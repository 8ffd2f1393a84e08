// Draft head rows, team order, and the immutable slot table.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::draft::slots::DraftSlot;
use crate::draft::state::{DraftHead, DraftStatus};

const HEAD_COLUMNS: &str = "id, year, rounds, team_count, clock_seconds, snake, status, cur_overall,
     clock_started_at, deadline_ts, started_at, completed_at, version";

fn head_from_row(row: &Row<'_>) -> rusqlite::Result<DraftHead> {
    let status_text: String = row.get(6)?;
    let status = status_text.parse::<DraftStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(DraftHead {
        id: row.get(0)?,
        year: row.get(1)?,
        rounds: row.get(2)?,
        team_count: row.get(3)?,
        clock_seconds: row.get(4)?,
        snake: row.get(5)?,
        status,
        cur_overall: row.get(7)?,
        clock_started_at: row.get(8)?,
        deadline_ts: row.get(9)?,
        started_at: row.get(10)?,
        completed_at: row.get(11)?,
        version: row.get(12)?,
    })
}

fn slot_from_row(row: &Row<'_>) -> rusqlite::Result<DraftSlot> {
    Ok(DraftSlot {
        overall: row.get(0)?,
        round: row.get(1)?,
        pick_in_round: row.get(2)?,
        team: row.get(3)?,
    })
}

/// Insert a new draft with its team order and slots. Returns `false` without
/// touching anything if a draft with `head.id` already exists.
pub fn insert_draft(
    conn: &Connection,
    head: &DraftHead,
    teams: &[String],
    slots: &[DraftSlot],
) -> Result<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO drafts
                (id, year, rounds, team_count, clock_seconds, snake, status, cur_overall, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                head.id,
                head.year,
                head.rounds,
                head.team_count,
                head.clock_seconds,
                head.snake,
                head.status.as_str(),
                head.cur_overall,
                head.version,
            ],
        )
        .context("failed to insert draft")?;

    if inserted == 0 {
        return Ok(false);
    }

    let mut team_stmt = conn
        .prepare("INSERT INTO draft_teams (draft_id, seat, team) VALUES (?1, ?2, ?3)")
        .context("failed to prepare team insert")?;
    for (seat, team) in teams.iter().enumerate() {
        team_stmt
            .execute(params![head.id, seat as i64 + 1, team])
            .context("failed to insert draft team")?;
    }

    let mut slot_stmt = conn
        .prepare(
            "INSERT INTO draft_slots (draft_id, overall, round, pick_in_round, team)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .context("failed to prepare slot insert")?;
    for slot in slots {
        slot_stmt
            .execute(params![
                head.id,
                slot.overall,
                slot.round,
                slot.pick_in_round,
                slot.team
            ])
            .context("failed to insert draft slot")?;
    }

    Ok(true)
}

pub fn load_head(conn: &Connection, draft_id: &str) -> Result<Option<DraftHead>> {
    conn.query_row(
        &format!("SELECT {HEAD_COLUMNS} FROM drafts WHERE id = ?1"),
        params![draft_id],
        head_from_row,
    )
    .optional()
    .context("failed to load draft head")
}

/// All drafts, newest season first.
pub fn list_heads(conn: &Connection) -> Result<Vec<DraftHead>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {HEAD_COLUMNS} FROM drafts ORDER BY year DESC, created_at DESC, id"
        ))
        .context("failed to prepare list_heads query")?;
    let heads = stmt
        .query_map([], head_from_row)
        .context("failed to query drafts")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map draft rows")?;
    Ok(heads)
}

pub fn live_draft_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT id FROM drafts WHERE status = 'LIVE' ORDER BY id")
        .context("failed to prepare live_draft_ids query")?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .context("failed to query live drafts")?
        .collect::<std::result::Result<Vec<String>, _>>()
        .context("failed to map live draft ids")?;
    Ok(ids)
}

/// Write `head` back only if the stored version still equals `head.version`.
/// Returns `false` when another writer got there first.
pub fn update_head(conn: &Connection, head: &DraftHead) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE drafts SET
                clock_seconds    = ?1,
                status           = ?2,
                cur_overall      = ?3,
                clock_started_at = ?4,
                deadline_ts      = ?5,
                started_at       = ?6,
                completed_at     = ?7,
                version          = version + 1
             WHERE id = ?8 AND version = ?9",
            params![
                head.clock_seconds,
                head.status.as_str(),
                head.cur_overall,
                head.clock_started_at,
                head.deadline_ts,
                head.started_at,
                head.completed_at,
                head.id,
                head.version,
            ],
        )
        .context("failed to update draft head")?;
    Ok(changed == 1)
}

pub fn load_teams(conn: &Connection, draft_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT team FROM draft_teams WHERE draft_id = ?1 ORDER BY seat")
        .context("failed to prepare load_teams query")?;
    let teams = stmt
        .query_map(params![draft_id], |row| row.get(0))
        .context("failed to query draft teams")?
        .collect::<std::result::Result<Vec<String>, _>>()
        .context("failed to map draft team rows")?;
    Ok(teams)
}

pub fn load_slot(conn: &Connection, draft_id: &str, overall: u32) -> Result<Option<DraftSlot>> {
    conn.query_row(
        "SELECT overall, round, pick_in_round, team FROM draft_slots
         WHERE draft_id = ?1 AND overall = ?2",
        params![draft_id, overall],
        slot_from_row,
    )
    .optional()
    .context("failed to load draft slot")
}

pub fn load_slots(conn: &Connection, draft_id: &str) -> Result<Vec<DraftSlot>> {
    let mut stmt = conn
        .prepare(
            "SELECT overall, round, pick_in_round, team FROM draft_slots
             WHERE draft_id = ?1 ORDER BY overall",
        )
        .context("failed to prepare load_slots query")?;
    let slots = stmt
        .query_map(params![draft_id], slot_from_row)
        .context("failed to query draft slots")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map draft slot rows")?;
    Ok(slots)
}

/// Smallest slot overall strictly greater than `after` with no ledger entry.
pub fn first_open_overall(conn: &Connection, draft_id: &str, after: u32) -> Result<Option<u32>> {
    conn.query_row(
        "SELECT MIN(s.overall) FROM draft_slots s
         WHERE s.draft_id = ?1 AND s.overall > ?2
           AND NOT EXISTS (
               SELECT 1 FROM draft_picks p
               WHERE p.draft_id = s.draft_id AND p.overall = s.overall
           )",
        params![draft_id, after],
        |row| row.get(0),
    )
    .context("failed to find next open slot")
}

/// Up to `limit` unfilled slots at or after `from`, in overall order.
pub fn open_slots_from(
    conn: &Connection,
    draft_id: &str,
    from: u32,
    limit: u32,
) -> Result<Vec<DraftSlot>> {
    let mut stmt = conn
        .prepare(
            "SELECT s.overall, s.round, s.pick_in_round, s.team FROM draft_slots s
             WHERE s.draft_id = ?1 AND s.overall >= ?2
               AND NOT EXISTS (
                   SELECT 1 FROM draft_picks p
                   WHERE p.draft_id = s.draft_id AND p.overall = s.overall
               )
             ORDER BY s.overall
             LIMIT ?3",
        )
        .context("failed to prepare open_slots_from query")?;
    let slots = stmt
        .query_map(params![draft_id, from, limit], slot_from_row)
        .context("failed to query open slots")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map open slot rows")?;
    Ok(slots)
}
