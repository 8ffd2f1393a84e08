// The pick ledger. UNIQUE(draft_id, overall) and UNIQUE(draft_id, player_id)
// are the storage-level guard against double application.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::constraint_message;
use crate::draft::pick::{DraftPick, EntryKind, NewEntry};

/// Result of attempting to append a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// Another row already fills this overall.
    OverallTaken,
    /// Another row already holds this player.
    PlayerTaken,
}

const PICK_COLUMNS: &str =
    "id, draft_id, overall, round, team, kind, player_id, player_name, made_by, made_at";

fn pick_from_row(row: &Row<'_>) -> rusqlite::Result<DraftPick> {
    let kind_text: String = row.get(5)?;
    let kind = kind_text.parse::<EntryKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(DraftPick {
        id: row.get(0)?,
        draft_id: row.get(1)?,
        overall: row.get(2)?,
        round: row.get(3)?,
        team: row.get(4)?,
        kind,
        player_id: row.get(6)?,
        player_name: row.get(7)?,
        made_by: row.get(8)?,
        made_at: row.get(9)?,
    })
}

/// Append a ledger row. Constraint conflicts come back as outcomes, not errors.
pub fn insert_entry(conn: &Connection, entry: &NewEntry<'_>) -> Result<InsertOutcome> {
    let result = conn.execute(
        "INSERT INTO draft_picks
            (draft_id, overall, round, team, kind, player_id, player_name, made_by, made_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            entry.draft_id,
            entry.overall,
            entry.round,
            entry.team,
            entry.kind.as_str(),
            entry.player_id,
            entry.player_name,
            entry.made_by,
            entry.made_at,
        ],
    );

    match result {
        Ok(_) => Ok(InsertOutcome::Inserted(conn.last_insert_rowid())),
        Err(e) => match constraint_message(&e) {
            Some(msg) if msg.contains("draft_picks.player_id") => Ok(InsertOutcome::PlayerTaken),
            Some(msg) if msg.contains("draft_picks.overall") => Ok(InsertOutcome::OverallTaken),
            _ => Err(e).context("failed to insert ledger entry"),
        },
    }
}

pub fn is_player_taken(conn: &Connection, draft_id: &str, player_id: &str) -> Result<bool> {
    let taken: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM draft_picks WHERE draft_id = ?1 AND player_id = ?2)",
            params![draft_id, player_id],
            |row| row.get(0),
        )
        .context("failed to check whether player is taken")?;
    Ok(taken)
}

/// Every ledger row for a draft, in overall order.
pub fn load_entries(conn: &Connection, draft_id: &str) -> Result<Vec<DraftPick>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PICK_COLUMNS} FROM draft_picks WHERE draft_id = ?1 ORDER BY overall"
        ))
        .context("failed to prepare load_entries query")?;
    let picks = stmt
        .query_map(params![draft_id], pick_from_row)
        .context("failed to query ledger")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map ledger rows")?;
    Ok(picks)
}

/// The `limit` most recent ledger rows, newest first.
pub fn recent_entries(conn: &Connection, draft_id: &str, limit: u32) -> Result<Vec<DraftPick>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PICK_COLUMNS} FROM draft_picks WHERE draft_id = ?1
             ORDER BY overall DESC LIMIT ?2"
        ))
        .context("failed to prepare recent_entries query")?;
    let picks = stmt
        .query_map(params![draft_id, limit], pick_from_row)
        .context("failed to query recent ledger rows")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map recent ledger rows")?;
    Ok(picks)
}

pub fn team_entries(conn: &Connection, draft_id: &str, team: &str) -> Result<Vec<DraftPick>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PICK_COLUMNS} FROM draft_picks WHERE draft_id = ?1 AND team = ?2
             ORDER BY overall"
        ))
        .context("failed to prepare team_entries query")?;
    let picks = stmt
        .query_map(params![draft_id, team], pick_from_row)
        .context("failed to query team ledger rows")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map team ledger rows")?;
    Ok(picks)
}

/// The row with the highest overall, if any.
pub fn last_entry(conn: &Connection, draft_id: &str) -> Result<Option<DraftPick>> {
    conn.query_row(
        &format!(
            "SELECT {PICK_COLUMNS} FROM draft_picks WHERE draft_id = ?1
             ORDER BY overall DESC LIMIT 1"
        ),
        params![draft_id],
        pick_from_row,
    )
    .optional()
    .context("failed to load last ledger entry")
}

pub fn delete_entry(conn: &Connection, draft_id: &str, overall: u32) -> Result<bool> {
    let deleted = conn
        .execute(
            "DELETE FROM draft_picks WHERE draft_id = ?1 AND overall = ?2",
            params![draft_id, overall],
        )
        .context("failed to delete ledger entry")?;
    Ok(deleted == 1)
}

pub fn entry_count(conn: &Connection, draft_id: &str) -> Result<u32> {
    let count: u32 = conn
        .query_row(
            "SELECT COUNT(*) FROM draft_picks WHERE draft_id = ?1",
            params![draft_id],
            |row| row.get(0),
        )
        .context("failed to count ledger entries")?;
    Ok(count)
}
