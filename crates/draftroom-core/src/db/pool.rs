// Ranked player pool rows for autopick fallback.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::draft::pool::PoolPlayer;

/// Autopick fallback order: ranked players first by rank, then unranked,
/// ties broken by name.
const FALLBACK_ORDER: &str = "pl.rank IS NULL, pl.rank, pl.name, pl.player_id";

fn pool_from_row(row: &Row<'_>) -> rusqlite::Result<PoolPlayer> {
    Ok(PoolPlayer {
        player_id: row.get(0)?,
        name: row.get(1)?,
        pos: row.get(2)?,
        rank: row.get(3)?,
    })
}

/// Delete the draft's pool and insert `players`.
pub fn replace_pool(conn: &Connection, draft_id: &str, players: &[PoolPlayer]) -> Result<()> {
    conn.execute(
        "DELETE FROM draft_player_pool WHERE draft_id = ?1",
        params![draft_id],
    )
    .context("failed to clear player pool")?;

    let mut stmt = conn
        .prepare(
            "INSERT OR REPLACE INTO draft_player_pool (draft_id, player_id, name, pos, rank)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .context("failed to prepare pool insert")?;
    for p in players {
        stmt.execute(params![draft_id, p.player_id, p.name, p.pos, p.rank])
            .context("failed to insert pool player")?;
    }
    Ok(())
}

/// Pool players with no ledger row yet, in fallback order. `None` = no limit.
pub fn available(conn: &Connection, draft_id: &str, limit: Option<u32>) -> Result<Vec<PoolPlayer>> {
    let limit = limit.map(i64::from).unwrap_or(-1);
    let mut stmt = conn
        .prepare(&format!(
            "SELECT pl.player_id, pl.name, pl.pos, pl.rank FROM draft_player_pool pl
             WHERE pl.draft_id = ?1
               AND NOT EXISTS (
                   SELECT 1 FROM draft_picks p
                   WHERE p.draft_id = pl.draft_id AND p.player_id = pl.player_id
               )
             ORDER BY {FALLBACK_ORDER}
             LIMIT ?2"
        ))
        .context("failed to prepare available pool query")?;
    let players = stmt
        .query_map(params![draft_id, limit], pool_from_row)
        .context("failed to query available players")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map available player rows")?;
    Ok(players)
}

pub fn player_name(conn: &Connection, draft_id: &str, player_id: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT name FROM draft_player_pool WHERE draft_id = ?1 AND player_id = ?2",
        params![draft_id, player_id],
        |row| row.get(0),
    )
    .optional()
    .context("failed to look up pool player name")
}

pub fn pool_size(conn: &Connection, draft_id: &str) -> Result<u32> {
    let count: u32 = conn
        .query_row(
            "SELECT COUNT(*) FROM draft_player_pool WHERE draft_id = ?1",
            params![draft_id],
            |row| row.get(0),
        )
        .context("failed to count pool players")?;
    Ok(count)
}
