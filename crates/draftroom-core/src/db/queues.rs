// Per-team draft preference queues.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// One queued player and its 1-based rank within the team's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub rank: u32,
    pub player_id: String,
}

pub fn load_queue(conn: &Connection, draft_id: &str, team: &str) -> Result<Vec<QueueEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT rank, player_id FROM draft_queues
             WHERE draft_id = ?1 AND team = ?2 ORDER BY rank",
        )
        .context("failed to prepare load_queue query")?;
    let entries = stmt
        .query_map(params![draft_id, team], |row| {
            Ok(QueueEntry {
                rank: row.get(0)?,
                player_id: row.get(1)?,
            })
        })
        .context("failed to query team queue")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to map team queue rows")?;
    Ok(entries)
}

/// Delete the team's whole queue and insert `player_ids` with rank = position.
pub fn replace_queue(
    conn: &Connection,
    draft_id: &str,
    team: &str,
    player_ids: &[String],
) -> Result<()> {
    conn.execute(
        "DELETE FROM draft_queues WHERE draft_id = ?1 AND team = ?2",
        params![draft_id, team],
    )
    .context("failed to clear team queue")?;

    let mut stmt = conn
        .prepare(
            "INSERT INTO draft_queues (draft_id, team, rank, player_id)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .context("failed to prepare queue insert")?;
    for (idx, player_id) in player_ids.iter().enumerate() {
        stmt.execute(params![draft_id, team, idx as i64 + 1, player_id])
            .context("failed to insert queue entry")?;
    }
    Ok(())
}

/// Highest-priority queued player that is not already in the ledger.
pub fn first_undrafted(conn: &Connection, draft_id: &str, team: &str) -> Result<Option<QueueEntry>> {
    conn.query_row(
        "SELECT q.rank, q.player_id FROM draft_queues q
         WHERE q.draft_id = ?1 AND q.team = ?2
           AND NOT EXISTS (
               SELECT 1 FROM draft_picks p
               WHERE p.draft_id = q.draft_id AND p.player_id = q.player_id
           )
         ORDER BY q.rank
         LIMIT 1",
        params![draft_id, team],
        |row| {
            Ok(QueueEntry {
                rank: row.get(0)?,
                player_id: row.get(1)?,
            })
        },
    )
    .optional()
    .context("failed to find first undrafted queue entry")
}

pub fn remove_entry(conn: &Connection, draft_id: &str, team: &str, rank: u32) -> Result<bool> {
    let deleted = conn
        .execute(
            "DELETE FROM draft_queues WHERE draft_id = ?1 AND team = ?2 AND rank = ?3",
            params![draft_id, team, rank],
        )
        .context("failed to remove queue entry")?;
    Ok(deleted == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{drafts, Database};
    use crate::draft::slots::build_slots;
    use crate::draft::state::{DraftHead, DraftStatus};

    const DRAFT: &str = "draft-2026";

    fn test_db() -> Database {
        let db = Database::open(":memory:").unwrap();
        let teams = vec!["A".to_string(), "B".to_string()];
        let head = DraftHead {
            id: DRAFT.into(),
            year: 2026,
            rounds: 1,
            team_count: 2,
            clock_seconds: 60,
            snake: false,
            status: DraftStatus::NotStarted,
            cur_overall: 1,
            clock_started_at: None,
            deadline_ts: None,
            started_at: None,
            completed_at: None,
            version: 0,
        };
        drafts::insert_draft(&db.conn(), &head, &teams, &build_slots(&teams, 1, false)).unwrap();
        db
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn replace_assigns_ranks_by_position() {
        let db = test_db();
        let conn = db.conn();
        replace_queue(&conn, DRAFT, "A", &ids(&["x", "y", "z"])).unwrap();
        let queue = load_queue(&conn, DRAFT, "A").unwrap();
        let ranks: Vec<(u32, &str)> = queue.iter().map(|e| (e.rank, e.player_id.as_str())).collect();
        assert_eq!(ranks, vec![(1, "x"), (2, "y"), (3, "z")]);
    }

    #[test]
    fn replace_discards_previous_queue() {
        let db = test_db();
        let conn = db.conn();
        replace_queue(&conn, DRAFT, "A", &ids(&["x", "y", "z"])).unwrap();
        replace_queue(&conn, DRAFT, "A", &ids(&["w"])).unwrap();
        assert_eq!(load_queue(&conn, DRAFT, "A").unwrap().len(), 1);

        replace_queue(&conn, DRAFT, "A", &[]).unwrap();
        assert!(load_queue(&conn, DRAFT, "A").unwrap().is_empty());
    }

    #[test]
    fn queues_are_per_team() {
        let db = test_db();
        let conn = db.conn();
        replace_queue(&conn, DRAFT, "A", &ids(&["x"])).unwrap();
        replace_queue(&conn, DRAFT, "B", &ids(&["y"])).unwrap();
        assert_eq!(load_queue(&conn, DRAFT, "B").unwrap()[0].player_id, "y");
    }

    #[test]
    fn remove_entry_targets_rank() {
        let db = test_db();
        let conn = db.conn();
        replace_queue(&conn, DRAFT, "A", &ids(&["x", "y"])).unwrap();
        assert!(remove_entry(&conn, DRAFT, "A", 2).unwrap());
        assert!(!remove_entry(&conn, DRAFT, "A", 2).unwrap());
        assert_eq!(load_queue(&conn, DRAFT, "A").unwrap()[0].player_id, "x");
    }

    #[test]
    fn first_undrafted_on_empty_ledger_is_top_rank() {
        let db = test_db();
        let conn = db.conn();
        assert!(first_undrafted(&conn, DRAFT, "A").unwrap().is_none());
        replace_queue(&conn, DRAFT, "A", &ids(&["x", "y"])).unwrap();
        assert_eq!(
            first_undrafted(&conn, DRAFT, "A").unwrap(),
            Some(QueueEntry {
                rank: 1,
                player_id: "x".into()
            })
        );
    }
}
