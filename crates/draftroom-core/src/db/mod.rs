// SQLite persistence layer: the shared ledger every caller reads and writes.
//
// Row-level statements live in the submodules as free functions over
// `&Connection` so they can run either on the bare connection (reads) or
// inside an immediate transaction (every mutation).

pub mod drafts;
pub mod picks;
pub mod pool;
pub mod queues;

use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};

/// Bumped whenever the schema below changes shape.
const SCHEMA_VERSION: i64 = 1;

/// One handle onto the draft database. Many handles (in one process or
/// several) may point at the same file; SQLite serializes their writes.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        let found: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .context("failed to read schema version")?;
        if found > SCHEMA_VERSION {
            bail!(
                "database at {path} has schema version {found}, newer than supported {SCHEMA_VERSION}"
            );
        }

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS drafts (
                id               TEXT PRIMARY KEY,
                year             INTEGER NOT NULL,
                rounds           INTEGER NOT NULL CHECK (rounds >= 1),
                team_count       INTEGER NOT NULL CHECK (team_count >= 1),
                clock_seconds    INTEGER NOT NULL CHECK (clock_seconds >= 1),
                snake            INTEGER NOT NULL,
                status           TEXT NOT NULL DEFAULT 'NOT_STARTED',
                cur_overall      INTEGER NOT NULL DEFAULT 1,
                clock_started_at TEXT,
                deadline_ts      TEXT,
                started_at       TEXT,
                completed_at     TEXT,
                created_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                version          INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS draft_teams (
                draft_id TEXT NOT NULL REFERENCES drafts(id),
                seat     INTEGER NOT NULL,
                team     TEXT NOT NULL,
                PRIMARY KEY (draft_id, seat),
                UNIQUE (draft_id, team)
            );

            CREATE TABLE IF NOT EXISTS draft_slots (
                draft_id      TEXT NOT NULL REFERENCES drafts(id),
                overall       INTEGER NOT NULL,
                round         INTEGER NOT NULL,
                pick_in_round INTEGER NOT NULL,
                team          TEXT NOT NULL,
                PRIMARY KEY (draft_id, overall)
            );

            CREATE TABLE IF NOT EXISTS draft_picks (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                draft_id    TEXT NOT NULL,
                overall     INTEGER NOT NULL,
                round       INTEGER NOT NULL,
                team        TEXT NOT NULL,
                kind        TEXT NOT NULL DEFAULT 'pick',
                player_id   TEXT,
                player_name TEXT,
                made_by     TEXT NOT NULL,
                made_at     TEXT NOT NULL,
                UNIQUE (draft_id, overall),
                UNIQUE (draft_id, player_id),
                FOREIGN KEY (draft_id, overall) REFERENCES draft_slots(draft_id, overall),
                CHECK ((kind = 'pick' AND player_id IS NOT NULL)
                    OR (kind = 'skip' AND player_id IS NULL))
            );

            CREATE TABLE IF NOT EXISTS draft_queues (
                draft_id  TEXT NOT NULL REFERENCES drafts(id),
                team      TEXT NOT NULL,
                rank      INTEGER NOT NULL,
                player_id TEXT NOT NULL,
                PRIMARY KEY (draft_id, team, rank)
            );

            CREATE TABLE IF NOT EXISTS draft_player_pool (
                draft_id  TEXT NOT NULL REFERENCES drafts(id),
                player_id TEXT NOT NULL,
                name      TEXT NOT NULL,
                pos       TEXT,
                rank      INTEGER,
                PRIMARY KEY (draft_id, player_id)
            );

            CREATE INDEX IF NOT EXISTS idx_draft_player_pool_rank
                ON draft_player_pool(draft_id, rank);
            CREATE INDEX IF NOT EXISTS idx_drafts_status ON drafts(status);
            ",
        )
        .context("failed to create database schema")?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .context("failed to record schema version")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock).
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction. The write lock is taken
    /// up front, so every read inside `f` sees the latest committed state and
    /// no other writer can interleave. Commits on `Ok`, rolls back on `Err`.
    pub(crate) fn write<T, E>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<anyhow::Error>,
    {
        let mut conn = self.conn();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("failed to begin immediate transaction")?;
        let value = f(&tx)?;
        tx.commit().context("failed to commit transaction")?;
        Ok(value)
    }
}

/// If `err` is a UNIQUE/PRIMARY KEY violation, return SQLite's message
/// (which names the offending columns).
pub(crate) fn constraint_message(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
            Some(msg.as_deref().unwrap_or(""))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for expected in [
            "drafts",
            "draft_teams",
            "draft_slots",
            "draft_picks",
            "draft_queues",
            "draft_player_pool",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn open_records_schema_version() {
        let db = test_db();
        let version: i64 = db
            .conn()
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn reopening_a_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let path = path.to_str().unwrap();

        drop(Database::open(path).unwrap());
        Database::open(path).expect("second open should succeed");
    }

    #[test]
    fn newer_schema_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.db");
        let path = path.to_str().unwrap();
        {
            let conn = Connection::open(path).unwrap();
            conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
                .unwrap();
        }
        let err = Database::open(path).err().expect("open should fail");
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn write_rolls_back_on_error() {
        let db = test_db();
        let result: Result<(), anyhow::Error> = db.write(|tx| {
            tx.execute(
                "INSERT INTO drafts (id, year, rounds, team_count, clock_seconds, snake)
                 VALUES ('d', 2026, 1, 1, 60, 1)",
                [],
            )?;
            anyhow::bail!("abort");
        });
        assert!(result.is_err());

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM drafts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
