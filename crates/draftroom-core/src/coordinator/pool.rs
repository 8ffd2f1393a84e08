// Ranked player pool management.

use std::path::Path;

use anyhow::Context;
use rusqlite::Connection;
use tracing::info;

use super::{load_head, DraftCoordinator};
use crate::clock::Clock;
use crate::db::pool;
use crate::draft::pool::{load_pool_csv, PoolPlayer};
use crate::error::DraftResult;

impl<C: Clock> DraftCoordinator<C> {
    /// Replace the draft's whole pool. Returns the number of players stored.
    pub fn set_player_pool(&self, draft_id: &str, players: &[PoolPlayer]) -> DraftResult<usize> {
        self.db.write(|tx| -> DraftResult<()> {
            let conn: &Connection = tx;
            load_head(conn, draft_id)?;
            pool::replace_pool(conn, draft_id, players)?;
            Ok(())
        })?;
        info!("Draft {}: player pool set ({} players)", draft_id, players.len());
        Ok(players.len())
    }

    /// Load `player_id,name,pos,rank` rows from `path` into the draft's pool.
    pub fn import_player_pool_csv(&self, draft_id: &str, path: &Path) -> DraftResult<usize> {
        let players = load_pool_csv(path)
            .with_context(|| format!("failed to import player pool for {draft_id}"))?;
        self.set_player_pool(draft_id, &players)
    }

    /// Pool players not yet in the ledger, in autopick order.
    pub fn available_players(
        &self,
        draft_id: &str,
        limit: Option<u32>,
    ) -> DraftResult<Vec<PoolPlayer>> {
        let conn = self.db.conn();
        load_head(&conn, draft_id)?;
        Ok(pool::available(&conn, draft_id, limit)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::super::test_support::*;

    #[test]
    fn import_csv_and_list_available() {
        let (coord, _) = coordinator();
        let id = coord.create_draft(&definition(&["A", "B"], 1, true)).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "player_id,name,pos,rank").unwrap();
        writeln!(file, "4046,Patrick Mahomes,QB,3").unwrap();
        writeln!(file, "6794,Justin Jefferson,WR,1").unwrap();
        writeln!(file, "9999,Deep Sleeper,RB,").unwrap();
        file.flush().unwrap();

        assert_eq!(coord.import_player_pool_csv(&id, file.path()).unwrap(), 3);

        coord.start(&id).unwrap();
        coord.pick(&id, "A", "6794", None, "A").unwrap();

        let names: Vec<String> = coord
            .available_players(&id, None)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Patrick Mahomes", "Deep Sleeper"]);
        assert_eq!(coord.available_players(&id, Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn missing_csv_is_a_storage_error() {
        let (coord, _) = coordinator();
        let id = coord.create_draft(&definition(&["A"], 1, true)).unwrap();
        let err = coord
            .import_player_pool_csv(&id, std::path::Path::new("/no/such/pool.csv"))
            .unwrap_err();
        assert_eq!(err.code(), "storage");
    }
}
