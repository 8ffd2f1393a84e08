// Per-team preference queues consumed by autopick.

use rusqlite::Connection;
use tracing::info;

use super::{load_head, require_team, DraftCoordinator};
use crate::clock::Clock;
use crate::db::queues;
use crate::error::DraftResult;

impl<C: Clock> DraftCoordinator<C> {
    /// Replace `team`'s queue with `player_ids`, highest priority first.
    ///
    /// Blank ids are dropped and repeated ids keep their first position.
    pub fn set_team_queue(
        &self,
        draft_id: &str,
        team: &str,
        player_ids: &[String],
    ) -> DraftResult<()> {
        let mut cleaned: Vec<String> = Vec::with_capacity(player_ids.len());
        for id in player_ids.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            if !cleaned.iter().any(|c| c == id) {
                cleaned.push(id.to_string());
            }
        }

        self.db.write(|tx| -> DraftResult<()> {
            let conn: &Connection = tx;
            load_head(conn, draft_id)?;
            require_team(conn, draft_id, team)?;
            queues::replace_queue(conn, draft_id, team, &cleaned)?;
            Ok(())
        })?;

        info!(
            "Draft {}: queue for {} set to {} player(s)",
            draft_id,
            team,
            cleaned.len()
        );
        Ok(())
    }

    /// The team's queue in priority order, including players already taken.
    pub fn get_team_queue(&self, draft_id: &str, team: &str) -> DraftResult<Vec<String>> {
        let conn = self.db.conn();
        load_head(&conn, draft_id)?;
        Ok(queues::load_queue(&conn, draft_id, team)?
            .into_iter()
            .map(|e| e.player_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn set_replaces_whole_queue() {
        let (coord, _) = coordinator();
        let id = coord.create_draft(&definition(&["A", "B"], 2, true)).unwrap();
        coord.set_team_queue(&id, "A", &ids(&["X", "Y", "Z"])).unwrap();
        coord.set_team_queue(&id, "A", &ids(&["Z", "X"])).unwrap();
        assert_eq!(coord.get_team_queue(&id, "A").unwrap(), vec!["Z", "X"]);
        assert!(coord.get_team_queue(&id, "B").unwrap().is_empty());
    }

    #[test]
    fn blanks_and_repeats_are_dropped() {
        let (coord, _) = coordinator();
        let id = coord.create_draft(&definition(&["A", "B"], 2, true)).unwrap();
        coord
            .set_team_queue(&id, "A", &ids(&["X", " ", "Y", "X"]))
            .unwrap();
        assert_eq!(coord.get_team_queue(&id, "A").unwrap(), vec!["X", "Y"]);
    }

    #[test]
    fn empty_list_clears_queue() {
        let (coord, _) = coordinator();
        let id = coord.create_draft(&definition(&["A"], 1, true)).unwrap();
        coord.set_team_queue(&id, "A", &ids(&["X"])).unwrap();
        coord.set_team_queue(&id, "A", &[]).unwrap();
        assert!(coord.get_team_queue(&id, "A").unwrap().is_empty());
    }

    #[test]
    fn unknown_team_or_draft_is_rejected() {
        let (coord, _) = coordinator();
        let id = coord.create_draft(&definition(&["A"], 1, true)).unwrap();
        let err = coord.set_team_queue(&id, "Z", &ids(&["X"])).unwrap_err();
        assert_eq!(err.code(), "invalid_definition");
        let err = coord.set_team_queue("nope", "A", &ids(&["X"])).unwrap_err();
        assert_eq!(err.code(), "no_draft");
    }
}
