// Ranked player pool: the autopick fallback catalog.
//
// Ranking itself is produced elsewhere; this module only loads an already
// ordered list from CSV (`player_id,name,pos,rank`).

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One draftable identity in a draft's pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPlayer {
    pub player_id: String,
    pub name: String,
    #[serde(default)]
    pub pos: Option<String>,
    /// Lower is better. `None` sorts after every ranked player.
    #[serde(default)]
    pub rank: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum PoolImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

#[derive(Debug, Deserialize)]
struct RawPoolRow {
    player_id: String,
    name: String,
    #[serde(default)]
    pos: Option<String>,
    #[serde(default)]
    rank: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse pool rows from any reader. Malformed rows, blank ids, and repeated
/// ids are skipped with a warning rather than failing the whole import.
pub fn load_pool_from_reader<R: Read>(rdr: R) -> Result<Vec<PoolPlayer>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut seen: HashSet<String> = HashSet::new();
    let mut players = Vec::new();

    for result in reader.deserialize::<RawPoolRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed pool row: {}", e);
                continue;
            }
        };

        let player_id = raw.player_id.trim().to_string();
        if player_id.is_empty() {
            warn!("skipping pool row '{}': empty player_id", raw.name.trim());
            continue;
        }
        if !seen.insert(player_id.clone()) {
            warn!("skipping duplicate pool entry for player_id '{}'", player_id);
            continue;
        }

        let rank = match non_blank(raw.rank) {
            None => None,
            Some(text) => match text.parse::<u32>() {
                Ok(rank) => Some(rank),
                Err(_) => {
                    warn!(
                        "pool row '{}' has non-numeric rank '{}'; treating as unranked",
                        player_id, text
                    );
                    None
                }
            },
        };

        players.push(PoolPlayer {
            player_id,
            name: raw.name.trim().to_string(),
            pos: non_blank(raw.pos),
            rank,
        });
    }

    Ok(players)
}

/// Load a pool CSV from disk.
pub fn load_pool_csv(path: &Path) -> Result<Vec<PoolPlayer>, PoolImportError> {
    let display = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| PoolImportError::Io {
        path: display.clone(),
        source: e,
    })?;
    load_pool_from_reader(file).map_err(|e| PoolImportError::Csv {
        path: display,
        source: e,
    })
}
