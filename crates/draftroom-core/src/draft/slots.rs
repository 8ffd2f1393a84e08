// Draft definition and turn-order slot generation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{DraftError, DraftResult};

/// One immutable turn-order entry. Generated once when a draft is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSlot {
    /// 1-based position across all rounds.
    pub overall: u32,
    /// 1-based round number.
    pub round: u32,
    /// 1-based position inside the round.
    pub pick_in_round: u32,
    pub team: String,
}

/// Everything needed to lay out a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftDefinition {
    /// Explicit draft id. Defaults to `draft-{year}` when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub year: i32,
    pub rounds: u32,
    /// Base turn order for round 1.
    pub teams: Vec<String>,
    pub clock_seconds: u32,
    #[serde(default = "default_snake")]
    pub snake: bool,
}

/// Upper bound on rounds accepted by [`DraftDefinition::validate`].
pub const MAX_ROUNDS: u32 = 100;
/// Upper bound on teams accepted by [`DraftDefinition::validate`].
pub const MAX_TEAMS: usize = 100;

fn default_snake() -> bool {
    true
}

impl DraftDefinition {
    /// The id this definition will be stored under.
    pub fn draft_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("draft-{}", self.year))
    }

    /// Trimmed team list with blanks removed and duplicates collapsed to
    /// their first occurrence.
    pub fn normalized_teams(&self) -> Vec<String> {
        let mut teams: Vec<String> = Vec::with_capacity(self.teams.len());
        for raw in &self.teams {
            let team = raw.trim();
            if team.is_empty() {
                continue;
            }
            if teams.iter().any(|t| t == team) {
                warn!("dropping duplicate team '{}' from draft order", team);
                continue;
            }
            teams.push(team.to_string());
        }
        teams
    }

    /// Check the definition and return the normalized team order.
    pub fn validate(&self) -> DraftResult<Vec<String>> {
        if self.rounds == 0 {
            return Err(DraftError::InvalidDefinition(
                "rounds must be at least 1".into(),
            ));
        }
        if self.rounds > MAX_ROUNDS {
            return Err(DraftError::InvalidDefinition(format!(
                "rounds must be at most {MAX_ROUNDS}"
            )));
        }
        if self.clock_seconds == 0 {
            return Err(DraftError::InvalidDefinition(
                "clock_seconds must be at least 1".into(),
            ));
        }
        if let Some(id) = &self.id {
            if id.trim().is_empty() {
                return Err(DraftError::InvalidDefinition(
                    "draft id must not be blank".into(),
                ));
            }
        }
        let teams = self.normalized_teams();
        if teams.is_empty() {
            return Err(DraftError::InvalidDefinition(
                "team list must not be empty".into(),
            ));
        }
        if teams.len() > MAX_TEAMS {
            return Err(DraftError::InvalidDefinition(format!(
                "at most {MAX_TEAMS} teams are allowed"
            )));
        }
        Ok(teams)
    }

    /// Generate all `rounds * teams` slots in overall order.
    pub fn build_slots(&self) -> DraftResult<Vec<DraftSlot>> {
        let teams = self.validate()?;
        Ok(build_slots(&teams, self.rounds, self.snake))
    }
}

/// Lay out turn order. Even rounds run in reverse when `snake` is set.
pub fn build_slots(teams: &[String], rounds: u32, snake: bool) -> Vec<DraftSlot> {
    let mut slots = Vec::with_capacity(teams.len() * rounds as usize);
    let mut overall = 0u32;

    for round in 1..=rounds {
        let reversed = snake && round % 2 == 0;
        let order: Box<dyn Iterator<Item = &String>> = if reversed {
            Box::new(teams.iter().rev())
        } else {
            Box::new(teams.iter())
        };

        for (idx, team) in order.enumerate() {
            overall += 1;
            slots.push(DraftSlot {
                overall,
                round,
                pick_in_round: idx as u32 + 1,
                team: team.clone(),
            });
        }
    }

    slots
}
