// Autopick ticker: polls live drafts and resolves expired clocks.
//
// The ticker holds no draft state. Every tick re-lists LIVE drafts from the
// database, so several tickers (or none) may run against the same file.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use draftroom_core::{AutopickOutcome, Clock, DraftCoordinator};

/// What one pass over the live drafts did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub checked: usize,
    pub picked: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl TickSummary {
    /// True if this pass wrote anything.
    pub fn acted(&self) -> bool {
        self.picked + self.skipped > 0
    }
}

/// Run one autopick check against every LIVE draft.
///
/// Errors are logged per draft and counted; one bad draft never stops the
/// others from being checked.
pub fn tick<C: Clock>(coord: &DraftCoordinator<C>) -> TickSummary {
    let mut summary = TickSummary::default();

    let ids = match coord.live_draft_ids() {
        Ok(ids) => ids,
        Err(e) => {
            error!("Failed to list live drafts: {}", e);
            summary.failed += 1;
            return summary;
        }
    };

    for id in ids {
        summary.checked += 1;
        match coord.check_autopick(&id) {
            Ok(outcome @ AutopickOutcome::Picked { .. }) => {
                summary.picked += 1;
                info!("Ticker: {} {:?}", id, outcome);
            }
            Ok(outcome @ AutopickOutcome::Skipped { .. }) => {
                summary.skipped += 1;
                if let Some(e) = outcome.error() {
                    warn!("Ticker: {} {}", id, e);
                }
            }
            Ok(AutopickOutcome::AlreadyPicked { cur_overall }) => {
                info!("Ticker: {} already picked; now at overall {}", id, cur_overall);
            }
            Ok(AutopickOutcome::NotDue) => {
                debug!("Ticker: {} not due", id);
            }
            Err(e) => {
                summary.failed += 1;
                error!(
                    "Ticker: autopick check failed for {} [{}]: {}",
                    id,
                    e.code(),
                    e
                );
            }
        }
    }

    summary
}

/// Tick every `every` until `shutdown` resolves. Returns the number of ticks.
pub async fn run<C: Clock>(
    coord: &DraftCoordinator<C>,
    every: Duration,
    shutdown: impl Future<Output = ()>,
) -> u64 {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!("Autopick ticker running every {:?}", every);
    let mut ticks = 0u64;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Autopick ticker stopping after {} tick(s)", ticks);
                break;
            }
            _ = interval.tick() => {
                ticks += 1;
                let summary = tick(coord);
                if summary.acted() || summary.failed > 0 {
                    info!("Tick {}: {:?}", ticks, summary);
                }
            }
        }
    }
    ticks
}
