//! Live draft coordination for a fantasy league.
//!
//! A [`DraftCoordinator`] applies picks, runs the pick clock, resolves
//! expired clocks through team queues and a ranked pool, and serves
//! read-only overviews. All state lives in SQLite, so any number of
//! coordinators may share one database.

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod db;
pub mod draft;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{
    AutopickOutcome, BoardCell, DraftCoordinator, DraftOverview, OnClock, OverviewLimits,
    PickSource,
};
pub use db::Database;
pub use draft::pick::{DraftPick, EntryKind, PickReceipt, UndoReceipt, AUTO_ACTOR};
pub use draft::pool::PoolPlayer;
pub use draft::slots::{DraftDefinition, DraftSlot};
pub use draft::state::{DraftHead, DraftStatus};
pub use error::{DraftError, DraftResult};
