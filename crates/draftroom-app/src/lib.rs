//! Background services built on `draftroom-core`.

pub mod ticker;
