// Draft domain types: turn order, ledger entries, head state machine, pool.

pub mod pick;
pub mod pool;
pub mod slots;
pub mod state;
