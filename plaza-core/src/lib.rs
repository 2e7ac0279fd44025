pub mod ledger;
pub mod state;

pub use ledger::{Ledger, LedgerError};
pub use state::{LedgerEntry, Transition, UnitState};
