pub mod app_config;
pub mod events;
pub mod memory_ledger;

pub use events::EventBus;
pub use memory_ledger::MemoryLedger;
