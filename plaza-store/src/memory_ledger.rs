use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use plaza_core::{Ledger, LedgerEntry, LedgerError, Transition};

/// In-memory ledger backend. Conditional check and apply happen under one
/// write guard, so commits on a container are linearizable and a failed
/// commit leaves every unit untouched.
pub struct MemoryLedger {
    containers: RwLock<HashMap<Uuid, HashMap<String, LedgerEntry>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a container's units, all FREE. Called once at startup per
    /// catalog container; re-registering replaces the container.
    pub async fn register_container<I>(&self, container_id: Uuid, unit_ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        let units = unit_ids
            .into_iter()
            .map(|id| (id, LedgerEntry::free()))
            .collect();
        let mut containers = self.containers.write().await;
        containers.insert(container_id, units);
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn snapshot(&self, container_id: Uuid) -> Result<HashMap<String, LedgerEntry>, LedgerError> {
        let containers = self.containers.read().await;
        containers
            .get(&container_id)
            .cloned()
            .ok_or(LedgerError::UnknownContainer(container_id))
    }

    async fn commit(&self, container_id: Uuid, transition: Transition) -> Result<(), LedgerError> {
        let mut containers = self.containers.write().await;
        let units = containers
            .get_mut(&container_id)
            .ok_or(LedgerError::UnknownContainer(container_id))?;

        // Check every precondition before touching anything.
        let mut conflicts = Vec::new();
        for unit_id in &transition.units {
            let entry = units
                .get(unit_id)
                .ok_or_else(|| LedgerError::UnknownUnit(unit_id.clone()))?;
            if entry.state != transition.expected
                || entry.reservation_id != transition.expected_owner
            {
                conflicts.push(unit_id.clone());
            }
        }
        if !conflicts.is_empty() {
            conflicts.sort();
            return Err(LedgerError::Conflict { units: conflicts });
        }

        for unit_id in &transition.units {
            if let Some(entry) = units.get_mut(unit_id) {
                entry.state = transition.next;
                entry.reservation_id = transition.next_owner;
            }
        }
        Ok(())
    }
}
