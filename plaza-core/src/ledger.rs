use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::state::{LedgerEntry, Transition};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LedgerError {
    /// One or more units no longer satisfy the transition's precondition.
    /// Carries exactly the conflicting unit ids so callers can re-render
    /// availability without guessing.
    #[error("ledger precondition failed for units: {units:?}")]
    Conflict { units: Vec<String> },

    #[error("container not found: {0}")]
    UnknownContainer(Uuid),

    #[error("unit not found: {0}")]
    UnknownUnit(String),
}

/// The authoritative mapping from unit id to allocation state. The only two
/// operations the core needs from a backend: a consistent read and a
/// conditional all-or-nothing write.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current state of every unit in the container. Reflects all committed
    /// transitions; does not by itself prevent races (see `commit`).
    async fn snapshot(&self, container_id: Uuid) -> Result<HashMap<String, LedgerEntry>, LedgerError>;

    /// Apply `transition` to its unit set if and only if every unit still
    /// matches the expected state and owner. A failed commit writes nothing
    /// and reports the conflicting units. Commits on the same container are
    /// linearizable: no two concurrent commits can both observe the same
    /// unit as FREE and both succeed.
    async fn commit(&self, container_id: Uuid, transition: Transition) -> Result<(), LedgerError>;
}
