use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Allocation state of a single unit. A unit is in exactly one state at any
/// instant; transitions go through `Ledger::commit` only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitState {
    Free,
    Held,
    Confirmed,
}

/// Per-unit ledger row: current state plus the reservation holding the unit,
/// if any. A `Free` unit has no owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub state: UnitState,
    pub reservation_id: Option<Uuid>,
}

impl LedgerEntry {
    pub fn free() -> Self {
        Self {
            state: UnitState::Free,
            reservation_id: None,
        }
    }
}

/// A conditional state change over a set of units. The commit succeeds only
/// if every unit still matches `expected` state and `expected_owner`;
/// otherwise nothing is written.
#[derive(Debug, Clone)]
pub struct Transition {
    pub units: Vec<String>,
    pub expected: UnitState,
    pub expected_owner: Option<Uuid>,
    pub next: UnitState,
    pub next_owner: Option<Uuid>,
}

impl Transition {
    /// FREE -> HELD for a new reservation.
    pub fn hold(units: Vec<String>, reservation_id: Uuid) -> Self {
        Self {
            units,
            expected: UnitState::Free,
            expected_owner: None,
            next: UnitState::Held,
            next_owner: Some(reservation_id),
        }
    }

    /// HELD -> FREE, constrained to units still owned by the releasing
    /// reservation so a sweep never clobbers a confirmed unit.
    pub fn release(units: Vec<String>, reservation_id: Uuid) -> Self {
        Self {
            units,
            expected: UnitState::Held,
            expected_owner: Some(reservation_id),
            next: UnitState::Free,
            next_owner: None,
        }
    }

    /// HELD -> CONFIRMED, keeping ownership. Terminal.
    pub fn finalize(units: Vec<String>, reservation_id: Uuid) -> Self {
        Self {
            units,
            expected: UnitState::Held,
            expected_owner: Some(reservation_id),
            next: UnitState::Confirmed,
            next_owner: Some(reservation_id),
        }
    }
}
