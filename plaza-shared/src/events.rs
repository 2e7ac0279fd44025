use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationEventKind {
    UnitsHeld,
    ReservationConfirmed,
    ReservationCancelled,
    ReservationExpired,
}

impl ReservationEventKind {
    /// Stable name used as the SSE event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationEventKind::UnitsHeld => "units_held",
            ReservationEventKind::ReservationConfirmed => "reservation_confirmed",
            ReservationEventKind::ReservationCancelled => "reservation_cancelled",
            ReservationEventKind::ReservationExpired => "reservation_expired",
        }
    }
}

/// Published on every reservation transition so availability views can
/// refresh without polling. Carries unit ids, never requester identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationEvent {
    pub kind: ReservationEventKind,
    pub container_id: Uuid,
    pub reservation_id: Uuid,
    pub unit_ids: Vec<String>,
    pub at: i64, // Unix timestamp
}

impl ReservationEvent {
    pub fn new(
        kind: ReservationEventKind,
        container_id: Uuid,
        reservation_id: Uuid,
        unit_ids: Vec<String>,
        at: i64,
    ) -> Self {
        Self {
            kind,
            container_id,
            reservation_id,
            unit_ids,
            at,
        }
    }
}
