use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use plaza_catalog::UnitKind;
use plaza_core::UnitState;
use plaza_shared::Masked;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Held,
    Confirmed,
    Cancelled,
    Expired,
}

/// A requester's claim on a set of units. The unit list is a set (sorted,
/// deduplicated); the monetary total is derived from catalog prices and is
/// never consulted for allocation decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub container_id: Uuid,
    pub requester_id: Masked<String>,
    pub unit_ids: Vec<String>,
    pub status: ReservationStatus,
    pub total_amount: i32,
    pub currency: String,
    /// Caller-supplied extras, e.g. vehicle number for a parking booking.
    pub metadata: serde_json::Value,
    /// QR payload issued on confirmation. Image rendering happens elsewhere.
    pub fulfillment_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Reservation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Uuid,
        container_id: Uuid,
        requester_id: String,
        unit_ids: Vec<String>,
        total_amount: i32,
        currency: String,
        metadata: serde_json::Value,
        ttl: chrono::Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            container_id,
            requester_id: Masked(requester_id),
            unit_ids,
            status: ReservationStatus::Held,
            total_amount,
            currency,
            metadata,
            fulfillment_code: None,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn update_status(&mut self, status: ReservationStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// A held reservation past its TTL. Terminal states never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Held && now >= self.expires_at
    }

    pub fn issue_fulfillment_code(&mut self, prefix: &str) {
        self.fulfillment_code = Some(format!("{}-{}-{}", prefix, self.container_id, self.id));
    }
}

/// One unit's static attributes joined with its current ledger state.
#[derive(Debug, Clone, Serialize)]
pub struct UnitAvailability {
    pub unit_id: String,
    pub kind: UnitKind,
    pub price_amount: i32,
    pub currency: String,
    pub state: UnitState,
}

/// Container availability derived entirely from the per-unit snapshot; the
/// aggregate count is computed, never stored, so it cannot drift.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityView {
    pub container_id: Uuid,
    pub units: Vec<UnitAvailability>,
    pub available: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_applies_to_held_only() {
        let mut reservation = Reservation::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "user@example.com".to_string(),
            vec!["Main-A1".to_string()],
            50000,
            "INR".to_string(),
            serde_json::Value::Null,
            chrono::Duration::seconds(0),
        );

        assert!(reservation.is_expired(Utc::now()));

        reservation.update_status(ReservationStatus::Confirmed);
        assert!(!reservation.is_expired(Utc::now()));
    }

    #[test]
    fn test_fulfillment_code_prefix() {
        let mut reservation = Reservation::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "user@example.com".to_string(),
            vec!["C-01".to_string()],
            5000,
            "INR".to_string(),
            serde_json::json!({ "vehicle_number": "KA-01-AB-1234" }),
            chrono::Duration::seconds(300),
        );

        reservation.issue_fulfillment_code("PARK");
        let code = reservation.fulfillment_code.unwrap();
        assert!(code.starts_with(&format!("PARK-{}-", reservation.container_id)));
    }
}
