use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use plaza_catalog::{Catalog, ContainerKind};
use plaza_core::{Ledger, LedgerError, Transition, UnitState};
use plaza_shared::{ReservationEvent, ReservationEventKind};
use plaza_store::app_config::BookingRules;
use plaza_store::EventBus;

use crate::models::{AvailabilityView, Reservation, ReservationStatus, UnitAvailability};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("no units requested")]
    Empty,

    #[error("too many units requested, limit is {limit}")]
    TooMany { limit: u32 },

    /// Part of the requested set was taken since the caller's last view.
    /// Names exactly the contested units so the caller can re-render.
    #[error("units no longer available: {units:?}")]
    PartiallyUnavailable { units: Vec<String> },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("requester does not own this reservation")]
    Unauthorized,
}

/// The allocator and release manager. All unit-level contention resolves in
/// the ledger's conditional commit; reservation-level operations additionally
/// serialize on the registry write lock so a reservation's status always
/// agrees with its units' ledger states.
pub struct BookingService {
    catalog: Arc<Catalog>,
    ledger: Arc<dyn Ledger>,
    events: EventBus,
    rules: BookingRules,
    reservations: RwLock<HashMap<Uuid, Reservation>>,
}

impl BookingService {
    pub fn new(
        catalog: Arc<Catalog>,
        ledger: Arc<dyn Ledger>,
        events: EventBus,
        rules: BookingRules,
    ) -> Self {
        Self {
            catalog,
            ledger,
            events,
            rules,
            reservations: RwLock::new(HashMap::new()),
        }
    }

    pub fn rules(&self) -> &BookingRules {
        &self.rules
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Attempt to move the requested unit set FREE -> HELD as one
    /// all-or-nothing step. Exactly one ledger round trip: success, or a
    /// definite failure the caller can act on. No queueing, no retry.
    pub async fn reserve(
        &self,
        container_id: Uuid,
        unit_ids: Vec<String>,
        requester_id: String,
        metadata: serde_json::Value,
    ) -> Result<Reservation, BookingError> {
        let container = self
            .catalog
            .container(container_id)
            .ok_or_else(|| BookingError::NotFound(format!("container {}", container_id)))?;

        // Requested ids are a set: dedupe, order is irrelevant.
        let units: Vec<String> = unit_ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        if units.is_empty() {
            return Err(BookingError::Empty);
        }
        let limit = self.rules.max_units_per_reservation;
        if units.len() > limit as usize {
            return Err(BookingError::TooMany { limit });
        }

        let mut total_amount = 0i32;
        let mut currency = None;
        for unit_id in &units {
            let unit = container.unit(unit_id).ok_or_else(|| {
                BookingError::NotFound(format!("unit {} in container {}", unit_id, container_id))
            })?;
            total_amount += unit.price_amount;
            currency.get_or_insert_with(|| unit.currency.clone());
        }
        let currency = currency.unwrap_or_else(|| "INR".to_string());

        let reservation_id = Uuid::new_v4();
        self.ledger
            .commit(container_id, Transition::hold(units.clone(), reservation_id))
            .await
            .map_err(|e| match e {
                LedgerError::Conflict { units } => BookingError::PartiallyUnavailable { units },
                LedgerError::UnknownContainer(id) => {
                    BookingError::NotFound(format!("container {}", id))
                }
                LedgerError::UnknownUnit(unit) => BookingError::NotFound(format!("unit {}", unit)),
            })?;

        let reservation = Reservation::new(
            reservation_id,
            container_id,
            requester_id,
            units,
            total_amount,
            currency,
            metadata,
            chrono::Duration::seconds(self.rules.hold_ttl_seconds as i64),
        );

        let mut reservations = self.reservations.write().await;
        reservations.insert(reservation_id, reservation.clone());
        drop(reservations);

        info!(
            reservation_id = %reservation_id,
            container_id = %container_id,
            units = reservation.unit_ids.len(),
            "units held"
        );
        self.publish(ReservationEventKind::UnitsHeld, &reservation);

        Ok(reservation)
    }

    /// HELD -> CONFIRMED. Terminal; confirmed units never return to FREE
    /// through this service. Confirming an already-confirmed reservation is
    /// a no-op success so retried payment callbacks do not error.
    pub async fn confirm(
        &self,
        reservation_id: Uuid,
        requester_id: &str,
    ) -> Result<Reservation, BookingError> {
        let mut reservations = self.reservations.write().await;
        let reservation = reservations
            .get_mut(&reservation_id)
            .ok_or_else(|| BookingError::NotFound(format!("reservation {}", reservation_id)))?;
        if reservation.requester_id.as_str() != requester_id {
            return Err(BookingError::Unauthorized);
        }

        match reservation.status {
            ReservationStatus::Confirmed => return Ok(reservation.clone()),
            ReservationStatus::Cancelled => {
                return Err(BookingError::Conflict("reservation was cancelled".to_string()))
            }
            ReservationStatus::Expired => {
                return Err(BookingError::Conflict("reservation has expired".to_string()))
            }
            ReservationStatus::Held => {}
        }

        // Lazy expiry: a lapsed hold is never confirmable, and its units go
        // back to the pool right away rather than waiting for the sweep.
        if reservation.is_expired(Utc::now()) {
            let release = Transition::release(reservation.unit_ids.clone(), reservation.id);
            match self.ledger.commit(reservation.container_id, release).await {
                Ok(()) => {
                    reservation.update_status(ReservationStatus::Expired);
                    self.publish(ReservationEventKind::ReservationExpired, reservation);
                }
                Err(e) => {
                    warn!(reservation_id = %reservation_id, error = %e, "expiry release failed");
                    reservation.update_status(ReservationStatus::Expired);
                }
            }
            return Err(BookingError::Conflict("hold expired before confirmation".to_string()));
        }

        let finalize = Transition::finalize(reservation.unit_ids.clone(), reservation.id);
        self.ledger
            .commit(reservation.container_id, finalize)
            .await
            .map_err(|e| BookingError::Conflict(e.to_string()))?;

        reservation.update_status(ReservationStatus::Confirmed);
        let prefix = match self.catalog.container(reservation.container_id).map(|c| c.kind) {
            Some(ContainerKind::Lot) => "PARK",
            _ => "EVT",
        };
        reservation.issue_fulfillment_code(prefix);

        info!(reservation_id = %reservation_id, "reservation confirmed");
        self.publish(ReservationEventKind::ReservationConfirmed, reservation);

        Ok(reservation.clone())
    }

    /// Requester-initiated release, regardless of remaining TTL. Cancelling
    /// an already-cancelled or expired reservation is a no-op success;
    /// cancelling a confirmed one conflicts (refund flows live elsewhere).
    pub async fn cancel(
        &self,
        reservation_id: Uuid,
        requester_id: &str,
    ) -> Result<Reservation, BookingError> {
        let mut reservations = self.reservations.write().await;
        let reservation = reservations
            .get_mut(&reservation_id)
            .ok_or_else(|| BookingError::NotFound(format!("reservation {}", reservation_id)))?;
        if reservation.requester_id.as_str() != requester_id {
            return Err(BookingError::Unauthorized);
        }

        match reservation.status {
            ReservationStatus::Cancelled | ReservationStatus::Expired => {
                return Ok(reservation.clone())
            }
            ReservationStatus::Confirmed => {
                return Err(BookingError::Conflict(
                    "confirmed reservations cannot be cancelled here".to_string(),
                ))
            }
            ReservationStatus::Held => {}
        }

        let release = Transition::release(reservation.unit_ids.clone(), reservation.id);
        self.ledger
            .commit(reservation.container_id, release)
            .await
            .map_err(|e| BookingError::Conflict(e.to_string()))?;

        reservation.update_status(ReservationStatus::Cancelled);
        info!(reservation_id = %reservation_id, "reservation cancelled");
        self.publish(ReservationEventKind::ReservationCancelled, reservation);

        Ok(reservation.clone())
    }

    /// Owner-scoped lookup.
    pub async fn get(
        &self,
        reservation_id: Uuid,
        requester_id: &str,
    ) -> Result<Reservation, BookingError> {
        let reservations = self.reservations.read().await;
        let reservation = reservations
            .get(&reservation_id)
            .ok_or_else(|| BookingError::NotFound(format!("reservation {}", reservation_id)))?;
        if reservation.requester_id.as_str() != requester_id {
            return Err(BookingError::Unauthorized);
        }
        Ok(reservation.clone())
    }

    /// Availability joined from the catalog and a fresh ledger snapshot.
    /// Counts are derived from per-unit states on every call.
    pub async fn snapshot(&self, container_id: Uuid) -> Result<AvailabilityView, BookingError> {
        let units = self
            .catalog
            .list_units(container_id)
            .map_err(|_| BookingError::NotFound(format!("container {}", container_id)))?;
        let entries = self
            .ledger
            .snapshot(container_id)
            .await
            .map_err(|_| BookingError::NotFound(format!("container {}", container_id)))?;

        let units: Vec<UnitAvailability> = units
            .iter()
            .map(|unit| UnitAvailability {
                unit_id: unit.id.clone(),
                kind: unit.kind,
                price_amount: unit.price_amount,
                currency: unit.currency.clone(),
                state: entries
                    .get(&unit.id)
                    .map(|e| e.state)
                    .unwrap_or(UnitState::Free),
            })
            .collect();
        let available = units.iter().filter(|u| u.state == UnitState::Free).count();
        let total = units.len();

        Ok(AvailabilityView {
            container_id,
            units,
            available,
            total,
        })
    }

    /// Release every lapsed hold. Conditional per reservation: a hold that
    /// got confirmed or cancelled since the scan is skipped, never clobbered.
    /// Returns the number of reservations expired.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut reservations = self.reservations.write().await;
        let lapsed: Vec<Uuid> = reservations
            .values()
            .filter(|r| r.is_expired(now))
            .map(|r| r.id)
            .collect();

        let mut released = 0;
        for reservation_id in lapsed {
            let Some(reservation) = reservations.get_mut(&reservation_id) else {
                continue;
            };
            let release = Transition::release(reservation.unit_ids.clone(), reservation.id);
            match self.ledger.commit(reservation.container_id, release).await {
                Ok(()) => {
                    reservation.update_status(ReservationStatus::Expired);
                    self.publish(ReservationEventKind::ReservationExpired, reservation);
                    released += 1;
                }
                Err(e) => {
                    debug!(reservation_id = %reservation_id, error = %e, "sweep skipped reservation");
                }
            }
        }
        released
    }

    fn publish(&self, kind: ReservationEventKind, reservation: &Reservation) {
        self.events.publish(ReservationEvent::new(
            kind,
            reservation.container_id,
            reservation.id,
            reservation.unit_ids.clone(),
            Utc::now().timestamp(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaza_catalog::CatalogSeed;
    use plaza_store::MemoryLedger;

    fn rules(ttl_seconds: u64) -> BookingRules {
        BookingRules {
            hold_ttl_seconds: ttl_seconds,
            max_units_per_reservation: 10,
            sweep_interval_seconds: 30,
        }
    }

    fn event_seed(container_id: Uuid, rows: &[&str], columns: &[u32]) -> CatalogSeed {
        serde_json::from_value(serde_json::json!({
            "events": [{
                "id": container_id,
                "title": "Tech Summit",
                "venue": "Main Auditorium",
                "event_date": "2026-09-15T18:30:00Z",
                "layout": {
                    "sections": [{
                        "name": "Main",
                        "rows": rows,
                        "columns": columns,
                        "price_amount": 50000
                    }]
                }
            }]
        }))
        .unwrap()
    }

    async fn service_from_seed(seed: CatalogSeed, rules: BookingRules) -> Arc<BookingService> {
        let catalog = Arc::new(Catalog::from_seed(seed).unwrap());
        let ledger = Arc::new(MemoryLedger::new());
        for container in catalog.containers() {
            ledger
                .register_container(container.id, container.units.iter().map(|u| u.id.clone()))
                .await;
        }
        Arc::new(BookingService::new(
            catalog,
            ledger,
            EventBus::new(16),
            rules,
        ))
    }

    async fn three_seat_service(ttl_seconds: u64) -> (Arc<BookingService>, Uuid) {
        let container_id = Uuid::new_v4();
        let seed = event_seed(container_id, &["A"], &[1, 2, 3]);
        (service_from_seed(seed, rules(ttl_seconds)).await, container_id)
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_reserve_then_snapshot_shows_held() {
        let (service, container_id) = three_seat_service(300).await;

        let reservation = service
            .reserve(
                container_id,
                ids(&["Main-A1", "Main-A2"]),
                "u1@example.com".to_string(),
                serde_json::Value::Null,
            )
            .await
            .unwrap();

        assert_eq!(reservation.status, ReservationStatus::Held);
        assert_eq!(reservation.unit_ids, ids(&["Main-A1", "Main-A2"]));
        assert_eq!(reservation.total_amount, 100000);

        let view = service.snapshot(container_id).await.unwrap();
        assert_eq!(view.available, 1);
        assert_eq!(view.total, 3);
        let held: Vec<&str> = view
            .units
            .iter()
            .filter(|u| u.state == UnitState::Held)
            .map(|u| u.unit_id.as_str())
            .collect();
        assert_eq!(held, vec!["Main-A1", "Main-A2"]);
    }

    #[tokio::test]
    async fn test_overlapping_reserve_names_contested_units() {
        let (service, container_id) = three_seat_service(300).await;

        service
            .reserve(
                container_id,
                ids(&["Main-A1", "Main-A2"]),
                "u1@example.com".to_string(),
                serde_json::Value::Null,
            )
            .await
            .unwrap();

        let err = service
            .reserve(
                container_id,
                ids(&["Main-A2", "Main-A3"]),
                "u2@example.com".to_string(),
                serde_json::Value::Null,
            )
            .await
            .unwrap_err();
        match err {
            BookingError::PartiallyUnavailable { units } => {
                assert_eq!(units, ids(&["Main-A2"]));
            }
            other => panic!("expected PartiallyUnavailable, got {:?}", other),
        }

        // Retrying with only the free seat succeeds.
        let retry = service
            .reserve(
                container_id,
                ids(&["Main-A3"]),
                "u2@example.com".to_string(),
                serde_json::Value::Null,
            )
            .await
            .unwrap();
        assert_eq!(retry.unit_ids, ids(&["Main-A3"]));
    }

    #[tokio::test]
    async fn test_concurrent_overlapping_reserves_have_one_winner() {
        let (service, container_id) = three_seat_service(300).await;

        let first = service.reserve(
            container_id,
            ids(&["Main-A1", "Main-A2"]),
            "u1@example.com".to_string(),
            serde_json::Value::Null,
        );
        let second = service.reserve(
            container_id,
            ids(&["Main-A2", "Main-A3"]),
            "u2@example.com".to_string(),
            serde_json::Value::Null,
        );

        let (a, b) = tokio::join!(first, second);
        assert_eq!(
            a.is_ok() as u8 + b.is_ok() as u8,
            1,
            "exactly one of two overlapping reserves may succeed"
        );
        let err = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        match err {
            BookingError::PartiallyUnavailable { units } => {
                assert!(units.contains(&"Main-A2".to_string()));
            }
            other => panic!("expected PartiallyUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_request_rejected() {
        let (service, container_id) = three_seat_service(300).await;

        let err = service
            .reserve(container_id, vec![], "u1@example.com".to_string(), serde_json::Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Empty));
    }

    #[tokio::test]
    async fn test_too_many_units_leaves_ledger_untouched() {
        let container_id = Uuid::new_v4();
        let seed = event_seed(container_id, &["A", "B"], &[1, 2, 3, 4, 5, 6]);
        let service = service_from_seed(seed, rules(300)).await;

        let requested: Vec<String> = (1..=6)
            .map(|c| format!("Main-A{}", c))
            .chain((1..=5).map(|c| format!("Main-B{}", c)))
            .collect();
        assert_eq!(requested.len(), 11);

        let err = service
            .reserve(container_id, requested, "u1@example.com".to_string(), serde_json::Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::TooMany { limit: 10 }));

        let view = service.snapshot(container_id).await.unwrap();
        assert_eq!(view.available, view.total);
    }

    #[tokio::test]
    async fn test_unknown_unit_and_container_not_found() {
        let (service, container_id) = three_seat_service(300).await;

        let err = service
            .reserve(container_id, ids(&["Main-Z9"]), "u1@example.com".to_string(), serde_json::Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));

        let err = service
            .reserve(Uuid::new_v4(), ids(&["Main-A1"]), "u1@example.com".to_string(), serde_json::Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_confirm_issues_fulfillment_code() {
        let (service, container_id) = three_seat_service(300).await;

        let reservation = service
            .reserve(
                container_id,
                ids(&["Main-A1"]),
                "u1@example.com".to_string(),
                serde_json::Value::Null,
            )
            .await
            .unwrap();

        let confirmed = service
            .confirm(reservation.id, "u1@example.com")
            .await
            .unwrap();
        assert_eq!(confirmed.status, ReservationStatus::Confirmed);
        assert!(confirmed
            .fulfillment_code
            .as_deref()
            .is_some_and(|c| c.starts_with("EVT-")));

        let view = service.snapshot(container_id).await.unwrap();
        let a1 = view.units.iter().find(|u| u.unit_id == "Main-A1").unwrap();
        assert_eq!(a1.state, UnitState::Confirmed);

        // Confirm is idempotent for retried payment callbacks.
        let again = service
            .confirm(reservation.id, "u1@example.com")
            .await
            .unwrap();
        assert_eq!(again.status, ReservationStatus::Confirmed);

        // Confirmed units are off limits for the sweep.
        assert_eq!(service.sweep().await, 0);
    }

    #[tokio::test]
    async fn test_cancel_releases_and_is_idempotent() {
        let (service, container_id) = three_seat_service(300).await;

        let reservation = service
            .reserve(
                container_id,
                ids(&["Main-A1", "Main-A2"]),
                "u1@example.com".to_string(),
                serde_json::Value::Null,
            )
            .await
            .unwrap();

        let cancelled = service.cancel(reservation.id, "u1@example.com").await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);

        let view = service.snapshot(container_id).await.unwrap();
        assert_eq!(view.available, 3);

        // Releasing an already-released reservation is a no-op, not an error.
        let again = service.cancel(reservation.id, "u1@example.com").await.unwrap();
        assert_eq!(again.status, ReservationStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_requires_owner() {
        let (service, container_id) = three_seat_service(300).await;

        let reservation = service
            .reserve(
                container_id,
                ids(&["Main-A1"]),
                "u1@example.com".to_string(),
                serde_json::Value::Null,
            )
            .await
            .unwrap();

        let err = service
            .cancel(reservation.id, "intruder@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Unauthorized));

        // The hold is untouched.
        let view = service.snapshot(container_id).await.unwrap();
        assert_eq!(view.available, 2);
    }

    #[tokio::test]
    async fn test_cancel_after_confirm_conflicts() {
        let (service, container_id) = three_seat_service(300).await;

        let reservation = service
            .reserve(
                container_id,
                ids(&["Main-A1"]),
                "u1@example.com".to_string(),
                serde_json::Value::Null,
            )
            .await
            .unwrap();
        service.confirm(reservation.id, "u1@example.com").await.unwrap();

        let err = service.cancel(reservation.id, "u1@example.com").await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_expired_hold_is_never_confirmable() {
        let (service, container_id) = three_seat_service(0).await;

        let reservation = service
            .reserve(
                container_id,
                ids(&["Main-A1", "Main-A2"]),
                "u1@example.com".to_string(),
                serde_json::Value::Null,
            )
            .await
            .unwrap();

        let err = service.confirm(reservation.id, "u1@example.com").await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict(_)));

        // Lazy expiry released the units on the failed confirm.
        let view = service.snapshot(container_id).await.unwrap();
        assert_eq!(view.available, 3);
        assert_eq!(service.sweep().await, 0);
    }

    #[tokio::test]
    async fn test_sweep_releases_lapsed_holds() {
        let (service, container_id) = three_seat_service(0).await;

        service
            .reserve(
                container_id,
                ids(&["Main-A1", "Main-A2"]),
                "u1@example.com".to_string(),
                serde_json::Value::Null,
            )
            .await
            .unwrap();

        assert_eq!(service.sweep().await, 1);
        let view = service.snapshot(container_id).await.unwrap();
        assert_eq!(view.available, 3);

        // Nothing left to release on the next pass.
        assert_eq!(service.sweep().await, 0);
    }

    #[tokio::test]
    async fn test_reserve_emits_held_and_cancel_emits_cancelled() {
        let (service, container_id) = three_seat_service(300).await;
        let mut rx = service.events().subscribe();

        let reservation = service
            .reserve(
                container_id,
                ids(&["Main-A1"]),
                "u1@example.com".to_string(),
                serde_json::Value::Null,
            )
            .await
            .unwrap();
        service.cancel(reservation.id, "u1@example.com").await.unwrap();

        let held = rx.recv().await.unwrap();
        assert_eq!(held.kind, ReservationEventKind::UnitsHeld);
        assert_eq!(held.reservation_id, reservation.id);
        let cancelled = rx.recv().await.unwrap();
        assert_eq!(cancelled.kind, ReservationEventKind::ReservationCancelled);
    }

    #[tokio::test]
    async fn test_parking_reservation_carries_vehicle_metadata() {
        let container_id = Uuid::new_v4();
        let seed: CatalogSeed = serde_json::from_value(serde_json::json!({
            "lots": [{
                "id": container_id,
                "name": "North Lot",
                "car_slots": 2,
                "bike_slots": 2,
                "car_rate_amount": 5000,
                "bike_rate_amount": 2000
            }]
        }))
        .unwrap();
        let service = service_from_seed(seed, rules(300)).await;

        let reservation = service
            .reserve(
                container_id,
                ids(&["C-01"]),
                "driver@example.com".to_string(),
                serde_json::json!({ "vehicle_number": "KA-01-AB-1234" }),
            )
            .await
            .unwrap();
        assert_eq!(reservation.metadata["vehicle_number"], "KA-01-AB-1234");
        assert_eq!(reservation.total_amount, 5000);

        let confirmed = service
            .confirm(reservation.id, "driver@example.com")
            .await
            .unwrap();
        assert!(confirmed
            .fulfillment_code
            .as_deref()
            .is_some_and(|c| c.starts_with("PARK-")));
    }
}
