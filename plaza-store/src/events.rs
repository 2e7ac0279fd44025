use tokio::sync::broadcast;
use tracing::debug;

use plaza_shared::ReservationEvent;

/// Process-wide fan-out of reservation transitions. Subscribers are SSE
/// streams and any external consumer (receipts, fulfillment); publishing
/// never blocks or fails the transition that triggered it.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ReservationEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReservationEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: ReservationEvent) {
        debug!(
            kind = event.kind.as_str(),
            container_id = %event.container_id,
            reservation_id = %event.reservation_id,
            units = event.unit_ids.len(),
            "publishing reservation event"
        );
        // Send fails only when nobody is subscribed; that is fine.
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
