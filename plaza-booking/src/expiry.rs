use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use crate::service::BookingService;

/// Periodic expiry sweep. Runs alongside live traffic; the conditional
/// release inside `BookingService::sweep` keeps it from ever touching a
/// reservation that got confirmed or cancelled between ticks.
pub struct ExpirySweeper {
    service: Arc<BookingService>,
    period: Duration,
}

impl ExpirySweeper {
    pub fn new(service: Arc<BookingService>, period: Duration) -> Self {
        Self { service, period }
    }

    pub async fn run(self) {
        let mut ticker = interval(self.period);
        info!(period_seconds = self.period.as_secs(), "expiry sweeper started");
        loop {
            ticker.tick().await;
            let released = self.service.sweep().await;
            if released > 0 {
                info!(released, "expiry sweep released lapsed holds");
            }
        }
    }
}
