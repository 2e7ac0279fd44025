use std::sync::Arc;

use plaza_booking::BookingService;
use plaza_catalog::Catalog;
use plaza_store::EventBus;

#[derive(Clone)]
pub struct AppState {
    pub booking: Arc<BookingService>,
    pub catalog: Arc<Catalog>,
    pub events: EventBus,
}
