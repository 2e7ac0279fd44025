pub mod expiry;
pub mod models;
pub mod service;

pub use expiry::ExpirySweeper;
pub use models::{AvailabilityView, Reservation, ReservationStatus, UnitAvailability};
pub use service::{BookingError, BookingService};
