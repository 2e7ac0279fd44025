pub mod events;
pub mod pii;

pub use events::{ReservationEvent, ReservationEventKind};
pub use pii::Masked;
