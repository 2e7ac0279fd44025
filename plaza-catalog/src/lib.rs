pub mod catalog;
pub mod layout;
pub mod lot;

pub use catalog::{Catalog, CatalogError, CatalogSeed, Container, ContainerKind, Unit, UnitKind};
pub use layout::{LayoutSpec, SeatLayout, Section};
pub use lot::{LotSpec, SlotKind};
