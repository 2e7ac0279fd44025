use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::layout::{LayoutSpec, SeatLayout};
use crate::lot::LotSpec;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitKind {
    Seat,
    Slot,
}

/// One allocatable unit with its static attributes. State lives in the
/// ledger, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub kind: UnitKind,
    pub price_amount: i32,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerKind {
    Event,
    Lot,
}

/// A bookable inventory: an event (seats) or a parking lot (slots). Units
/// are in deterministic display order, fixed at load time.
#[derive(Debug, Clone, Serialize)]
pub struct Container {
    pub id: Uuid,
    pub kind: ContainerKind,
    pub name: String,
    pub venue: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub units: Vec<Unit>,
}

impl Container {
    pub fn unit(&self, unit_id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == unit_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("container not found: {0}")]
    UnknownContainer(Uuid),

    #[error("duplicate container id: {0}")]
    DuplicateContainer(Uuid),

    #[error("duplicate unit {unit} in container {container}")]
    DuplicateUnit { container: Uuid, unit: String },

    #[error("failed to read catalog seed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog seed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
pub struct EventSeed {
    pub id: Uuid,
    pub title: String,
    pub venue: String,
    pub event_date: DateTime<Utc>,
    pub description: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub layout: LayoutSpec,
}

#[derive(Debug, Deserialize)]
pub struct LotSeed {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(flatten)]
    pub spec: LotSpec,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// Seed file contents: the fixed inventory this deployment sells.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub events: Vec<EventSeed>,
    #[serde(default)]
    pub lots: Vec<LotSeed>,
}

/// The fixed set of containers and their units. Read-only after load;
/// seeding is config/import, not an API concern.
pub struct Catalog {
    containers: HashMap<Uuid, Container>,
    order: Vec<Uuid>,
}

impl Catalog {
    pub fn from_seed(seed: CatalogSeed) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            containers: HashMap::new(),
            order: Vec::new(),
        };

        for event in seed.events {
            let layout = event.layout.into_layout();
            let units = seat_units(&layout, &event.currency);
            catalog.insert(Container {
                id: event.id,
                kind: ContainerKind::Event,
                name: event.title,
                venue: Some(event.venue),
                event_date: Some(event.event_date),
                description: event.description,
                units,
            })?;
        }

        for lot in seed.lots {
            let units = lot
                .spec
                .slots()
                .into_iter()
                .map(|(id, _, rate)| Unit {
                    id,
                    kind: UnitKind::Slot,
                    price_amount: rate,
                    currency: lot.currency.clone(),
                })
                .collect();
            catalog.insert(Container {
                id: lot.id,
                kind: ContainerKind::Lot,
                name: lot.name,
                venue: None,
                event_date: None,
                description: None,
                units,
            })?;
        }

        Ok(catalog)
    }

    /// Load a seed file (JSON) from disk.
    pub fn load(path: &str) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let seed: CatalogSeed = serde_json::from_str(&raw)?;
        Self::from_seed(seed)
    }

    fn insert(&mut self, container: Container) -> Result<(), CatalogError> {
        if self.containers.contains_key(&container.id) {
            return Err(CatalogError::DuplicateContainer(container.id));
        }
        let mut seen = std::collections::HashSet::new();
        for unit in &container.units {
            if !seen.insert(unit.id.clone()) {
                return Err(CatalogError::DuplicateUnit {
                    container: container.id,
                    unit: unit.id.clone(),
                });
            }
        }
        self.order.push(container.id);
        self.containers.insert(container.id, container);
        Ok(())
    }

    /// Containers in seed order.
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.order.iter().filter_map(|id| self.containers.get(id))
    }

    pub fn container(&self, id: Uuid) -> Option<&Container> {
        self.containers.get(&id)
    }

    /// Units of a container in deterministic display order: sections as
    /// declared, then row, then column; parking slots cars-then-bikes in
    /// numeric order.
    pub fn list_units(&self, container_id: Uuid) -> Result<&[Unit], CatalogError> {
        self.containers
            .get(&container_id)
            .map(|c| c.units.as_slice())
            .ok_or(CatalogError::UnknownContainer(container_id))
    }
}

fn seat_units(layout: &SeatLayout, currency: &str) -> Vec<Unit> {
    let mut units = Vec::with_capacity(layout.capacity());
    for section in &layout.sections {
        for row in &section.rows {
            for &column in &section.columns {
                units.push(Unit {
                    id: SeatLayout::seat_id(&section.name, row, column),
                    kind: UnitKind::Seat,
                    price_amount: section.price_amount,
                    currency: currency.to_string(),
                });
            }
        }
    }
    units
}
