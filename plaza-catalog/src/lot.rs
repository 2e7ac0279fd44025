use serde::{Deserialize, Serialize};

/// Vehicle class a parking slot accepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Car,
    Bike,
}

impl SlotKind {
    /// Slot-number prefix: "C" for car slots, "B" for bike slots.
    pub fn prefix(&self) -> &'static str {
        match self {
            SlotKind::Car => "C",
            SlotKind::Bike => "B",
        }
    }
}

/// Seed description of a parking lot: slot counts per vehicle class and a
/// flat rate for each. Slots are numbered from 1, e.g. "C-01".."C-40".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotSpec {
    pub car_slots: u32,
    pub bike_slots: u32,
    pub car_rate_amount: i32,
    pub bike_rate_amount: i32,
}

impl LotSpec {
    pub fn slot_id(kind: SlotKind, number: u32) -> String {
        format!("{}-{:02}", kind.prefix(), number)
    }

    /// Slot ids with rates, cars first, in numeric order.
    pub fn slots(&self) -> Vec<(String, SlotKind, i32)> {
        let mut out = Vec::with_capacity((self.car_slots + self.bike_slots) as usize);
        for n in 1..=self.car_slots {
            out.push((Self::slot_id(SlotKind::Car, n), SlotKind::Car, self.car_rate_amount));
        }
        for n in 1..=self.bike_slots {
            out.push((Self::slot_id(SlotKind::Bike, n), SlotKind::Bike, self.bike_rate_amount));
        }
        out
    }
}
