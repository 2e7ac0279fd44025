use serde::{Deserialize, Serialize};

/// A seating section: a named block of rows and numbered columns sold at one
/// price tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub rows: Vec<String>,
    pub columns: Vec<u32>,
    pub price_amount: i32,
}

/// Seat layout for an event container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatLayout {
    pub sections: Vec<Section>,
}

/// Seed-file layout formats. Venues either describe their sections
/// explicitly or provide a plain row/column grid with a base price, which
/// expands into three tiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LayoutSpec {
    Sections { sections: Vec<Section> },
    Simple {
        rows: Vec<String>,
        columns: Vec<u32>,
        price_amount: i32,
    },
}

impl LayoutSpec {
    /// Expand into a sectioned layout. Simple grids split their rows into
    /// thirds: Premium at 1.5x base price, Standard at 1.0x, Economy at 0.7x,
    /// front rows priced highest.
    pub fn into_layout(self) -> SeatLayout {
        match self {
            LayoutSpec::Sections { sections } => SeatLayout { sections },
            LayoutSpec::Simple {
                rows,
                columns,
                price_amount,
            } => {
                let mid = rows.len() / 3;
                let sections = vec![
                    Section {
                        name: "Premium".to_string(),
                        rows: rows[..mid].to_vec(),
                        columns: columns.clone(),
                        price_amount: (price_amount as f64 * 1.5) as i32,
                    },
                    Section {
                        name: "Standard".to_string(),
                        rows: rows[mid..mid * 2].to_vec(),
                        columns: columns.clone(),
                        price_amount,
                    },
                    Section {
                        name: "Economy".to_string(),
                        rows: rows[mid * 2..].to_vec(),
                        columns,
                        price_amount: (price_amount as f64 * 0.7) as i32,
                    },
                ];
                SeatLayout { sections }
            }
        }
    }
}

impl SeatLayout {
    /// Display identifier for one seat, e.g. "Premium-A1".
    pub fn seat_id(section: &str, row: &str, column: u32) -> String {
        format!("{}-{}{}", section, row, column)
    }

    /// Total seat count across all sections.
    pub fn capacity(&self) -> usize {
        self.sections
            .iter()
            .map(|s| s.rows.len() * s.columns.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(rows: &[&str], columns: &[u32], price: i32) -> LayoutSpec {
        LayoutSpec::Simple {
            rows: rows.iter().map(|r| r.to_string()).collect(),
            columns: columns.to_vec(),
            price_amount: price,
        }
    }

    #[test]
    fn test_simple_grid_expands_into_thirds() {
        let layout = simple(&["A", "B", "C", "D", "E", "F", "G", "H", "I"], &[1, 2], 1000)
            .into_layout();

        assert_eq!(layout.sections.len(), 3);
        assert_eq!(layout.sections[0].name, "Premium");
        assert_eq!(layout.sections[0].rows, vec!["A", "B", "C"]);
        assert_eq!(layout.sections[0].price_amount, 1500);
        assert_eq!(layout.sections[1].rows, vec!["D", "E", "F"]);
        assert_eq!(layout.sections[1].price_amount, 1000);
        assert_eq!(layout.sections[2].name, "Economy");
        assert_eq!(layout.sections[2].rows, vec!["G", "H", "I"]);
        assert_eq!(layout.sections[2].price_amount, 700);
        assert_eq!(layout.capacity(), 18);
    }

    #[test]
    fn test_uneven_rows_land_in_economy() {
        // 4 rows: one per premium/standard, the remainder in economy.
        let layout = simple(&["A", "B", "C", "D"], &[1], 1000).into_layout();

        assert_eq!(layout.sections[0].rows, vec!["A"]);
        assert_eq!(layout.sections[1].rows, vec!["B"]);
        assert_eq!(layout.sections[2].rows, vec!["C", "D"]);
    }

    #[test]
    fn test_seat_id_format() {
        assert_eq!(SeatLayout::seat_id("Premium", "A", 1), "Premium-A1");
        assert_eq!(SeatLayout::seat_id("Standard", "F", 12), "Standard-F12");
    }
}
