//! Flat per-well records.
//!
//! A record carries every way of naming its well next to the well's
//! attributes, so it can be joined against data that labels wells as `A1`,
//! `A01`, or by row and column index.

use crate::file::{Layout, PlateLayout};
use serde::Serialize;
use wellmap_layout::{col_name, row_name, well0_name, well_name, AttributeSet};

/// One well of one plate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,

    /// e.g. "A1"
    pub well: String,

    /// Zero-padded, e.g. "A01"
    pub well0: String,

    pub row: String,
    pub col: String,
    pub row_i: usize,
    pub col_j: usize,

    #[serde(flatten)]
    pub attributes: AttributeSet,
}

impl PlateLayout {
    /// Records for every well on this plate.
    ///
    /// Zero-padded names use as many digits as the widest column number on
    /// the plate, and never fewer than a 12-column plate needs.
    pub fn records(&self) -> Vec<WellRecord> {
        let max_j = self.wells.indices().map(|index| index.j).fold(12, usize::max);
        let digits = (max_j + 1).to_string().len();

        self.wells
            .iter()
            .map(|(index, attrs)| WellRecord {
                plate: self.name.clone(),
                well: well_name(index.i, index.j),
                well0: well0_name(index.i, index.j, digits),
                row: row_name(index.i),
                col: col_name(index.j),
                row_i: index.i,
                col_j: index.j,
                attributes: attrs.clone(),
            })
            .collect()
    }
}

impl Layout {
    /// Records for every well of every plate, in plate order.
    pub fn records(&self) -> Vec<WellRecord> {
        self.plates.iter().flat_map(PlateLayout::records).collect()
    }
}
