//! Rectangular Selection
//!
//! Interactive adapters forward a completed brush gesture as a
//! [`SelectionRange`] in data coordinates: x is the lot's category index,
//! y is the yield. The adapter resolves the wafers inside the rectangle and
//! calls the one registered [`SelectionHandler`] directly.

use crate::option::PlottedPoint;
use serde::{Deserialize, Serialize};

/// Selection rectangle in data coordinates (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRange {
    /// Left edge, in lot category units
    pub min_x: f64,
    /// Right edge, in lot category units
    pub max_x: f64,
    /// Bottom edge, in yield percent
    pub min_y: f64,
    /// Top edge, in yield percent
    pub max_y: f64,
}

impl SelectionRange {
    /// Build a range from two corners in any order
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            max_x: x1.max(x2),
            min_y: y1.min(y2),
            max_y: y1.max(y2),
        }
    }

    /// Whether (x, y) lies inside the rectangle
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// A wafer inside a selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPoint {
    /// Week of the lot
    pub week_no: u32,
    /// Lot identifier
    pub lot_id: String,
    /// Wafer identifier
    pub wafer_id: String,
    /// Category index of the lot
    pub x: f64,
    /// Yield
    pub y: f64,
}

/// Payload delivered to the selection handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEvent {
    /// Rectangle drawn by the user
    pub range: SelectionRange,
    /// Wafers inside the rectangle, in chart order
    pub points: Vec<SelectedPoint>,
}

/// Single-argument selection callback
pub type SelectionHandler = Box<dyn FnMut(&SelectionEvent)>;

pub(crate) fn select_points(points: &[PlottedPoint], range: SelectionRange) -> SelectionEvent {
    let points = points
        .iter()
        .filter(|p| range.contains(p.x, p.y))
        .map(|p| SelectedPoint {
            week_no: p.week_no,
            lot_id: p.lot_id.clone(),
            wafer_id: p.wafer_id.clone(),
            x: p.x,
            y: p.y,
        })
        .collect();
    SelectionEvent { range, points }
}
