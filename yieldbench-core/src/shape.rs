//! Dataset Shape
//!
//! The three knobs a test request varies, plus the production year.

use crate::error::DataContractError;
use serde::{Deserialize, Serialize};

/// Parameters describing the size of a generated dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetShape {
    /// Production year
    pub year: u32,
    /// Weeks in the year
    pub weeks: u32,
    /// Lots produced each week
    pub lots_per_week: u32,
    /// Wafers in each lot
    pub wafers_per_lot: u32,
}

impl Default for DatasetShape {
    fn default() -> Self {
        Self {
            year: 2025,
            weeks: 52,
            lots_per_week: 10,
            wafers_per_lot: 25,
        }
    }
}

/// Named presets, smallest first
pub const PRESETS: &[(&str, u32, u32, u32)] = &[
    ("small", 4, 5, 10),
    ("medium", 12, 10, 20),
    ("large", 52, 20, 25),
    ("stress", 52, 100, 25),
];

impl DatasetShape {
    /// Shape for the default year
    pub fn new(weeks: u32, lots_per_week: u32, wafers_per_lot: u32) -> Self {
        Self {
            weeks,
            lots_per_week,
            wafers_per_lot,
            ..Self::default()
        }
    }

    /// Look up a named preset (`small`, `medium`, `large`, `stress`)
    pub fn preset(name: &str) -> Option<Self> {
        PRESETS
            .iter()
            .find(|(preset, ..)| preset.eq_ignore_ascii_case(name))
            .map(|&(_, weeks, lots, wafers)| Self::new(weeks, lots, wafers))
    }

    /// Override the production year
    pub fn with_year(mut self, year: u32) -> Self {
        self.year = year;
        self
    }

    /// Total lots (`weeks × lots_per_week`)
    pub fn total_lots(&self) -> u64 {
        u64::from(self.weeks) * u64::from(self.lots_per_week)
    }

    /// Total wafer observations (`weeks × lots_per_week × wafers_per_lot`)
    pub fn data_points(&self) -> u64 {
        self.total_lots() * u64::from(self.wafers_per_lot)
    }

    /// Every count must be at least 1
    pub fn validate(&self) -> Result<(), DataContractError> {
        let fields = [
            ("weeks", self.weeks),
            ("lots_per_week", self.lots_per_week),
            ("wafers_per_lot", self.wafers_per_lot),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(DataContractError::InvalidShape(format!(
                "{name} must be at least 1"
            ))),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for DatasetShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}w × {}l × {}wf ({} points)",
            self.weeks,
            self.lots_per_week,
            self.wafers_per_lot,
            self.data_points()
        )
    }
}
