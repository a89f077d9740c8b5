//! Hierarchy Builder
//!
//! Turns flat per-wafer rows into the nested [`Dataset`]. Weeks and lots keep
//! the order in which they first appear, because that order becomes the
//! x-axis category order in every renderer.
//!
//! Lot statistics are computed in parallel with Rayon. Each lot is summarised
//! independently by the same pure function and collected back in order, so
//! the result is identical to a sequential build.

use crate::dataset::{Dataset, Lot, Wafer, Week};
use crate::error::DataContractError;
use fxhash::FxHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One flat yield row, as produced by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldRecord {
    /// Lot identifier
    #[serde(rename = "Lot_id")]
    pub lot_id: String,
    /// Wafer identifier within the lot
    #[serde(rename = "Wafer_id")]
    pub wafer_id: String,
    /// Production year
    #[serde(rename = "Year")]
    pub year: u32,
    /// Production week
    #[serde(rename = "Week_no")]
    pub week_no: u32,
    /// Yield percentage
    #[serde(rename = "Yield")]
    pub value: f64,
}

struct PendingLot {
    lot_id: String,
    wafers: Vec<Wafer>,
}

struct PendingWeek {
    week_no: u32,
    lots: Vec<PendingLot>,
    lot_index: FxHashMap<String, usize>,
}

/// Accumulates wafers per (week, lot) and builds a validated [`Dataset`]
pub struct HierarchyBuilder {
    year: u32,
    weeks: Vec<PendingWeek>,
    week_index: FxHashMap<u32, usize>,
}

impl HierarchyBuilder {
    /// Start an empty hierarchy for `year`
    pub fn new(year: u32) -> Self {
        Self {
            year,
            weeks: Vec::new(),
            week_index: FxHashMap::default(),
        }
    }

    fn pending_lot(&mut self, week_no: u32, lot_id: String) -> &mut PendingLot {
        let week_slot = match self.week_index.get(&week_no) {
            Some(&slot) => slot,
            None => {
                self.weeks.push(PendingWeek {
                    week_no,
                    lots: Vec::new(),
                    lot_index: FxHashMap::default(),
                });
                self.week_index.insert(week_no, self.weeks.len() - 1);
                self.weeks.len() - 1
            }
        };
        let week = &mut self.weeks[week_slot];

        let lot_slot = match week.lot_index.get(&lot_id) {
            Some(&slot) => slot,
            None => {
                week.lots.push(PendingLot {
                    lot_id: lot_id.clone(),
                    wafers: Vec::new(),
                });
                week.lot_index.insert(lot_id, week.lots.len() - 1);
                week.lots.len() - 1
            }
        };
        &mut week.lots[lot_slot]
    }

    /// Add a lot to `week_no`. Adding an existing lot id again extends it.
    ///
    /// An empty `wafers` iterator still registers the lot, which then fails
    /// the build with [`DataContractError::EmptyLot`].
    pub fn add_lot(
        &mut self,
        week_no: u32,
        lot_id: impl Into<String>,
        wafers: impl IntoIterator<Item = Wafer>,
    ) -> &mut Self {
        self.pending_lot(week_no, lot_id.into()).wafers.extend(wafers);
        self
    }

    /// Add a single wafer to a lot, creating week and lot as needed
    pub fn add_wafer(&mut self, week_no: u32, lot_id: impl Into<String>, wafer: Wafer) -> &mut Self {
        self.pending_lot(week_no, lot_id.into()).wafers.push(wafer);
        self
    }

    /// Add a flat record, checking that it belongs to this year
    pub fn add_record(&mut self, record: YieldRecord) -> Result<&mut Self, DataContractError> {
        if record.year != self.year {
            return Err(DataContractError::YearMismatch {
                lot_id: record.lot_id,
                expected: self.year,
                found: record.year,
            });
        }
        let wafer = Wafer::new(record.wafer_id, record.value);
        Ok(self.add_wafer(record.week_no, record.lot_id, wafer))
    }

    /// Validate every lot, attach statistics and derive the metadata
    pub fn build(self) -> Result<Dataset, DataContractError> {
        let shape: Vec<(u32, usize)> = self.weeks.iter().map(|w| (w.week_no, w.lots.len())).collect();

        let flat: Vec<(u32, PendingLot)> = self
            .weeks
            .into_iter()
            .flat_map(|week| {
                let week_no = week.week_no;
                week.lots.into_iter().map(move |lot| (week_no, lot))
            })
            .collect();

        let mut lots = flat
            .into_par_iter()
            .map(|(week_no, lot)| Lot::new(week_no, lot.lot_id, lot.wafers))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter();

        let weeks = shape
            .into_iter()
            .map(|(week_no, count)| Week::new(week_no, lots.by_ref().take(count).collect()))
            .collect();

        Dataset::new(self.year, weeks)
    }
}

impl Dataset {
    /// Group flat records by (week, lot) in first-appearance order
    pub fn from_records(
        year: u32,
        records: impl IntoIterator<Item = YieldRecord>,
    ) -> Result<Self, DataContractError> {
        let mut builder = HierarchyBuilder::new(year);
        for record in records {
            builder.add_record(record)?;
        }
        builder.build()
    }
}
