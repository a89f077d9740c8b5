//! Hierarchical Yield Dataset
//!
//! ```text
//! Dataset
//!  ├── metadata (year, totals; derived from the structure)
//!  ├── hierarchy (Year → Week_no → Lot_id)
//!  └── weeks[]            ordered as generated
//!       └── lots[]        ordered as generated (x-axis category order)
//!            ├── wafers[] (Wafer_id, Yield)
//!            └── stats    five-number summary of the wafers
//! ```
//!
//! Every type here keeps its fields private. Statistics and metadata are
//! derived when a value is constructed or mutated, so a reader can never
//! observe figures that disagree with the observations underneath.

use crate::error::DataContractError;
use serde::{Deserialize, Serialize};
use yieldbench_stats::{BoxStatistics, StatsError, compute_box_statistics};

/// Lowest valid yield percentage
pub const MIN_YIELD: f64 = 0.0;

/// Highest valid yield percentage
pub const MAX_YIELD: f64 = 100.0;

/// A single wafer measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wafer {
    #[serde(rename = "Wafer_id")]
    wafer_id: String,
    #[serde(rename = "Yield")]
    value: f64,
}

impl Wafer {
    /// Create a wafer observation
    pub fn new(wafer_id: impl Into<String>, value: f64) -> Self {
        Self {
            wafer_id: wafer_id.into(),
            value,
        }
    }

    /// Wafer identifier, e.g. `W07`
    pub fn wafer_id(&self) -> &str {
        &self.wafer_id
    }

    /// Yield percentage
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// A manufacturing lot with its derived box statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LotWire")]
pub struct Lot {
    lot_id: String,
    wafers: Vec<Wafer>,
    stats: BoxStatistics,
}

fn validate_wafer(lot_id: &str, wafer: &Wafer) -> Result<(), DataContractError> {
    if wafer.value.is_finite() && (MIN_YIELD..=MAX_YIELD).contains(&wafer.value) {
        Ok(())
    } else {
        Err(DataContractError::YieldOutOfRange {
            lot_id: lot_id.to_string(),
            wafer_id: wafer.wafer_id.clone(),
            value: wafer.value,
        })
    }
}

fn lot_statistics(week_no: u32, lot_id: &str, wafers: &[Wafer]) -> Result<BoxStatistics, DataContractError> {
    let values: Vec<f64> = wafers.iter().map(Wafer::value).collect();
    compute_box_statistics(&values).map_err(|e| match e {
        StatsError::Empty => DataContractError::EmptyLot {
            week_no,
            lot_id: lot_id.to_string(),
        },
        StatsError::NonFinite { index, value } => DataContractError::YieldOutOfRange {
            lot_id: lot_id.to_string(),
            wafer_id: wafers[index].wafer_id.clone(),
            value,
        },
    })
}

impl Lot {
    /// Build a lot, validating every wafer and computing its statistics.
    ///
    /// `week_no` is only used to describe the failure when `wafers` is empty.
    pub fn new(
        week_no: u32,
        lot_id: impl Into<String>,
        wafers: Vec<Wafer>,
    ) -> Result<Self, DataContractError> {
        let lot_id = lot_id.into();
        for wafer in &wafers {
            validate_wafer(&lot_id, wafer)?;
        }
        let stats = lot_statistics(week_no, &lot_id, &wafers)?;
        Ok(Self {
            lot_id,
            wafers,
            stats,
        })
    }

    /// Append a wafer and recompute the statistics
    pub fn push_wafer(&mut self, wafer: Wafer) -> Result<(), DataContractError> {
        validate_wafer(&self.lot_id, &wafer)?;
        self.wafers.push(wafer);
        self.stats = lot_statistics(0, &self.lot_id, &self.wafers)?;
        Ok(())
    }

    /// Lot identifier, e.g. `L0001`
    pub fn lot_id(&self) -> &str {
        &self.lot_id
    }

    /// Wafers in generation order
    pub fn wafers(&self) -> &[Wafer] {
        &self.wafers
    }

    /// Box statistics of the wafer yields
    pub fn stats(&self) -> &BoxStatistics {
        &self.stats
    }

    /// Number of wafers
    pub fn len(&self) -> usize {
        self.wafers.len()
    }

    /// Always false for a constructed lot
    pub fn is_empty(&self) -> bool {
        self.wafers.is_empty()
    }
}

/// A production week and its lots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Week {
    week_no: u32,
    lots: Vec<Lot>,
}

impl Week {
    /// Create a week from already validated lots
    pub fn new(week_no: u32, lots: Vec<Lot>) -> Self {
        Self { week_no, lots }
    }

    /// Week number (1-based)
    pub fn week_no(&self) -> u32 {
        self.week_no
    }

    /// Lots in insertion order
    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    /// Wafers across all lots of the week
    pub fn wafer_count(&self) -> usize {
        self.lots.iter().map(Lot::len).sum()
    }
}

/// Aggregate counts describing a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Production year
    pub year: u32,
    /// Number of weeks
    pub total_weeks: usize,
    /// Number of lots across all weeks
    pub total_lots: usize,
    /// Largest lot size; equals the configured size for generated data
    pub wafers_per_lot: usize,
    /// Number of wafer observations
    pub total_points: usize,
}

/// Drill-down levels of the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    /// Drill-down keys, outermost first
    pub levels: Vec<String>,
    /// Years present in the dataset
    pub years: Vec<u32>,
}

impl Hierarchy {
    fn for_year(year: u32) -> Self {
        Self {
            levels: vec![
                "Year".to_string(),
                "Week_no".to_string(),
                "Lot_id".to_string(),
            ],
            years: vec![year],
        }
    }
}

/// Complete year → week → lot → wafer dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetWire")]
pub struct Dataset {
    metadata: DatasetMetadata,
    hierarchy: Hierarchy,
    weeks: Vec<Week>,
}

impl Dataset {
    /// Assemble a dataset from validated weeks, deriving its metadata.
    pub fn new(year: u32, weeks: Vec<Week>) -> Result<Self, DataContractError> {
        let metadata = derive_metadata(year, &weeks);
        if metadata.total_lots == 0 {
            return Err(DataContractError::EmptyDataset);
        }
        Ok(Self {
            metadata,
            hierarchy: Hierarchy::for_year(year),
            weeks,
        })
    }

    /// Cached aggregate counts
    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Hierarchy descriptor
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Weeks in generation order
    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    /// Production year
    pub fn year(&self) -> u32 {
        self.metadata.year
    }

    /// Total wafer observations
    pub fn total_points(&self) -> usize {
        self.metadata.total_points
    }

    /// Every lot paired with its week number, in display order
    pub fn lots(&self) -> impl Iterator<Item = (u32, &Lot)> + '_ {
        self.weeks
            .iter()
            .flat_map(|week| week.lots.iter().map(move |lot| (week.week_no, lot)))
    }
}

fn derive_metadata(year: u32, weeks: &[Week]) -> DatasetMetadata {
    let lots = weeks.iter().flat_map(|w| w.lots.iter());
    let (total_lots, total_points, wafers_per_lot) =
        lots.fold((0, 0, 0), |(lots, points, widest), lot| {
            (lots + 1, points + lot.len(), widest.max(lot.len()))
        });

    DatasetMetadata {
        year,
        total_weeks: weeks.len(),
        total_lots,
        wafers_per_lot,
        total_points,
    }
}

/// Lot as it appears on the wire; `stats` is ignored and recomputed.
#[derive(Debug, Clone, Deserialize)]
pub struct LotWire {
    /// Lot identifier
    pub lot_id: String,
    /// Wafers in insertion order
    pub wafers: Vec<Wafer>,
    /// Statistics sent by the server
    #[serde(default)]
    pub stats: Option<BoxStatistics>,
}

/// Week as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct WeekWire {
    /// Week number
    pub week_no: u32,
    /// Lots in display order
    pub lots: Vec<LotWire>,
}

/// Dataset as it appears on the wire, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetWire {
    /// Declared counts, checked against the structure
    pub metadata: DatasetMetadata,
    /// Hierarchy descriptor, rebuilt when absent
    #[serde(default)]
    pub hierarchy: Option<Hierarchy>,
    /// Weeks in display order
    pub weeks: Vec<WeekWire>,
}

impl TryFrom<LotWire> for Lot {
    type Error = DataContractError;

    fn try_from(wire: LotWire) -> Result<Self, Self::Error> {
        Lot::new(0, wire.lot_id, wire.wafers)
    }
}

impl TryFrom<DatasetWire> for Dataset {
    type Error = DataContractError;

    fn try_from(wire: DatasetWire) -> Result<Self, Self::Error> {
        let declared = wire.metadata;
        let weeks = wire
            .weeks
            .into_iter()
            .map(|week| {
                let lots = week
                    .lots
                    .into_iter()
                    .map(|lot| Lot::new(week.week_no, lot.lot_id, lot.wafers))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Week::new(week.week_no, lots))
            })
            .collect::<Result<Vec<_>, DataContractError>>()?;

        let mut dataset = Dataset::new(declared.year, weeks)?;
        let actual = dataset.metadata;
        let checks = [
            ("total_weeks", declared.total_weeks, actual.total_weeks),
            ("total_lots", declared.total_lots, actual.total_lots),
            ("wafers_per_lot", declared.wafers_per_lot, actual.wafers_per_lot),
            ("total_points", declared.total_points, actual.total_points),
        ];
        if let Some(&(field, declared, actual)) = checks.iter().find(|(_, d, a)| d != a) {
            return Err(DataContractError::MetadataMismatch {
                field,
                declared,
                actual,
            });
        }

        if let Some(hierarchy) = wire.hierarchy {
            dataset.hierarchy = hierarchy;
        }
        Ok(dataset)
    }
}
