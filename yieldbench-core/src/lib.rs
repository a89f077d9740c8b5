#![warn(missing_docs)]
//! YieldBench Core - Dataset Model
//!
//! This crate provides everything up to the point a renderer takes over:
//! - The year → week → lot → wafer [`Dataset`] with per-lot statistics
//! - [`HierarchyBuilder`] for assembling datasets from flat yield rows
//! - Timing records shared by providers and adapters
//! - [`DataProvider`] and the in-process [`SyntheticProvider`]

mod dataset;
mod error;
mod generator;
mod hierarchy;
mod measure;
mod provider;
mod shape;
mod timing;

pub use dataset::{
    Dataset, DatasetMetadata, DatasetWire, Hierarchy, Lot, LotWire, MAX_YIELD, MIN_YIELD, Wafer,
    Week, WeekWire,
};
pub use error::{DataContractError, PayloadError, TransportError};
pub use generator::{CsvExport, GenerateError, SyntheticGenerator, YieldDistribution};
pub use hierarchy::{HierarchyBuilder, YieldRecord};
pub use measure::{Timer, timed};
pub use provider::{
    BoxPlotResponse, DataProvider, FetchedPayload, ResponseTiming, SyntheticProvider,
    decode_response,
};
pub use shape::{DatasetShape, PRESETS};
pub use timing::{RenderMetrics, ServerTiming};
pub use yieldbench_stats::BoxStatistics;
