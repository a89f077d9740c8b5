#![warn(missing_docs)]
//! # YieldBench
//!
//! Benchmark harness comparing chart-rendering strategies for box plots of
//! hierarchical semiconductor-yield data.
//!
//! - **Dataset model**: year → week → lot → wafer, with per-lot five-number
//!   summaries computed by linear-interpolation percentiles
//! - **Adapters**: script-driven, GPU layer, in-process raster and sidecar SVG
//!   renderers behind one [`ChartAdapter`] contract
//! - **Uniform metrics**: server and client timings merged into one
//!   [`TestResult`] per trial, with derived totals computed on read
//! - **Exports**: pretty JSON (lossless round trip) and CSV
//!
//! ## Quick Start
//!
//! ```ignore
//! use yieldbench::prelude::*;
//! use std::rc::Rc;
//!
//! let bridge = Rc::new(HeadlessBridge::with_containers(["chart"]));
//! let mut adapter = ScriptChartAdapter::new(bridge);
//! let mut orchestrator = Orchestrator::new(SyntheticProvider::new(), OrchestratorConfig::default());
//! let results = orchestrator.run_test_iterations(
//!     &mut adapter,
//!     &ContainerId::new("chart"),
//!     3,
//!     &DatasetShape::new(52, 10, 25),
//! )?;
//! println!("{}", format_comparison(orchestrator.logger().results()));
//! ```

// Re-export stats
pub use yieldbench_stats::{
    BoxStatistics, StatsError, TimingSummary, compute_box_statistics, compute_percentile,
    compute_timing_summary,
};

// Re-export dataset types
pub use yieldbench_core::{
    BoxPlotResponse, CsvExport, DataContractError, DataProvider, Dataset, DatasetMetadata,
    DatasetShape, FetchedPayload, GenerateError, HierarchyBuilder, Lot, PayloadError, RenderMetrics,
    ServerTiming, SyntheticGenerator, SyntheticProvider, TransportError, Wafer, Week,
    YieldDistribution, YieldRecord, decode_response,
};

// Re-export adapters
pub use yieldbench_render::{
    AdapterRegistry, ChartAdapter, ContainerId, GpuScatterAdapter, HeadlessBridge,
    RasterImageAdapter, RenderError, ScriptBridge, ScriptChartAdapter, SelectionEvent,
    SelectionHandler, SelectionRange, SidecarConfig, SidecarError, SidecarRunner,
    SidecarSvgAdapter,
};

// Re-export reporting
pub use yieldbench_report::{
    AggregationError, ExportError, LibrarySummary, OutputFormat, PendingResult,
    PerformanceLogger, RenderMode, SharedLogger, TestIdentity, TestResult, export_csv,
    export_json, format_comparison, import_json, summarize,
};

// Re-export orchestration
pub use yieldbench_cli::{BenchConfig, Orchestrator, OrchestratorConfig, RunError, RunState};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ChartAdapter, ContainerId, DatasetShape, HeadlessBridge, Orchestrator, OrchestratorConfig,
        PerformanceLogger, RenderMode, ScriptChartAdapter, SyntheticProvider, TestResult,
        format_comparison,
    };
}

/// Run the YieldBench CLI.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     yieldbench::run()
/// }
/// ```
pub use yieldbench_cli::run;
