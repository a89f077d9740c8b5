//! Timing Records
//!
//! [`ServerTiming`] is reported by the data provider for its own generation
//! cost; [`RenderMetrics`] is reported by an adapter for one render. Both are
//! plain measurements: nothing here is derived from anything else except the
//! explicitly named helper methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side generation cost breakdown (milliseconds)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerTiming {
    /// Building the id and week arrays
    pub array_generation_ms: f64,
    /// Sampling yields
    pub yield_generation_ms: f64,
    /// Assembling flat records
    pub dataframe_creation_ms: f64,
    /// Grouping into the hierarchy and computing statistics
    #[serde(default)]
    pub boxplot_transformation_ms: f64,
    /// Whole request as timed by the endpoint
    #[serde(default)]
    pub endpoint_total_ms: f64,
    /// Wafer observations produced
    pub total_data_points: u64,
}

impl ServerTiming {
    /// Raw data generation: array + yield + dataframe phases
    pub fn generation_ms(&self) -> f64 {
        self.array_generation_ms + self.yield_generation_ms + self.dataframe_creation_ms
    }
}

/// Phase timings reported by one adapter invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderMetrics {
    /// Chart library that rendered
    pub library: String,
    /// Wafer observations drawn
    pub data_points: usize,
    /// Chart instance creation
    pub init_ms: f64,
    /// Shaping the dataset for the library
    pub data_binding_ms: f64,
    /// Drawing until the chart is complete
    pub render_complete_ms: f64,
    /// Measured around the whole render, independently of the phases
    pub total_ms: f64,
    /// When the render finished
    pub timestamp: DateTime<Utc>,
}

impl RenderMetrics {
    /// Stamp a new record with the current time
    pub fn new(
        library: impl Into<String>,
        data_points: usize,
        init_ms: f64,
        data_binding_ms: f64,
        render_complete_ms: f64,
        total_ms: f64,
    ) -> Self {
        Self {
            library: library.into(),
            data_points,
            init_ms,
            data_binding_ms,
            render_complete_ms,
            total_ms,
            timestamp: Utc::now(),
        }
    }

    /// Sum of the three measured phases
    pub fn phase_sum(&self) -> f64 {
        self.init_ms + self.data_binding_ms + self.render_complete_ms
    }

    /// Time inside `total_ms` not attributed to any phase
    pub fn overhead_ms(&self) -> f64 {
        self.total_ms - self.phase_sum()
    }

    /// Sanity bound: the independently measured total covers the phases.
    ///
    /// A small tolerance absorbs clock granularity.
    pub fn is_consistent(&self) -> bool {
        self.overhead_ms() >= -1e-3
    }
}
