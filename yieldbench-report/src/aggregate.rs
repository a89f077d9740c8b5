//! Result Aggregation
//!
//! A trial produces two halves at different times: the server half when the
//! payload has been fetched and decoded, the client half when the adapter
//! finishes drawing. [`PendingResult`] collects both and only then yields a
//! [`TestResult`]. Totals are methods over the stored components, never
//! stored themselves.

use crate::error::AggregationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use yieldbench_core::{DatasetShape, RenderMetrics, ServerTiming};

/// Where the chart runtime executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Host process drives the chart
    #[default]
    Server,
    /// Chart runtime compiled to run in the client
    WebAssembly,
}

impl RenderMode {
    /// Lowercase name used in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Server => "server",
            RenderMode::WebAssembly => "webassembly",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "server" => Ok(RenderMode::Server),
            "webassembly" | "wasm" => Ok(RenderMode::WebAssembly),
            other => Err(format!("Unknown render mode: {}", other)),
        }
    }
}

/// What a trial measured: which library, in which mode, on which shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestIdentity {
    /// Library under test
    pub chart_library: String,
    /// Where the chart runs
    pub render_mode: RenderMode,
    /// Requested dataset size
    pub shape: DatasetShape,
}

impl TestIdentity {
    /// Identity for one library run
    pub fn new(
        chart_library: impl Into<String>,
        render_mode: RenderMode,
        shape: DatasetShape,
    ) -> Self {
        Self {
            chart_library: chart_library.into(),
            render_mode,
            shape,
        }
    }
}

/// Server-side half of a trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServerHalf {
    /// Generation cost reported by the server
    pub server: ServerTiming,
    /// Client-side wait for the response
    pub fetch_time_ms: f64,
    /// Decoding and validating the response
    pub parse_time_ms: f64,
}

/// One completed trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Assigned by [`crate::PerformanceLogger`] when logged
    #[serde(default)]
    pub test_id: String,
    /// When the trial completed
    pub timestamp: DateTime<Utc>,
    /// Library under test
    pub chart_library: String,
    /// Where the chart ran
    pub render_mode: RenderMode,
    /// Requested dataset size
    pub shape: DatasetShape,
    /// Generation cost reported by the server
    pub server: ServerTiming,
    /// Client-side wait for the response
    pub fetch_time_ms: f64,
    /// Decoding and validating the response
    pub parse_time_ms: f64,
    /// Timings reported by the adapter
    pub render: RenderMetrics,
}

impl TestResult {
    /// Array + yield + dataframe generation on the server
    pub fn total_server_generation_ms(&self) -> f64 {
        self.server.generation_ms()
    }

    /// Endpoint total + fetch + parse + render complete.
    ///
    /// Chart init and data binding are not part of this total.
    pub fn total_end_to_end_ms(&self) -> f64 {
        self.server.endpoint_total_ms
            + self.fetch_time_ms
            + self.parse_time_ms
            + self.render.render_complete_ms
    }

    /// Points generated by the server for this trial
    pub fn data_points(&self) -> u64 {
        self.server.total_data_points
    }
}

/// Collects both halves of a trial
#[derive(Debug, Clone)]
pub struct PendingResult {
    identity: TestIdentity,
    server: Option<ServerHalf>,
    render: Option<RenderMetrics>,
}

impl PendingResult {
    /// Start a trial with nothing recorded
    pub fn new(identity: TestIdentity) -> Self {
        Self {
            identity,
            server: None,
            render: None,
        }
    }

    /// Record the server half
    pub fn record_server(
        &mut self,
        server: ServerTiming,
        fetch_time_ms: f64,
        parse_time_ms: f64,
    ) -> &mut Self {
        self.server = Some(ServerHalf {
            server,
            fetch_time_ms,
            parse_time_ms,
        });
        self
    }

    /// Record the client half
    pub fn record_render(&mut self, render: RenderMetrics) -> &mut Self {
        self.render = Some(render);
        self
    }

    /// Whether both halves are present
    pub fn is_complete(&self) -> bool {
        self.server.is_some() && self.render.is_some()
    }

    /// Merge both halves; fails if either is missing
    pub fn finalize(self) -> Result<TestResult, AggregationError> {
        let server = self
            .server
            .ok_or(AggregationError::Incomplete { missing: "server timing" })?;
        let render = self
            .render
            .ok_or(AggregationError::Incomplete { missing: "render metrics" })?;
        merge(self.identity, server, render)
    }
}

/// Merge a complete trial into a result stamped with the current time
pub fn merge(
    identity: TestIdentity,
    server: ServerHalf,
    render: RenderMetrics,
) -> Result<TestResult, AggregationError> {
    if render.library != identity.chart_library {
        return Err(AggregationError::LibraryMismatch {
            expected: identity.chart_library,
            found: render.library,
        });
    }
    Ok(TestResult {
        test_id: String::new(),
        timestamp: Utc::now(),
        chart_library: identity.chart_library,
        render_mode: identity.render_mode,
        shape: identity.shape,
        server: server.server,
        fetch_time_ms: server.fetch_time_ms,
        parse_time_ms: server.parse_time_ms,
        render,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample(library: &str, mode: RenderMode) -> TestResult {
        let server = ServerTiming {
            array_generation_ms: 1.25,
            yield_generation_ms: 2.5,
            dataframe_creation_ms: 3.75,
            boxplot_transformation_ms: 4.0,
            endpoint_total_ms: 12.0,
            total_data_points: 13_000,
        };
        let mut pending = PendingResult::new(TestIdentity::new(library, mode, DatasetShape::default()));
        pending
            .record_server(server, 20.5, 5.25)
            .record_render(RenderMetrics::new(library, 13_000, 7.0, 11.0, 30.0, 50.0));
        pending.finalize().unwrap()
    }

    #[test]
    fn test_derived_totals() {
        let result = sample("echarts", RenderMode::Server);
        assert_eq!(result.total_server_generation_ms(), 7.5);
        assert_eq!(result.data_points(), 13_000);
    }

    #[test]
    fn test_end_to_end_excludes_init_and_binding() {
        let result = sample("echarts", RenderMode::Server);
        // 12 + 20.5 + 5.25 + 30; init (7) and binding (11) are not counted
        assert_eq!(result.total_end_to_end_ms(), 67.75);
    }

    #[test]
    fn test_totals_follow_components() {
        let mut result = sample("echarts", RenderMode::Server);
        result.fetch_time_ms = 0.0;
        assert_eq!(result.total_end_to_end_ms(), 47.25);
    }

    #[test]
    fn test_missing_halves_rejected() {
        let identity = TestIdentity::new("echarts", RenderMode::Server, DatasetShape::default());
        let pending = PendingResult::new(identity.clone());
        assert!(!pending.is_complete());
        assert_eq!(
            pending.finalize().unwrap_err(),
            AggregationError::Incomplete { missing: "server timing" }
        );

        let mut pending = PendingResult::new(identity);
        pending.record_server(ServerTiming::default(), 1.0, 1.0);
        assert_eq!(
            pending.finalize().unwrap_err(),
            AggregationError::Incomplete { missing: "render metrics" }
        );
    }

    #[test]
    fn test_library_mismatch() {
        let identity = TestIdentity::new("echarts", RenderMode::Server, DatasetShape::default());
        let half = ServerHalf {
            server: ServerTiming::default(),
            fetch_time_ms: 0.0,
            parse_time_ms: 0.0,
        };
        let render = RenderMetrics::new("deckgl", 1, 0.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            merge(identity, half, render),
            Err(AggregationError::LibraryMismatch { .. })
        ));
    }

    #[test]
    fn test_render_mode_names() {
        assert_eq!(RenderMode::WebAssembly.to_string(), "webassembly");
        assert_eq!("wasm".parse::<RenderMode>(), Ok(RenderMode::WebAssembly));
        assert_eq!(serde_json::to_string(&RenderMode::Server).unwrap(), "\"server\"");
    }
}
