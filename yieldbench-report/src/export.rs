//! JSON and CSV Export

use crate::aggregate::TestResult;
use crate::error::ExportError;
use chrono::SecondsFormat;
use serde::Serialize;

/// Header row of the CSV export
pub const CSV_HEADER: [&str; 10] = [
    "TestId",
    "Timestamp",
    "ChartLibrary",
    "RenderMode",
    "DataPoints",
    "ServerTotalMs",
    "FetchTimeMs",
    "ParseTimeMs",
    "RenderCompleteMs",
    "TotalEndToEndMs",
];

/// A result as exported: stored fields plus the derived totals
#[derive(Debug, Serialize)]
pub struct ExportedResult<'a> {
    /// Stored fields
    #[serde(flatten)]
    pub result: &'a TestResult,
    /// See [`TestResult::total_server_generation_ms`]
    pub total_server_generation_ms: f64,
    /// See [`TestResult::total_end_to_end_ms`]
    pub total_end_to_end_ms: f64,
    /// See [`TestResult::data_points`]
    pub data_points: u64,
}

impl<'a> From<&'a TestResult> for ExportedResult<'a> {
    fn from(result: &'a TestResult) -> Self {
        Self {
            result,
            total_server_generation_ms: result.total_server_generation_ms(),
            total_end_to_end_ms: result.total_end_to_end_ms(),
            data_points: result.data_points(),
        }
    }
}

/// Pretty-printed JSON array of results.
///
/// Derived totals are included for readers; [`import_json`] ignores them
/// and recomputes from the components.
pub fn export_json(results: &[TestResult]) -> Result<String, ExportError> {
    let exported: Vec<ExportedResult<'_>> = results.iter().map(ExportedResult::from).collect();
    Ok(serde_json::to_string_pretty(&exported)?)
}

/// Parse a JSON export back into results
pub fn import_json(json: &str) -> Result<Vec<TestResult>, ExportError> {
    Ok(serde_json::from_str(json)?)
}

/// One CSV row per result, numbers to two decimals
pub fn export_csv(results: &[TestResult]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for r in results {
        writer.write_record([
            r.test_id.clone(),
            r.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            r.chart_library.clone(),
            r.render_mode.to_string(),
            r.data_points().to_string(),
            format!("{:.2}", r.server.endpoint_total_ms),
            format!("{:.2}", r.fetch_time_ms),
            format!("{:.2}", r.parse_time_ms),
            format!("{:.2}", r.render.render_complete_ms),
            format!("{:.2}", r.total_end_to_end_ms()),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|_| ExportError::Utf8)
}
