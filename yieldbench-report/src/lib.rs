#![warn(missing_docs)]
//! YieldBench Report - Results and Exports
//!
//! Merges the server-side and client-side halves of a trial into one
//! [`TestResult`], keeps the ordered session log and writes it out:
//! - JSON (array of results, pretty-printed, lossless)
//! - CSV (one row per result)
//! - Human-readable comparison table

mod aggregate;
mod error;
mod export;
mod format;
mod logger;
mod summary;

pub use aggregate::{PendingResult, RenderMode, ServerHalf, TestIdentity, TestResult, merge};
pub use error::{AggregationError, ExportError};
pub use export::{CSV_HEADER, ExportedResult, export_csv, export_json, import_json};
pub use format::format_comparison;
pub use logger::{PerformanceLogger, SharedLogger};
pub use summary::{LibrarySummary, summarize};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Human,
    /// JSON array of results
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl OutputFormat {
    /// File extension used when writing to a directory
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Human => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
