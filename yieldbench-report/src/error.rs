//! Report errors

use thiserror::Error;

/// A trial that cannot be merged into a result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    /// Server or client half is missing
    #[error("result incomplete: {missing} not recorded")]
    Incomplete {
        /// Half that was never recorded
        missing: &'static str,
    },

    /// Render metrics belong to another library
    #[error("render metrics from {found} cannot complete a {expected} result")]
    LibraryMismatch {
        /// Library the trial was started for
        expected: String,
        /// Library named in the render metrics
        found: String,
    },
}

/// Failure to write or read an export
#[derive(Debug, Error)]
pub enum ExportError {
    /// JSON encoding or decoding failed
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing a CSV row failed
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// CSV writer produced bytes that are not text
    #[error("export is not valid UTF-8")]
    Utf8,

    /// Reading or writing the export file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
