#![warn(missing_docs)]
//! YieldBench Statistical Engine
//!
//! Provides the order statistics shared by every rendering adapter:
//! - Five-number summary plus mean and count for box plots
//! - Percentile calculation by linear interpolation between order statistics
//! - Timing summaries for comparing repeated benchmark trials

mod percentiles;
mod summary;

pub use percentiles::{compute_percentile, percentile_of_sorted};
pub use summary::{BoxStatistics, TimingSummary, compute_box_statistics, compute_timing_summary};

use thiserror::Error;

/// Errors raised when the input violates the engine's preconditions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// No observations were supplied
    #[error("cannot summarise an empty sample")]
    Empty,

    /// An observation was NaN or infinite
    #[error("non-finite observation at index {index}: {value}")]
    NonFinite {
        /// Position of the offending value in the input
        index: usize,
        /// The offending value
        value: f64,
    },
}

/// First quartile percentile
pub const Q1_PERCENTILE: f64 = 25.0;

/// Third quartile percentile
pub const Q3_PERCENTILE: f64 = 75.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!((Q1_PERCENTILE - 25.0).abs() < f64::EPSILON);
        assert!((Q3_PERCENTILE - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(StatsError::Empty.to_string(), "cannot summarise an empty sample");
        let err = StatsError::NonFinite {
            index: 3,
            value: f64::NAN,
        };
        assert!(err.to_string().contains("index 3"));
    }
}
