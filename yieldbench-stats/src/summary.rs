//! Summary Statistics
//!
//! Two summaries are produced here:
//! - [`BoxStatistics`]: the per-lot five-number summary drawn by every adapter
//! - [`TimingSummary`]: dispersion of repeated trial timings for comparisons
//!
//! Both sort a private copy with `f64::total_cmp` and accumulate in sorted
//! order, so identical inputs give bit-identical outputs whatever the caller.

use crate::StatsError;
use crate::percentiles::percentile_of_sorted;
use crate::{Q1_PERCENTILE, Q3_PERCENTILE};
use serde::{Deserialize, Serialize};

/// Five-number summary with mean and count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxStatistics {
    /// Smallest observation
    pub min: f64,
    /// 25th percentile
    pub q1: f64,
    /// 50th percentile
    pub median: f64,
    /// 75th percentile
    pub q3: f64,
    /// Largest observation
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Number of observations
    pub count: usize,
}

impl BoxStatistics {
    /// Interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// The five box values in drawing order: `[min, q1, median, q3, max]`
    pub fn five_numbers(&self) -> [f64; 5] {
        [self.min, self.q1, self.median, self.q3, self.max]
    }

    /// Check min <= q1 <= median <= q3 <= max
    pub fn is_ordered(&self) -> bool {
        self.min <= self.q1 && self.q1 <= self.median && self.median <= self.q3 && self.q3 <= self.max
    }
}

fn sorted_finite(samples: &[f64]) -> Result<Vec<f64>, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::Empty);
    }
    if let Some((index, &value)) = samples.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(StatsError::NonFinite { index, value });
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

/// Compute the box-plot summary of a non-empty sample
///
/// # Examples
///
/// ```
/// # use yieldbench_stats::compute_box_statistics;
/// let stats = compute_box_statistics(&[70.0, 75.0, 80.0, 85.0, 90.0, 95.0, 100.0]).unwrap();
/// assert_eq!(stats.q1, 77.5);
/// assert_eq!(stats.median, 85.0);
/// assert_eq!(stats.q3, 92.5);
/// ```
pub fn compute_box_statistics(samples: &[f64]) -> Result<BoxStatistics, StatsError> {
    let sorted = sorted_finite(samples)?;
    let count = sorted.len();

    let mean = sorted.iter().sum::<f64>() / count as f64;

    Ok(BoxStatistics {
        min: sorted[0],
        q1: percentile_of_sorted(&sorted, Q1_PERCENTILE),
        median: percentile_of_sorted(&sorted, 50.0),
        q3: percentile_of_sorted(&sorted, Q3_PERCENTILE),
        max: sorted[count - 1],
        mean,
        count,
    })
}

/// Dispersion of repeated timing measurements (milliseconds)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingSummary {
    /// Number of trials
    pub count: usize,
    /// Mean duration
    pub mean: f64,
    /// Median duration
    pub median: f64,
    /// Sample standard deviation (0 for fewer than two trials)
    pub std_dev: f64,
    /// Fastest trial
    pub min: f64,
    /// Slowest trial
    pub max: f64,
    /// 95th percentile
    pub p95: f64,
}

impl TimingSummary {
    /// Coefficient of variation in percent
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean) * 100.0
        }
    }
}

/// Summarise trial timings. Empty or non-finite input yields the zero summary.
pub fn compute_timing_summary(samples: &[f64]) -> TimingSummary {
    let sorted = match sorted_finite(samples) {
        Ok(sorted) => sorted,
        Err(_) => return TimingSummary::default(),
    };
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;

    let std_dev = if count < 2 {
        0.0
    } else {
        let variance =
            sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    };

    TimingSummary {
        count,
        mean,
        median: percentile_of_sorted(&sorted, 50.0),
        std_dev,
        min: sorted[0],
        max: sorted[count - 1],
        p95: percentile_of_sorted(&sorted, 95.0),
    }
}
