//! Percentile Computation
//!
//! Linear interpolation between order statistics: for percentile `p` over a
//! sorted array of length `n`, `rank = (n - 1) * p / 100`, and the result is
//! `a[k] + (rank - k) * (a[k + 1] - a[k])` with `k = floor(rank)`, clamped to
//! the last element.

/// Percentile of an already sorted, non-empty slice.
///
/// Returns 0.0 for an empty slice so callers summarising optional data do not
/// need a separate branch.
pub fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }

    let p = percentile.clamp(0.0, 100.0);
    let rank = (n - 1) as f64 * p / 100.0;
    let k = rank.floor() as usize;
    if k >= n - 1 {
        return sorted[n - 1];
    }
    let d = rank - k as f64;

    sorted[k] + d * (sorted[k + 1] - sorted[k])
}

/// Compute a single percentile from unsorted samples
///
/// Sorts a copy using IEEE total ordering, so the result never depends on the
/// caller's ordering.
///
/// # Examples
///
/// ```
/// # use yieldbench_stats::compute_percentile;
/// let samples = vec![5.0, 1.0, 4.0, 2.0, 3.0];
/// assert_eq!(compute_percentile(&samples, 50.0), 3.0);
/// ```
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_of_sorted(&sorted, percentile)
}
