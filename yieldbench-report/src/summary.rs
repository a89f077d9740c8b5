//! Per-library Summaries

use crate::aggregate::{RenderMode, TestResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use yieldbench_stats::{TimingSummary, compute_timing_summary};

/// Timing distribution of one library's trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySummary {
    /// Chart library
    pub library: String,
    /// Modes the library ran in, sorted
    pub render_modes: Vec<RenderMode>,
    /// Number of trials
    pub runs: usize,
    /// Largest dataset the library was given
    pub max_data_points: u64,
    /// Total end-to-end time
    pub end_to_end: TimingSummary,
    /// Adapter render-complete phase
    pub render_complete: TimingSummary,
    /// Server-side data generation
    pub server_generation: TimingSummary,
}

/// Summaries for every library in `results`, in name order
pub fn summarize(results: &[TestResult]) -> Vec<LibrarySummary> {
    let mut groups: BTreeMap<&str, Vec<&TestResult>> = BTreeMap::new();
    for result in results {
        groups.entry(result.chart_library.as_str()).or_default().push(result);
    }

    groups
        .into_iter()
        .map(|(library, runs)| {
            let end_to_end: Vec<f64> = runs.iter().map(|r| r.total_end_to_end_ms()).collect();
            let render: Vec<f64> = runs.iter().map(|r| r.render.render_complete_ms).collect();
            let server: Vec<f64> = runs.iter().map(|r| r.total_server_generation_ms()).collect();
            let mut render_modes: Vec<RenderMode> = runs.iter().map(|r| r.render_mode).collect();
            render_modes.sort_unstable();
            render_modes.dedup();

            LibrarySummary {
                library: library.to_string(),
                render_modes,
                runs: runs.len(),
                max_data_points: runs.iter().map(|r| r.data_points()).max().unwrap_or(0),
                end_to_end: compute_timing_summary(&end_to_end),
                render_complete: compute_timing_summary(&render),
                server_generation: compute_timing_summary(&server),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::sample;

    #[test]
    fn test_groups_by_library() {
        let mut slow = sample("echarts", RenderMode::WebAssembly);
        slow.render.render_complete_ms = 50.0;
        let results = vec![
            sample("echarts", RenderMode::Server),
            sample("deckgl", RenderMode::Server),
            slow,
        ];
        let summaries = summarize(&results);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].library, "deckgl");
        let echarts = &summaries[1];
        assert_eq!(echarts.runs, 2);
        assert_eq!(echarts.render_modes, vec![RenderMode::Server, RenderMode::WebAssembly]);
        assert_eq!(echarts.render_complete.min, 30.0);
        assert_eq!(echarts.render_complete.max, 50.0);
        assert_eq!(echarts.end_to_end.mean, 77.75);
        assert_eq!(echarts.max_data_points, 13_000);
    }

    #[test]
    fn test_empty() {
        assert!(summarize(&[]).is_empty());
    }
}
