//! Human-readable Output

use crate::aggregate::TestResult;
use crate::summary::summarize;

/// Format results as a per-trial listing followed by a comparison table.
///
/// Libraries in the table are ordered fastest first by mean end-to-end
/// time; the fastest is the baseline for the relative column.
pub fn format_comparison(results: &[TestResult]) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("YieldBench Results\n");
    output.push_str(&"=".repeat(72));
    output.push_str("\n\n");

    if results.is_empty() {
        output.push_str("  no results\n");
        return output;
    }

    for r in results {
        output.push_str(&format!(
            "  {} {} ({}, {} points)\n",
            r.test_id,
            r.chart_library,
            r.render_mode,
            r.data_points()
        ));
        output.push_str(&format!(
            "      server: {:.2} ms  fetch: {:.2} ms  parse: {:.2} ms\n",
            r.server.endpoint_total_ms, r.fetch_time_ms, r.parse_time_ms
        ));
        output.push_str(&format!(
            "      init: {:.2} ms  binding: {:.2} ms  render: {:.2} ms  end-to-end: {:.2} ms\n",
            r.render.init_ms,
            r.render.data_binding_ms,
            r.render.render_complete_ms,
            r.total_end_to_end_ms()
        ));
    }

    let mut summaries = summarize(results);
    summaries.sort_by(|a, b| a.end_to_end.mean.total_cmp(&b.end_to_end.mean));

    output.push_str("\nComparison (end-to-end)\n");
    output.push_str(&"-".repeat(72));
    output.push('\n');

    let width = summaries
        .iter()
        .map(|s| s.library.len())
        .max()
        .unwrap_or(10)
        .max("Library".len());
    output.push_str(&format!(
        "  {:<width$}  {:>4}  {:>12}  {:>12}  {:>12}  {:>8}\n",
        "Library",
        "Runs",
        "Mean (ms)",
        "Median (ms)",
        "p95 (ms)",
        "Relative",
        width = width
    ));
    output.push_str(&format!("  {}\n", "-".repeat(width + 58)));

    let baseline = summaries.first().map(|s| s.end_to_end.mean).unwrap_or(0.0);
    for s in &summaries {
        let relative = if baseline > 0.0 {
            format!("{:.2}x", s.end_to_end.mean / baseline)
        } else {
            "-".to_string()
        };
        output.push_str(&format!(
            "  {:<width$}  {:>4}  {:>12.2}  {:>12.2}  {:>12.2}  {:>8}\n",
            s.library,
            s.runs,
            s.end_to_end.mean,
            s.end_to_end.median,
            s.end_to_end.p95,
            relative,
            width = width
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderMode;
    use crate::aggregate::tests::sample;

    #[test]
    fn test_table_orders_fastest_first() {
        let mut slow = sample("raster", RenderMode::Server);
        slow.render.render_complete_ms = 97.75;
        let fast = sample("echarts", RenderMode::Server);
        let output = format_comparison(&[slow, fast]);

        let echarts = output.rfind("echarts").unwrap();
        let raster = output.rfind("raster").unwrap();
        assert!(echarts < raster);
        assert!(output.contains("1.00x"));
        assert!(output.contains("2.00x"));
    }

    #[test]
    fn test_empty_results() {
        assert!(format_comparison(&[]).contains("no results"));
    }
}
