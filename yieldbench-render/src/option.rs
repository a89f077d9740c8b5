//! Data Shaping
//!
//! Flattens the hierarchy into the shapes charting libraries consume: a
//! category-axis option document for box plots and a list of plotted wafer
//! points. Category order follows the dataset's lot order.

use serde_json::{Value, json};
use yieldbench_core::Dataset;

/// One wafer positioned on the chart
#[derive(Debug, Clone, PartialEq)]
pub struct PlottedPoint {
    /// Week of the lot
    pub week_no: u32,
    /// Lot identifier
    pub lot_id: String,
    /// Wafer identifier
    pub wafer_id: String,
    /// Category index of the lot
    pub x: f64,
    /// Yield
    pub y: f64,
}

/// Every wafer of the dataset in display order
pub fn plotted_points(dataset: &Dataset) -> Vec<PlottedPoint> {
    let mut points = Vec::with_capacity(dataset.total_points());
    for (index, (week_no, lot)) in dataset.lots().enumerate() {
        for wafer in lot.wafers() {
            points.push(PlottedPoint {
                week_no,
                lot_id: lot.lot_id().to_string(),
                wafer_id: wafer.wafer_id().to_string(),
                x: index as f64,
                y: wafer.value(),
            });
        }
    }
    points
}

/// Lowest yield across all lots, rounded down to a multiple of 5
pub(crate) fn axis_floor(dataset: &Dataset) -> f64 {
    let lowest = dataset
        .lots()
        .map(|(_, lot)| lot.stats().min)
        .fold(f64::INFINITY, f64::min);
    if lowest.is_finite() {
        (lowest / 5.0).floor() * 5.0
    } else {
        0.0
    }
}

/// Category-axis box-plot option with a wafer scatter overlay
pub fn box_plot_option(dataset: &Dataset) -> Value {
    let categories: Vec<&str> = dataset.lots().map(|(_, lot)| lot.lot_id()).collect();
    let boxes: Vec<[f64; 5]> = dataset
        .lots()
        .map(|(_, lot)| lot.stats().five_numbers())
        .collect();
    let scatter: Vec<[f64; 2]> = plotted_points(dataset)
        .into_iter()
        .map(|p| [p.x, p.y])
        .collect();

    json!({
        "title": { "text": format!("Wafer yield by lot, {}", dataset.year()) },
        "animation": false,
        "tooltip": { "trigger": "item" },
        "brush": { "toolbox": ["rect", "clear"], "xAxisIndex": 0 },
        "dataZoom": [{ "type": "inside" }, { "type": "slider" }],
        "xAxis": { "type": "category", "name": "Lot", "data": categories },
        "yAxis": { "type": "value", "name": "Yield (%)", "min": axis_floor(dataset), "max": 100 },
        "series": [
            { "name": "Yield", "type": "boxplot", "data": boxes },
            { "name": "Wafers", "type": "scatter", "symbolSize": 3, "data": scatter }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use yieldbench_core::{HierarchyBuilder, Wafer};

    fn dataset() -> Dataset {
        let mut builder = HierarchyBuilder::new(2025);
        builder
            .add_lot(1, "L0001", vec![Wafer::new("W01", 81.0), Wafer::new("W02", 93.0)])
            .add_lot(2, "L0002", vec![Wafer::new("W01", 97.5)]);
        builder.build().unwrap()
    }

    #[test]
    fn test_points_follow_lot_order() {
        let points = plotted_points(&dataset());
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].x, 0.0);
        assert_eq!(points[2].x, 1.0);
        assert_eq!(points[2].week_no, 2);
        assert_eq!(points[2].lot_id, "L0002");
    }

    #[test]
    fn test_option_document() {
        let option = box_plot_option(&dataset());
        assert_eq!(option["xAxis"]["data"], json!(["L0001", "L0002"]));
        assert_eq!(option["series"][0]["type"], "boxplot");
        assert_eq!(option["series"][0]["data"][1], json!([97.5, 97.5, 97.5, 97.5, 97.5]));
        assert_eq!(option["series"][1]["data"].as_array().unwrap().len(), 3);
        assert_eq!(option["yAxis"]["min"], 80.0);
    }
}
