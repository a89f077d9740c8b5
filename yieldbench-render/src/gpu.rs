//! GPU Scatter Adapter
//!
//! Layer-based WebGL library: the box plot is expressed as a polygon layer
//! for the interquartile boxes, a line layer for whiskers and medians, and a
//! scatter layer with one instance per wafer.

use crate::bridge::{BridgeMethods, BridgeSession, ScriptBridge};
use crate::option::axis_floor;
use crate::selection::{SelectionHandler, SelectionRange};
use crate::{ChartAdapter, ContainerId, RenderError};
use serde_json::{Value, json};
use std::rc::Rc;
use yieldbench_core::{Dataset, RenderMetrics};

const METHODS: BridgeMethods = BridgeMethods {
    init: "deck.init",
    update: "deck.setProps",
    enable_brush: "deck.enablePicking",
    clear_brush: "deck.clearPicking",
    resize: "deck.redraw",
    dispose: "deck.finalize",
};

/// Half width of a box in category units
const BOX_HALF_WIDTH: f64 = 0.3;

fn layer_props(dataset: &Dataset) -> Value {
    let mut boxes = Vec::new();
    let mut segments = Vec::new();
    for (index, (_, lot)) in dataset.lots().enumerate() {
        let x = index as f64;
        let s = lot.stats();
        let (left, right) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);
        boxes.push(json!({
            "lot": lot.lot_id(),
            "polygon": [[left, s.q1], [right, s.q1], [right, s.q3], [left, s.q3]],
        }));
        segments.push(json!({ "from": [x, s.min], "to": [x, s.q1] }));
        segments.push(json!({ "from": [x, s.q3], "to": [x, s.max] }));
        segments.push(json!({ "from": [left, s.median], "to": [right, s.median] }));
    }
    // [x, y, lot_index]; x spreads wafers across the box width
    let wafers: Vec<[f64; 3]> = dataset
        .lots()
        .enumerate()
        .flat_map(|(index, (_, lot))| {
            let count = lot.len().max(2) as f64;
            lot.wafers().iter().enumerate().map(move |(i, w)| {
                let spread = (i as f64 / (count - 1.0) - 0.5) * BOX_HALF_WIDTH;
                [index as f64 + spread, w.value(), index as f64]
            })
        })
        .collect();

    json!({
        "viewState": {
            "target": [dataset.metadata().total_lots as f64 / 2.0, (axis_floor(dataset) + 100.0) / 2.0],
            "zoom": 0
        },
        "layers": [
            { "id": "iqr-boxes", "type": "PolygonLayer", "data": boxes },
            { "id": "whiskers", "type": "LineLayer", "data": segments },
            { "id": "wafers", "type": "ScatterplotLayer", "pickable": true, "data": wafers }
        ]
    })
}

/// Box plot drawn as GPU layers
pub struct GpuScatterAdapter {
    session: BridgeSession,
}

impl GpuScatterAdapter {
    /// Library name reported in metrics
    pub const LIBRARY: &'static str = "deckgl";

    /// Adapter calling into `bridge`
    pub fn new(bridge: Rc<dyn ScriptBridge>) -> Self {
        Self {
            session: BridgeSession::new(Self::LIBRARY, METHODS, bridge),
        }
    }

    /// Deliver a finished picking rectangle on `container` to the handler
    pub fn brush(&mut self, container: &ContainerId, range: SelectionRange) -> Option<usize> {
        self.session.brush(container, range)
    }

    /// Number of live chart instances
    pub fn chart_count(&self) -> usize {
        self.session.chart_count()
    }
}

impl ChartAdapter for GpuScatterAdapter {
    fn library(&self) -> &str {
        self.session.library()
    }

    fn supports_selection(&self) -> bool {
        true
    }

    fn render_box_plot(
        &mut self,
        container: &ContainerId,
        dataset: &Dataset,
    ) -> Result<RenderMetrics, RenderError> {
        self.session.render(container, dataset, layer_props)
    }

    fn enable_rectangular_selection(&mut self, handler: SelectionHandler) {
        self.session.enable_selection(handler);
    }

    fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    fn resize(&mut self) {
        self.session.resize();
    }

    fn destroy(&mut self) {
        self.session.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeadlessBridge;
    use yieldbench_core::{DatasetShape, SyntheticGenerator};

    #[test]
    fn test_layers_cover_every_lot_and_wafer() {
        let shape = DatasetShape::new(2, 3, 4);
        let (dataset, _) = SyntheticGenerator::new(shape).with_seed(7).generate_boxplot().unwrap();
        let props = layer_props(&dataset);
        assert_eq!(props["layers"][0]["data"].as_array().unwrap().len(), 6);
        assert_eq!(props["layers"][1]["data"].as_array().unwrap().len(), 18);
        assert_eq!(props["layers"][2]["data"].as_array().unwrap().len(), 24);
    }

    #[test]
    fn test_render_and_destroy() {
        let bridge = Rc::new(HeadlessBridge::with_containers(["gl"]));
        let mut adapter = GpuScatterAdapter::new(bridge.clone());
        let shape = DatasetShape::new(1, 2, 5);
        let (dataset, _) = SyntheticGenerator::new(shape).with_seed(1).generate_boxplot().unwrap();

        let metrics = adapter.render_box_plot(&ContainerId::new("gl"), &dataset).unwrap();
        assert_eq!(metrics.library, "deckgl");
        assert_eq!(metrics.data_points, 10);

        adapter.resize();
        assert_eq!(bridge.count("deck.redraw"), 1);
        adapter.destroy();
        assert_eq!(bridge.count("deck.finalize"), 1);
        adapter.resize();
        assert_eq!(bridge.count("deck.redraw"), 1);
    }
}
