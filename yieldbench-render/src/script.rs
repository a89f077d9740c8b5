//! Script Chart Adapter
//!
//! Drives a declarative chart library across the script bridge: one
//! `init`, one `setOption` carrying the whole box-plot document, and brush
//! events for rectangular selection.

use crate::bridge::{BridgeMethods, BridgeSession, ScriptBridge};
use crate::option::box_plot_option;
use crate::selection::{SelectionHandler, SelectionRange};
use crate::{ChartAdapter, ContainerId, RenderError};
use std::rc::Rc;
use yieldbench_core::{Dataset, RenderMetrics};

const METHODS: BridgeMethods = BridgeMethods {
    init: "echarts.init",
    update: "echarts.setOption",
    enable_brush: "echarts.enableBrush",
    clear_brush: "echarts.clearBrush",
    resize: "echarts.resize",
    dispose: "echarts.dispose",
};

/// Box plot drawn by an option-driven script library
pub struct ScriptChartAdapter {
    session: BridgeSession,
}

impl ScriptChartAdapter {
    /// Library name reported in metrics
    pub const LIBRARY: &'static str = "echarts";

    /// Adapter calling into `bridge`
    pub fn new(bridge: Rc<dyn ScriptBridge>) -> Self {
        Self {
            session: BridgeSession::new(Self::LIBRARY, METHODS, bridge),
        }
    }

    /// Deliver a finished brush rectangle on `container` to the handler
    pub fn brush(&mut self, container: &ContainerId, range: SelectionRange) -> Option<usize> {
        self.session.brush(container, range)
    }

    /// Number of live chart instances
    pub fn chart_count(&self) -> usize {
        self.session.chart_count()
    }
}

impl ChartAdapter for ScriptChartAdapter {
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
        self.session.render(container, dataset, box_plot_option)
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
