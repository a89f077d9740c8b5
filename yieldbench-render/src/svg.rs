//! Sidecar SVG Adapter
//!
//! Server-side rendering: the box-plot option is shipped to a
//! [`SidecarRunner`] and the returned SVG document is kept per container.

use crate::option::box_plot_option;
use crate::selection::SelectionHandler;
use crate::sidecar::{SidecarRequest, SidecarRunner};
use crate::{ChartAdapter, ContainerId, RenderError};
use fxhash::FxHashMap;
use yieldbench_core::{Dataset, RenderMetrics, Timer};

/// Box plot rendered to SVG by an external process
pub struct SidecarSvgAdapter {
    runner: SidecarRunner,
    documents: FxHashMap<ContainerId, String>,
}

impl SidecarSvgAdapter {
    /// Library name reported in metrics
    pub const LIBRARY: &'static str = "sidecar-svg";

    /// Adapter rendering through `runner`
    pub fn new(runner: SidecarRunner) -> Self {
        Self {
            runner,
            documents: FxHashMap::default(),
        }
    }

    /// SVG document last rendered into `container`
    pub fn svg(&self, container: &ContainerId) -> Option<&str> {
        self.documents.get(container).map(String::as_str)
    }
}

impl ChartAdapter for SidecarSvgAdapter {
    fn library(&self) -> &str {
        Self::LIBRARY
    }

    fn supports_selection(&self) -> bool {
        false
    }

    fn render_box_plot(
        &mut self,
        container: &ContainerId,
        dataset: &Dataset,
    ) -> Result<RenderMetrics, RenderError> {
        let total = Timer::start();
        container.ensure_valid()?;

        let init = Timer::start();
        self.documents.remove(container);
        let init_ms = init.elapsed_ms();

        let binding = Timer::start();
        let config = self.runner.config();
        let request = SidecarRequest {
            option: box_plot_option(dataset),
            width: config.width,
            height: config.height,
        };
        let data_binding_ms = binding.elapsed_ms();

        let draw = Timer::start();
        let svg = self.runner.render(&request)?;
        let render_complete_ms = draw.elapsed_ms();

        self.documents.insert(container.clone(), svg);
        Ok(RenderMetrics::new(
            Self::LIBRARY,
            dataset.total_points(),
            init_ms,
            data_binding_ms,
            render_complete_ms,
            total.elapsed_ms(),
        ))
    }

    fn enable_rectangular_selection(&mut self, _handler: SelectionHandler) {
        tracing::debug!("server-rendered SVG is static; selection ignored");
    }

    fn clear_selection(&mut self) {}

    fn resize(&mut self) {}

    fn destroy(&mut self) {
        self.documents.clear();
    }
}
