#![warn(missing_docs)]
//! YieldBench Render - Adapter Contract
//!
//! Every charting strategy implements [`ChartAdapter`]. The orchestrator only
//! ever sees this trait: it hands over a [`Dataset`] and gets back
//! [`RenderMetrics`] in the same shape whichever adapter ran.
//!
//! ```text
//!               ┌────────────────────┐
//!  Dataset ───▶ │    ChartAdapter    │ ───▶ RenderMetrics
//!               └─────────┬──────────┘
//!        ┌───────────┬────┴──────┬──────────────┐
//!        ▼           ▼           ▼              ▼
//!   ScriptChart  GpuScatter  RasterImage    SidecarSvg
//!   (bridge)     (bridge)    (in-process)   (child process)
//! ```
//!
//! Each adapter owns its chart instances in an explicit map keyed by
//! [`ContainerId`]: inserted when a chart is initialised, removed by
//! [`ChartAdapter::destroy`].

mod bridge;
mod error;
mod gpu;
mod option;
mod raster;
mod registry;
mod script;
mod selection;
mod sidecar;
mod svg;

pub use bridge::{BridgeCall, HeadlessBridge, ScriptBridge};
pub use error::RenderError;
pub use gpu::GpuScatterAdapter;
pub use option::{PlottedPoint, box_plot_option, plotted_points};
pub use raster::{RasterChart, RasterImageAdapter};
pub use registry::{AdapterFactory, AdapterRegistry};
pub use script::ScriptChartAdapter;
pub use selection::{SelectedPoint, SelectionEvent, SelectionHandler, SelectionRange};
pub use sidecar::{SidecarConfig, SidecarError, SidecarRequest, SidecarRunner};
pub use svg::SidecarSvgAdapter;

use serde::{Deserialize, Serialize};
use yieldbench_core::{Dataset, RenderMetrics};

/// Opaque handle of a drawable surface (e.g. a DOM element id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Wrap a host-provided identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as given by the host
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reject handles that cannot name any surface
    pub(crate) fn ensure_valid(&self) -> Result<(), RenderError> {
        if self.0.trim().is_empty() {
            Err(RenderError::InvalidContainer(self.0.clone()))
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Capability set shared by every rendering strategy
///
/// Adapters hold a mutable chart instance per container, so every operation
/// takes `&mut self`; the borrow checker rules out concurrent use of one
/// adapter.
pub trait ChartAdapter {
    /// Library name recorded in [`RenderMetrics`]
    fn library(&self) -> &str;

    /// Whether [`ChartAdapter::enable_rectangular_selection`] does anything
    fn supports_selection(&self) -> bool;

    /// Initialise, shape the data and draw, timing each phase
    fn render_box_plot(
        &mut self,
        container: &ContainerId,
        dataset: &Dataset,
    ) -> Result<RenderMetrics, RenderError>;

    /// Register the single selection handler, replacing any previous one
    fn enable_rectangular_selection(&mut self, handler: SelectionHandler);

    /// Clear the current selection; no-op without a chart
    fn clear_selection(&mut self);

    /// Re-fit charts to their containers; no-op without a chart
    fn resize(&mut self);

    /// Release every chart, buffer, handler and process. Safe to repeat.
    fn destroy(&mut self);
}
