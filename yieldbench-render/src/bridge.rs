//! Script Bridge
//!
//! Interactive chart libraries live on the host side of a script boundary.
//! Adapters talk to them through [`ScriptBridge`]: one call per library
//! method, JSON arguments in, JSON result out. The bridge is the only seam
//! where a browser engine, a test double or [`HeadlessBridge`] differ.

use crate::option::PlottedPoint;
use crate::selection::{SelectionEvent, SelectionHandler, SelectionRange, select_points};
use crate::{ContainerId, RenderError};
use fxhash::{FxHashMap, FxHashSet};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use yieldbench_core::{Dataset, RenderMetrics, Timer};

/// Host-side script runtime that owns the drawable surfaces
pub trait ScriptBridge {
    /// Whether `container` names an existing surface
    fn has_container(&self, container: &ContainerId) -> bool;

    /// Call `method` of the library bound to `container`
    fn invoke(&self, container: &ContainerId, method: &str, args: &Value) -> Result<Value, String>;
}

/// One recorded bridge invocation
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeCall {
    /// Target container
    pub container: String,
    /// Library method name
    pub method: String,
    /// Size of the marshalled arguments
    pub payload_bytes: usize,
}

/// In-process bridge without a script engine.
///
/// Arguments are still marshalled to text, so data binding pays the same
/// serialization cost a real boundary would. Calls are recorded in order.
#[derive(Debug, Default)]
pub struct HeadlessBridge {
    containers: RefCell<FxHashSet<String>>,
    calls: RefCell<Vec<BridgeCall>>,
    failing: RefCell<FxHashMap<String, String>>,
}

impl HeadlessBridge {
    /// Bridge with no surfaces
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge exposing the given surfaces
    pub fn with_containers<I, S>(containers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bridge = Self::new();
        bridge
            .containers
            .borrow_mut()
            .extend(containers.into_iter().map(Into::into));
        bridge
    }

    /// Expose another surface
    pub fn add_container(&self, container: impl Into<String>) {
        self.containers.borrow_mut().insert(container.into());
    }

    /// Make every call to `method` throw `message`
    pub fn fail_method(&self, method: impl Into<String>, message: impl Into<String>) {
        self.failing.borrow_mut().insert(method.into(), message.into());
    }

    /// Calls made so far, oldest first
    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.borrow().clone()
    }

    /// Number of calls to `method`
    pub fn count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.method == method).count()
    }
}

impl ScriptBridge for HeadlessBridge {
    fn has_container(&self, container: &ContainerId) -> bool {
        self.containers.borrow().contains(container.as_str())
    }

    fn invoke(&self, container: &ContainerId, method: &str, args: &Value) -> Result<Value, String> {
        let marshalled = serde_json::to_string(args).map_err(|e| e.to_string())?;
        self.calls.borrow_mut().push(BridgeCall {
            container: container.to_string(),
            method: method.to_string(),
            payload_bytes: marshalled.len(),
        });
        if let Some(message) = self.failing.borrow().get(method) {
            return Err(message.clone());
        }
        Ok(json!({ "ok": true }))
    }
}

/// Library method names used by a bridge-backed adapter
#[derive(Debug, Clone, Copy)]
pub(crate) struct BridgeMethods {
    pub init: &'static str,
    pub update: &'static str,
    pub enable_brush: &'static str,
    pub clear_brush: &'static str,
    pub resize: &'static str,
    pub dispose: &'static str,
}

/// Chart bookkeeping shared by the bridge-backed adapters
pub(crate) struct BridgeSession {
    library: &'static str,
    methods: BridgeMethods,
    bridge: Rc<dyn ScriptBridge>,
    charts: FxHashMap<ContainerId, Vec<PlottedPoint>>,
    handler: Option<SelectionHandler>,
}

impl BridgeSession {
    pub fn new(library: &'static str, methods: BridgeMethods, bridge: Rc<dyn ScriptBridge>) -> Self {
        Self {
            library,
            methods,
            bridge,
            charts: FxHashMap::default(),
            handler: None,
        }
    }

    pub fn library(&self) -> &'static str {
        self.library
    }

    pub fn chart_count(&self) -> usize {
        self.charts.len()
    }

    fn call(&self, container: &ContainerId, method: &str, args: &Value) -> Result<Value, RenderError> {
        self.bridge
            .invoke(container, method, args)
            .map_err(|message| RenderError::Bridge {
                library: self.library.to_string(),
                method: method.to_string(),
                message,
            })
    }

    /// Best-effort call on every live chart; failures are logged
    fn broadcast(&self, method: &str, args: &Value) {
        for container in self.charts.keys() {
            if let Err(e) = self.call(container, method, args) {
                tracing::warn!(library = self.library, %container, error = %e, "bridge call failed");
            }
        }
    }

    /// Init, shape with `shape`, then push the option to the library.
    ///
    /// A chart left over on the same container is disposed first. The chart
    /// is registered right after init so a later failure still gets cleaned
    /// up by destroy.
    pub fn render<F>(
        &mut self,
        container: &ContainerId,
        dataset: &Dataset,
        shape: F,
    ) -> Result<RenderMetrics, RenderError>
    where
        F: FnOnce(&Dataset) -> Value,
    {
        let total = Timer::start();
        container.ensure_valid()?;
        if !self.bridge.has_container(container) {
            return Err(RenderError::InvalidContainer(container.to_string()));
        }

        let init = Timer::start();
        if self.charts.remove(container).is_some() {
            self.call(container, self.methods.dispose, &Value::Null)?;
        }
        self.call(container, self.methods.init, &json!({ "renderer": "canvas" }))?;
        self.charts.insert(container.clone(), Vec::new());
        let init_ms = init.elapsed_ms();

        let binding = Timer::start();
        let option = shape(dataset);
        let points = crate::option::plotted_points(dataset);
        let data_binding_ms = binding.elapsed_ms();

        let draw = Timer::start();
        self.call(container, self.methods.update, &option)?;
        if self.handler.is_some() {
            self.call(container, self.methods.enable_brush, &json!({ "brushType": "rect" }))?;
        }
        let render_complete_ms = draw.elapsed_ms();

        let data_points = points.len();
        self.charts.insert(container.clone(), points);

        tracing::debug!(library = self.library, %container, data_points, "chart rendered");
        Ok(RenderMetrics::new(
            self.library,
            data_points,
            init_ms,
            data_binding_ms,
            render_complete_ms,
            total.elapsed_ms(),
        ))
    }

    pub fn enable_selection(&mut self, handler: SelectionHandler) {
        self.handler = Some(handler);
        self.broadcast(self.methods.enable_brush, &json!({ "brushType": "rect" }));
    }

    /// Resolve a completed brush gesture and deliver it to the handler.
    ///
    /// Returns the number of selected wafers, or `None` when no chart is
    /// bound to `container`.
    pub fn brush(&mut self, container: &ContainerId, range: SelectionRange) -> Option<usize> {
        let points = self.charts.get(container)?;
        let event: SelectionEvent = select_points(points, range);
        let selected = event.points.len();
        if let Some(handler) = self.handler.as_mut() {
            handler(&event);
        }
        Some(selected)
    }

    pub fn clear_selection(&mut self) {
        self.broadcast(self.methods.clear_brush, &Value::Null);
    }

    pub fn resize(&mut self) {
        self.broadcast(self.methods.resize, &Value::Null);
    }

    pub fn destroy(&mut self) {
        self.broadcast(self.methods.dispose, &Value::Null);
        self.charts.clear();
        self.handler = None;
    }
}
