//! Adapter Registry
//!
//! Name → constructor map. Adapters are built fresh for every lookup so
//! each comparison run starts without leftover chart instances.

use crate::ChartAdapter;
use crate::bridge::ScriptBridge;
use crate::gpu::GpuScatterAdapter;
use crate::raster::RasterImageAdapter;
use crate::script::ScriptChartAdapter;
use crate::sidecar::{SidecarConfig, SidecarRunner};
use crate::svg::SidecarSvgAdapter;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Constructor for one adapter variant
pub type AdapterFactory = Box<dyn Fn() -> Box<dyn ChartAdapter>>;

/// Adapters available by library name, in name order
#[derive(Default)]
pub struct AdapterRegistry {
    factories: BTreeMap<String, AdapterFactory>,
}

impl AdapterRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in adapter.
    ///
    /// Interactive adapters share `bridge`. The sidecar adapter is only
    /// present when a renderer program is configured.
    pub fn with_builtin(bridge: Rc<dyn ScriptBridge>, sidecar: Option<SidecarConfig>) -> Self {
        let mut registry = Self::new();

        let script_bridge = bridge.clone();
        registry.register(ScriptChartAdapter::LIBRARY, move || {
            Box::new(ScriptChartAdapter::new(script_bridge.clone()))
        });
        registry.register(GpuScatterAdapter::LIBRARY, move || {
            Box::new(GpuScatterAdapter::new(bridge.clone()))
        });

        let (width, height) = sidecar
            .as_ref()
            .map_or((1280, 720), |config| (config.width, config.height));
        registry.register(RasterImageAdapter::LIBRARY, move || {
            Box::new(RasterImageAdapter::new(width, height))
        });

        if let Some(config) = sidecar {
            registry.register(SidecarSvgAdapter::LIBRARY, move || {
                Box::new(SidecarSvgAdapter::new(SidecarRunner::new(config.clone())))
            });
        }
        registry
    }

    /// Add or replace the constructor for `name`
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn ChartAdapter> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Build a fresh adapter
    pub fn create(&self, name: &str) -> Option<Box<dyn ChartAdapter>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered adapters
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeadlessBridge;

    #[test]
    fn test_builtin_without_sidecar() {
        let registry = AdapterRegistry::with_builtin(Rc::new(HeadlessBridge::new()), None);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["deckgl", "echarts", "raster"]);
        assert!(!registry.contains("sidecar-svg"));
    }

    #[test]
    fn test_builtin_with_sidecar() {
        let registry = AdapterRegistry::with_builtin(
            Rc::new(HeadlessBridge::new()),
            Some(SidecarConfig::new("renderer")),
        );
        assert_eq!(registry.len(), 4);
        let adapter = registry.create("sidecar-svg").unwrap();
        assert_eq!(adapter.library(), "sidecar-svg");
        assert!(!adapter.supports_selection());
    }

    #[test]
    fn test_create_unknown() {
        let registry = AdapterRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.create("plotly").is_none());
    }

    #[test]
    fn test_create_builds_fresh_instances() {
        let registry = AdapterRegistry::with_builtin(Rc::new(HeadlessBridge::new()), None);
        let a = registry.create("echarts").unwrap();
        let b = registry.create("echarts").unwrap();
        assert_eq!(a.library(), b.library());
        assert!(a.supports_selection());
    }
}
