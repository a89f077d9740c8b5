//! Run Planner
//!
//! Builds the run plan by filtering the registered adapters.
//!
//! Filtering options:
//! - Regex pattern matching on library name
//!
//! Ordering: adapters are sorted alphabetically by name for deterministic execution.

use regex::Regex;
use yieldbench_core::DatasetShape;
use yieldbench_render::{AdapterRegistry, ChartAdapter};

/// Execution plan for one comparison
pub struct RunPlan {
    /// Ordered library names to run
    pub libraries: Vec<String>,
    /// Shape every trial requests
    pub shape: DatasetShape,
    /// Trials per adapter
    pub iterations: usize,
}

impl RunPlan {
    /// Total number of trials
    pub fn total_trials(&self) -> usize {
        self.libraries.len() * self.iterations
    }

    /// Construct the planned adapters, in plan order
    pub fn instantiate(&self, registry: &AdapterRegistry) -> Vec<Box<dyn ChartAdapter>> {
        self.libraries
            .iter()
            .filter_map(|name| registry.create(name))
            .collect()
    }
}

/// Build run plan from the registered adapters
///
/// Filters adapter names with `filter` and returns them in deterministic order.
pub fn build_plan(
    registry: &AdapterRegistry,
    filter: Option<&Regex>,
    shape: DatasetShape,
    iterations: usize,
) -> RunPlan {
    let mut libraries: Vec<String> = registry
        .names()
        .filter(|name| filter.is_none_or(|re| re.is_match(name)))
        .map(str::to_string)
        .collect();

    // Sort alphabetically for deterministic execution order
    libraries.sort();

    RunPlan {
        libraries,
        shape,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use yieldbench_render::{HeadlessBridge, SidecarConfig};

    fn registry() -> AdapterRegistry {
        AdapterRegistry::with_builtin(
            Rc::new(HeadlessBridge::new()),
            Some(SidecarConfig::new("renderer")),
        )
    }

    #[test]
    fn test_no_filter() {
        let plan = build_plan(&registry(), None, DatasetShape::default(), 3);

        // Should be sorted alphabetically
        assert_eq!(plan.libraries, vec!["deckgl", "echarts", "raster", "sidecar-svg"]);
        assert_eq!(plan.total_trials(), 12);
    }

    #[test]
    fn test_regex_filter() {
        let re = Regex::new("^(echarts|raster)$").unwrap();
        let plan = build_plan(&registry(), Some(&re), DatasetShape::default(), 2);
        assert_eq!(plan.libraries, vec!["echarts", "raster"]);

        let adapters = plan.instantiate(&registry());
        let names: Vec<&str> = adapters.iter().map(|a| a.library()).collect();
        assert_eq!(names, vec!["echarts", "raster"]);
    }

    #[test]
    fn test_filter_matching_nothing() {
        let re = Regex::new("plotly").unwrap();
        let plan = build_plan(&registry(), Some(&re), DatasetShape::default(), 1);
        assert!(plan.libraries.is_empty());
        assert_eq!(plan.total_trials(), 0);
    }
}
