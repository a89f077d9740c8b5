//! Compare every built-in adapter on a small dataset and print the table.
//!
//! ```text
//! cargo run -p yieldbench --example compare
//! ```

use std::rc::Rc;
use yieldbench::{
    AdapterRegistry, ChartAdapter, ContainerId, DatasetShape, HeadlessBridge, Orchestrator,
    OrchestratorConfig, SyntheticProvider, format_comparison, summarize,
};

fn main() -> anyhow::Result<()> {
    let container = ContainerId::new("chart-container");
    let bridge = Rc::new(HeadlessBridge::with_containers([container.as_str()]));
    let registry = AdapterRegistry::with_builtin(bridge, None);

    let mut adapters: Vec<Box<dyn ChartAdapter>> = registry
        .names()
        .filter_map(|name| registry.create(name))
        .collect();

    let mut orchestrator = Orchestrator::new(
        SyntheticProvider::new().with_seed(42),
        OrchestratorConfig::default(),
    );
    let shape = DatasetShape::new(12, 5, 25);
    orchestrator.compare_adapters(&mut adapters, &container, 3, &shape)?;

    println!("{}", format_comparison(orchestrator.logger().results()));
    for summary in summarize(orchestrator.logger().results()) {
        println!(
            "{:<12} median end-to-end {:>8.2} ms over {} runs",
            summary.library, summary.end_to_end.median, summary.runs
        );
    }
    Ok(())
}
