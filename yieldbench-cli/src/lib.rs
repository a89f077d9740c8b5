#![warn(missing_docs)]
//! YieldBench CLI Library
//!
//! This module provides the orchestrator and the command-line front end.
//! Use `yieldbench_cli::run()` in a main function to get the full CLI, or
//! drive an [`Orchestrator`] directly from code.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     yieldbench_cli::run()
//! }
//! ```

mod config;
mod orchestrator;
mod planner;

pub use config::*;
pub use orchestrator::{Orchestrator, OrchestratorConfig, RunError, RunState};
pub use planner::{RunPlan, build_plan};

use clap::{Parser, Subcommand};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use yieldbench_core::{PRESETS, SyntheticProvider};
use yieldbench_render::{AdapterRegistry, ContainerId, HeadlessBridge};
use yieldbench_report::{OutputFormat, PerformanceLogger, export_csv, export_json, format_comparison};

/// YieldBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "yieldbench")]
#[command(author, version, about = "YieldBench - box-plot rendering benchmark for wafer yield data")]
pub struct Cli {
    /// Optional subcommand (Run, List, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Filter adapters by regex pattern
    #[arg(long, short, default_value = ".*", global = true)]
    pub adapter: String,

    /// Trials per adapter (overrides yieldbench.toml)
    #[arg(long, short = 'n', global = true)]
    pub iterations: Option<usize>,

    /// Dataset preset: small, medium, large, stress
    #[arg(long, global = true)]
    pub preset: Option<String>,

    /// Seed for reproducible yields
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Output format: human, json, csv
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Output file (stdout for human output if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Configuration file (default: discover yieldbench.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the selected adapters (default)
    Run,
    /// List adapters and dataset presets
    List,
    /// Write a default yieldbench.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the YieldBench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the YieldBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("yieldbench=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("yieldbench=info")
            .init();
    }

    // Load yieldbench.toml (CLI flags override)
    let config = match &cli.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::discover().unwrap_or_default(),
    };

    match cli.command {
        Some(Commands::List) => list_adapters(&cli, &config),
        Some(Commands::Init { force }) => init_config(Path::new(CONFIG_FILE), force),
        Some(Commands::Run) | None => run_benchmarks(&cli, &config),
    }
}

fn build_registry(config: &BenchConfig) -> anyhow::Result<AdapterRegistry> {
    let bridge = Rc::new(HeadlessBridge::with_containers([config.runner.container.clone()]));
    Ok(AdapterRegistry::with_builtin(bridge, config.sidecar.to_config()?))
}

fn filter_regex(cli: &Cli) -> anyhow::Result<Regex> {
    Regex::new(&cli.adapter).map_err(|e| anyhow::anyhow!("Invalid adapter filter {:?}: {}", cli.adapter, e))
}

/// Resolve the run plan by layering: yieldbench.toml → CLI overrides.
fn resolve_plan(cli: &Cli, config: &BenchConfig, registry: &AdapterRegistry) -> anyhow::Result<RunPlan> {
    let mut dataset = config.dataset.clone();
    if let Some(preset) = &cli.preset {
        dataset.preset = Some(preset.clone());
    }
    let shape = dataset.shape()?;
    let iterations = cli.iterations.unwrap_or(config.runner.iterations);
    let filter = filter_regex(cli)?;
    Ok(build_plan(registry, Some(&filter), shape, iterations))
}

fn list_adapters(cli: &Cli, config: &BenchConfig) -> anyhow::Result<()> {
    let registry = build_registry(config)?;
    let plan = resolve_plan(cli, config, &registry)?;

    println!("YieldBench Plan:");
    println!("├── dataset: {}", plan.shape);
    println!("├── iterations: {}", plan.iterations);
    for library in &plan.libraries {
        let interactive = registry
            .create(library)
            .is_some_and(|adapter| adapter.supports_selection());
        let marker = if interactive { " [interactive]" } else { "" };
        println!("│   ├── {}{}", library, marker);
    }
    println!("{} adapters selected.", plan.libraries.len());

    let presets: Vec<String> = PRESETS
        .iter()
        .map(|(name, weeks, lots, wafers)| format!("{} ({}x{}x{})", name, weeks, lots, wafers))
        .collect();
    println!("Presets: {}", presets.join(", "));
    Ok(())
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    std::fs::write(path, BenchConfig::default_toml())?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn run_benchmarks(cli: &Cli, config: &BenchConfig) -> anyhow::Result<()> {
    let registry = build_registry(config)?;
    let plan = resolve_plan(cli, config, &registry)?;
    if plan.libraries.is_empty() {
        println!("No adapters matched {:?}.", cli.adapter);
        return Ok(());
    }

    let format: OutputFormat = match &cli.format {
        Some(f) => f.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => config.output.format.parse().unwrap_or(OutputFormat::Human),
    };

    let mut provider = SyntheticProvider::new();
    if let Some(seed) = cli.seed.or(config.dataset.seed) {
        provider = provider.with_seed(seed);
    }
    let orchestrator_config = OrchestratorConfig {
        render_mode: config.runner.render_mode,
        fetch_timeout: BenchConfig::parse_duration(&config.runner.fetch_timeout)?,
        settle_delay: BenchConfig::parse_duration(&config.runner.settle_delay)?,
    };

    tracing::info!(
        adapters = plan.libraries.len(),
        iterations = plan.iterations,
        shape = %plan.shape,
        data_points = plan.shape.data_points(),
        "starting run"
    );

    let container = ContainerId::new(config.runner.container.clone());
    let mut adapters = plan.instantiate(&registry);
    let mut orchestrator = Orchestrator::new(provider, orchestrator_config).with_progress();
    let outcome = orchestrator.compare_adapters(&mut adapters, &container, plan.iterations, &plan.shape);
    let logger = orchestrator.into_logger();
    outcome?;

    write_output(cli, config, format, &logger)
}

fn write_output(
    cli: &Cli,
    config: &BenchConfig,
    format: OutputFormat,
    logger: &PerformanceLogger,
) -> anyhow::Result<()> {
    let content = match format {
        OutputFormat::Human => format_comparison(logger.results()),
        OutputFormat::Json => export_json(logger.results())?,
        OutputFormat::Csv => export_csv(logger.results())?,
    };

    // Machine-readable output goes to the output directory unless a file is given
    let target = cli.output.clone().or_else(|| match format {
        OutputFormat::Human => None,
        _ => Some(
            Path::new(&config.output.directory)
                .join(format!("yieldbench-results.{}", format.extension())),
        ),
    });

    match target {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, content)?;
            println!("Results written to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("yieldbench").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_defaults() {
        let cli = cli(&[]);
        assert!(cli.command.is_none());
        assert_eq!(cli.adapter, ".*");
        assert!(cli.iterations.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = cli(&["run", "--adapter", "echarts", "-n", "5", "--preset", "small"]);
        assert!(matches!(cli.command, Some(Commands::Run)));
        assert_eq!(cli.adapter, "echarts");
        assert_eq!(cli.iterations, Some(5));
        assert_eq!(cli.preset.as_deref(), Some("small"));
    }

    #[test]
    fn test_resolve_plan_layers_cli_over_config() {
        let config = BenchConfig::default();
        let registry = build_registry(&config).unwrap();
        let cli = cli(&["--adapter", "^e", "--iterations", "2", "--preset", "small"]);
        let plan = resolve_plan(&cli, &config, &registry).unwrap();

        assert_eq!(plan.libraries, vec!["echarts"]);
        assert_eq!(plan.iterations, 2);
        assert_eq!(plan.shape.data_points(), 200);
    }

    #[test]
    fn test_invalid_filter() {
        let config = BenchConfig::default();
        let registry = build_registry(&config).unwrap();
        let cli = cli(&["--adapter", "("]);
        assert!(resolve_plan(&cli, &config, &registry).is_err());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        init_config(&path, false).unwrap();
        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
        assert!(BenchConfig::load(&path).is_ok());
    }

    #[test]
    fn test_write_output_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BenchConfig::default();
        config.output.directory = dir.path().join("out").display().to_string();

        let mut orchestrator = Orchestrator::new(SyntheticProvider::new().with_seed(1), OrchestratorConfig::default());
        let bridge = Rc::new(HeadlessBridge::with_containers(["c"]));
        let mut adapter = yieldbench_render::ScriptChartAdapter::new(bridge);
        orchestrator
            .run_test(&mut adapter, &ContainerId::new("c"), &yieldbench_core::DatasetShape::new(1, 2, 3))
            .unwrap();

        write_output(&cli(&[]), &config, OutputFormat::Csv, orchestrator.logger()).unwrap();
        let written = std::fs::read_to_string(dir.path().join("out/yieldbench-results.csv")).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(written.contains(",echarts,server,6,"));
    }
}
