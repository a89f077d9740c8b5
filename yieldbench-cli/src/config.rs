//! Configuration loading from yieldbench.toml
//!
//! YieldBench configuration can be specified in a `yieldbench.toml` file in the
//! project root. The configuration is automatically discovered by walking up
//! from the current directory. Every field has a default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use yieldbench_core::DatasetShape;
use yieldbench_render::SidecarConfig;
use yieldbench_report::RenderMode;

/// Name of the configuration file
pub const CONFIG_FILE: &str = "yieldbench.toml";

/// YieldBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BenchConfig {
    /// Trial execution
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Dataset shape requested from the provider
    #[serde(default)]
    pub dataset: DatasetConfig,
    /// External SVG renderer
    #[serde(default)]
    pub sidecar: SidecarSection,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration for trial execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Trials per adapter
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Pause between trials (e.g., "250ms")
    #[serde(default = "default_settle_delay")]
    pub settle_delay: String,
    /// Upper bound for one data fetch (e.g., "5m")
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: String,
    /// Render mode recorded with every result
    #[serde(default)]
    pub render_mode: RenderMode,
    /// Container handle charts are drawn into
    #[serde(default = "default_container")]
    pub container: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            settle_delay: default_settle_delay(),
            fetch_timeout: default_fetch_timeout(),
            render_mode: RenderMode::default(),
            container: default_container(),
        }
    }
}

fn default_iterations() -> usize {
    3
}
fn default_settle_delay() -> String {
    "0ms".to_string()
}
fn default_fetch_timeout() -> String {
    "5m".to_string()
}
fn default_container() -> String {
    "chart-container".to_string()
}

/// Dataset shape configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Production year
    #[serde(default = "default_year")]
    pub year: u32,
    /// Number of weeks
    #[serde(default = "default_weeks")]
    pub weeks: u32,
    /// Lots per week
    #[serde(default = "default_lots_per_week")]
    pub lots_per_week: u32,
    /// Wafers per lot
    #[serde(default = "default_wafers_per_lot")]
    pub wafers_per_lot: u32,
    /// Named preset overriding weeks/lots/wafers
    #[serde(default)]
    pub preset: Option<String>,
    /// Seed for reproducible yields
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            year: default_year(),
            weeks: default_weeks(),
            lots_per_week: default_lots_per_week(),
            wafers_per_lot: default_wafers_per_lot(),
            preset: None,
            seed: None,
        }
    }
}

fn default_year() -> u32 {
    2025
}
fn default_weeks() -> u32 {
    52
}
fn default_lots_per_week() -> u32 {
    10
}
fn default_wafers_per_lot() -> u32 {
    25
}

impl DatasetConfig {
    /// Resolve the configured shape, preset first
    pub fn shape(&self) -> anyhow::Result<DatasetShape> {
        let shape = match &self.preset {
            Some(name) => DatasetShape::preset(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown dataset preset: {}", name))?,
            None => DatasetShape::new(self.weeks, self.lots_per_week, self.wafers_per_lot),
        }
        .with_year(self.year);
        shape.validate()?;
        Ok(shape)
    }
}

/// External renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecarSection {
    /// Renderer program; the sidecar adapter is disabled without one
    #[serde(default)]
    pub program: Option<String>,
    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,
    /// Timeout for one render (e.g., "60s")
    #[serde(default = "default_sidecar_timeout")]
    pub timeout: String,
    /// Canvas width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Canvas height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for SidecarSection {
    fn default() -> Self {
        Self {
            program: None,
            args: Vec::new(),
            timeout: default_sidecar_timeout(),
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_sidecar_timeout() -> String {
    "60s".to_string()
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}

impl SidecarSection {
    /// Runner settings, if a program is configured
    pub fn to_config(&self) -> anyhow::Result<Option<SidecarConfig>> {
        let Some(program) = &self.program else {
            return Ok(None);
        };
        let mut config = SidecarConfig::new(program.clone())
            .with_args(self.args.iter().cloned())
            .with_timeout(BenchConfig::parse_duration(&self.timeout)?);
        config.width = self.width;
        config.height = self.height;
        Ok(Some(config))
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Output directory for exports
    #[serde(default = "default_output_dir")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: default_output_dir(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_output_dir() -> String {
    "target/yieldbench".to_string()
}

impl BenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), error = %e, "ignoring invalid config");
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# YieldBench Configuration

[runner]
# Trials per adapter
iterations = 3
# Pause between trials
settle_delay = "0ms"
# Upper bound for one data fetch
fetch_timeout = "5m"
# Render mode recorded with results: "server" or "webassembly"
render_mode = "server"
# Container handle charts are drawn into
container = "chart-container"

[dataset]
year = 2025
weeks = 52
lots_per_week = 10
wafers_per_lot = 25
# Named preset: small, medium, large, stress (uncomment to enable)
# preset = "medium"
# Seed for reproducible yields (uncomment to enable)
# seed = 42

[sidecar]
# SVG renderer reading JSON on stdin (uncomment to enable the sidecar-svg adapter)
# program = "node"
# args = ["render.js"]
timeout = "60s"
width = 1280
height = 720

[output]
# Default output format: human, json, csv
format = "human"
# Output directory for exports
directory = "target/yieldbench"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration: {}", s));
        }

        let seconds = match unit_part.to_lowercase().as_str() {
            "ms" => value / 1_000.0,
            "s" => value,
            "m" | "min" => value * 60.0,
            "h" => value * 3_600.0,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Duration::try_from_secs_f64(seconds).map_err(|e| anyhow::anyhow!("Invalid duration {}: {}", s, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.runner.iterations, 3);
        assert_eq!(config.runner.fetch_timeout, "5m");
        assert_eq!(config.runner.render_mode, RenderMode::Server);
        assert_eq!(config.dataset.shape().unwrap(), DatasetShape::default());
        assert!(config.sidecar.program.is_none());
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(BenchConfig::parse_duration("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(BenchConfig::parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(BenchConfig::parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(BenchConfig::parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(BenchConfig::parse_duration("10").unwrap(), Duration::from_secs(10));
        assert_eq!(BenchConfig::parse_duration("0ms").unwrap(), Duration::ZERO);
        assert!(BenchConfig::parse_duration("").is_err());
        assert!(BenchConfig::parse_duration("3 days").is_err());
        assert!(BenchConfig::parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_duration_overflow_is_error() {
        let err = BenchConfig::parse_duration("100000000000000000000000s").unwrap_err();
        assert!(err.to_string().contains("100000000000000000000000s"));
        assert!(BenchConfig::parse_duration("10000000000000000000000m").is_err());

        let toml_str = r#"
[runner]
fetch_timeout = "100000000000000000000000s"
"#;
        let config: BenchConfig = toml::from_str(toml_str).unwrap();
        assert!(BenchConfig::parse_duration(&config.runner.fetch_timeout).is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            iterations = 5
            render_mode = "webassembly"

            [dataset]
            preset = "small"
            seed = 7

            [sidecar]
            program = "node"
            args = ["render.js"]
            timeout = "2s"
        "#;

        let config: BenchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.iterations, 5);
        assert_eq!(config.runner.render_mode, RenderMode::WebAssembly);
        let shape = config.dataset.shape().unwrap();
        assert_eq!(shape.data_points(), 4 * 5 * 10);
        assert_eq!(config.dataset.seed, Some(7));

        let sidecar = config.sidecar.to_config().unwrap().unwrap();
        assert_eq!(sidecar.program, "node");
        assert_eq!(sidecar.args, vec!["render.js".to_string()]);
        assert_eq!(sidecar.timeout, Duration::from_secs(2));
        assert_eq!(sidecar.width, 1280);
        // Defaults should still apply
        assert_eq!(config.output.directory, "target/yieldbench");
        assert_eq!(config.runner.container, "chart-container");
    }

    #[test]
    fn test_unknown_preset() {
        let dataset = DatasetConfig {
            preset: Some("huge".to_string()),
            ..DatasetConfig::default()
        };
        assert!(dataset.shape().is_err());
    }

    #[test]
    fn test_invalid_shape() {
        let dataset = DatasetConfig {
            weeks: 0,
            ..DatasetConfig::default()
        };
        assert!(dataset.shape().is_err());
    }

    #[test]
    fn test_default_toml_parses() {
        let default_toml = BenchConfig::default_toml();
        let config: BenchConfig = toml::from_str(&default_toml).unwrap();
        assert_eq!(config.runner.iterations, 3);
        assert_eq!(config.dataset.wafers_per_lot, 25);
        assert!(config.sidecar.to_config().unwrap().is_none());
    }
}
