//! Configuration for the interpretation routines
//!
//! Every struct deserializes with defaults for missing fields, so a config
//! file only needs to name the values it changes:
//!
//! ```json
//! {"pdp": {"grid_size": 20}, "importance": {"n_repeats": 10, "seed": 42}}
//! ```

use crate::error::{InterpretError, Result};
use crate::metrics::Metric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use crate::utils::ParallelConfig;

/// Default number of grid points for partial dependence
pub const DEFAULT_GRID_SIZE: usize = 50;

/// Default number of permutation repeats
pub const DEFAULT_N_REPEATS: usize = 5;

/// How PDP grid endpoints are chosen
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridStrategy {
    /// Observed minimum to observed maximum
    #[default]
    Uniform,
    /// `low`-th to `high`-th percentile (0-100) of the observed values
    Percentile { low: f64, high: f64 },
}

/// Partial dependence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdpConfig {
    /// Number of grid points
    pub grid_size: usize,
    /// Grid endpoint selection
    pub grid_strategy: GridStrategy,
    /// Also produce ICE curves centered at the first grid point
    pub center_ice: bool,
}

impl Default for PdpConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            grid_strategy: GridStrategy::Uniform,
            center_ice: false,
        }
    }
}

impl PdpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of grid points
    pub fn with_grid_size(mut self, n: usize) -> Self {
        self.grid_size = n;
        self
    }

    /// Use percentile endpoints instead of min/max
    pub fn with_percentile_range(mut self, low: f64, high: f64) -> Self {
        self.grid_strategy = GridStrategy::Percentile { low, high };
        self
    }

    /// Enable centered ICE curves
    pub fn with_center_ice(mut self, center: bool) -> Self {
        self.center_ice = center;
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.grid_size < 2 {
            return Err(InterpretError::InvalidConfig(format!(
                "grid_size must be at least 2, got {}",
                self.grid_size
            )));
        }
        if let GridStrategy::Percentile { low, high } = self.grid_strategy {
            let in_range = |p: f64| (0.0..=100.0).contains(&p);
            if !in_range(low) || !in_range(high) || low > high {
                return Err(InterpretError::InvalidConfig(format!(
                    "percentile range must satisfy 0 <= low <= high <= 100, got ({}, {})",
                    low, high
                )));
            }
        }
        Ok(())
    }
}

/// How a permuted loss is compared against the baseline loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// `permuted - baseline`
    #[default]
    Difference,
    /// `permuted / baseline`
    Ratio,
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonMode::Difference => f.write_str("difference"),
            ComparisonMode::Ratio => f.write_str("ratio"),
        }
    }
}

impl FromStr for ComparisonMode {
    type Err = InterpretError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "difference" | "diff" => Ok(ComparisonMode::Difference),
            "ratio" => Ok(ComparisonMode::Ratio),
            other => Err(InterpretError::InvalidConfig(format!(
                "unknown comparison mode '{}' (expected difference or ratio)",
                other
            ))),
        }
    }
}

/// Permutation importance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportanceConfig {
    /// Shuffles per feature
    pub n_repeats: usize,
    /// Share of rows evaluated, in (0, 1]
    pub sample_fraction: f64,
    /// Random seed (None = drawn from entropy and reported in the result)
    pub seed: Option<u64>,
    /// Baseline comparison
    pub mode: ComparisonMode,
    /// Loss used when no custom loss is supplied
    pub metric: Metric,
}

impl Default for ImportanceConfig {
    fn default() -> Self {
        Self {
            n_repeats: DEFAULT_N_REPEATS,
            sample_fraction: 1.0,
            seed: None,
            mode: ComparisonMode::Difference,
            metric: Metric::Rmse,
        }
    }
}

impl ImportanceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of permutation repeats
    pub fn with_n_repeats(mut self, n_repeats: usize) -> Self {
        self.n_repeats = n_repeats;
        self
    }

    /// Set the share of rows to evaluate
    pub fn with_sample_fraction(mut self, fraction: f64) -> Self {
        self.sample_fraction = fraction;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set comparison mode
    pub fn with_mode(mut self, mode: ComparisonMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set default metric
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.n_repeats < 1 {
            return Err(InterpretError::InvalidConfig(
                "n_repeats must be at least 1".to_string(),
            ));
        }
        if !(self.sample_fraction > 0.0 && self.sample_fraction <= 1.0) {
            return Err(InterpretError::InvalidConfig(format!(
                "sample_fraction must be in (0, 1], got {}",
                self.sample_fraction
            )));
        }
        Ok(())
    }
}

/// Top-level configuration, as read from a config file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    pub pdp: PdpConfig,
    pub importance: ImportanceConfig,
    pub parallel: ParallelConfig,
}

impl ExplainConfig {
    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.pdp.validate()?;
        self.importance.validate()
    }
}
