//! mlinterpret CLI Module
//!
//! Command-line wrapper around partial dependence and permutation importance.

use clap::{Args, Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{ComparisonMode, ExplainConfig};
use crate::data::{load_dataset, Dataset};
use crate::explainability::{PartialDependence, PdpResult, PermutationImportance};
use crate::metrics::Metric;
use crate::predictor::SerializedModel;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "mlinterpret")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Partial dependence and permutation importance for fitted regression models")]
#[command(long_about = None)]
pub struct Cli {
    /// JSON configuration file; command-line flags take precedence
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute partial dependence for one or more features
    Pdp(PdpArgs),

    /// Compute permutation feature importance
    Importance(ImportanceArgs),

    /// Show dataset information
    Info {
        /// Input data file (CSV, JSON, or Parquet)
        #[arg(short, long)]
        data: PathBuf,
    },
}

#[derive(Args)]
pub struct PdpArgs {
    /// Input data file (CSV, JSON, or Parquet)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Serialized model (JSON)
    #[arg(short, long)]
    pub model: PathBuf,

    /// Feature to sweep (repeatable)
    #[arg(short, long = "feature", required = true)]
    pub features: Vec<String>,

    /// Number of grid points
    #[arg(short, long)]
    pub grid_size: Option<usize>,

    /// Write individual conditional expectation curves instead of averages
    #[arg(long)]
    pub ice: bool,

    /// Number of worker threads
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportanceArgs {
    /// Input data file (CSV, JSON, or Parquet)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Serialized model (JSON)
    #[arg(short, long)]
    pub model: PathBuf,

    /// Target column name
    #[arg(short, long)]
    pub target: String,

    /// Feature to permute (repeatable; default: every column except the target)
    #[arg(short, long = "feature")]
    pub features: Vec<String>,

    /// Loss metric (rmse, mse, mae, r2)
    #[arg(long)]
    pub metric: Option<Metric>,

    /// Comparison with the baseline loss (difference, ratio)
    #[arg(long)]
    pub mode: Option<ComparisonMode>,

    /// Shuffles per feature
    #[arg(short, long)]
    pub repeats: Option<usize>,

    /// Share of rows to evaluate, in (0, 1]
    #[arg(long)]
    pub sample_fraction: Option<f64>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Only show the top K features
    #[arg(long)]
    pub top: Option<usize>,

    /// Number of worker threads
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ─── Shared plumbing ───────────────────────────────────────────────────────────

/// Read the config file if given, else defaults
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ExplainConfig> {
    match path {
        Some(path) => Ok(ExplainConfig::from_file(path)?),
        None => Ok(ExplainConfig::default()),
    }
}

fn load_inputs(data_path: &Path, model_path: &Path) -> anyhow::Result<(Dataset, SerializedModel)> {
    step_run("Loading data");
    let start = Instant::now();
    let data = load_dataset(data_path)?;
    step_done(&format!(
        "{} rows × {} cols in {:?}",
        data.n_rows(),
        data.n_columns(),
        start.elapsed()
    ));

    step_run("Loading model");
    let model = SerializedModel::from_file(model_path)?;
    let required = model.feature_names();
    let missing: BTreeSet<&String> = required.iter().filter(|f| !data.has_column(f)).collect();
    if !missing.is_empty() {
        anyhow::bail!(
            "model expects columns missing from the data: {}",
            missing.into_iter().cloned().collect::<Vec<_>>().join(", ")
        );
    }
    step_done(&format!("{} features", required.len()));

    Ok((data, model))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    step_run(&format!("Saving → {}", path.display()));
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    step_done("");
    Ok(())
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_pdp(args: &PdpArgs, config: &ExplainConfig) -> anyhow::Result<()> {
    section("Partial Dependence");

    let (data, model) = load_inputs(&args.data, &args.model)?;

    let mut pdp_config = config.pdp.clone();
    if let Some(n) = args.grid_size {
        pdp_config.grid_size = n;
    }
    if args.ice {
        pdp_config.center_ice = true;
    }
    let mut parallel = config.parallel.clone();
    if let Some(n) = args.threads {
        parallel = parallel.with_threads(n);
    }

    let pdp = PartialDependence::new(pdp_config).with_parallel(parallel);

    step_run(&format!("Sweeping {} feature(s)", args.features.len()));
    let start = Instant::now();
    if args.ice {
        let curves = pdp.compute_ice_batch(&model, &data, &args.features)?;
        step_done(&format!("{:?}", start.elapsed()));

        let results: Vec<PdpResult> = curves.iter().map(|ice| ice.to_pdp()).collect();
        print_pdp(&results);
        if let Some(output) = &args.output {
            write_json(output, &curves)?;
        }
    } else {
        let results = pdp.compute_batch(&model, &data, &args.features)?;
        step_done(&format!("{:?}", start.elapsed()));

        print_pdp(&results);
        if let Some(output) = &args.output {
            write_json(output, &results)?;
        }
    }

    println!();
    Ok(())
}

fn print_pdp(results: &[PdpResult]) {
    for result in results {
        println!();
        println!("  {} {}", muted("feature"), result.feature.white().bold());
        println!("  {:>14} {:>14}", muted("value"), muted("prediction"));
        println!("  {}", dim(&"─".repeat(30)));
        for (value, prediction) in result.points() {
            println!("  {:>14.4} {:>14.4}", value, prediction);
        }
        println!(
            "  {:<16} {:.4}",
            muted("heterogeneity"),
            result.heterogeneity
        );
    }
}

pub fn cmd_importance(args: &ImportanceArgs, config: &ExplainConfig) -> anyhow::Result<()> {
    section("Permutation Importance");

    let (data, model) = load_inputs(&args.data, &args.model)?;

    let mut importance_config = config.importance.clone();
    if let Some(metric) = args.metric {
        importance_config.metric = metric;
    }
    if let Some(mode) = args.mode {
        importance_config.mode = mode;
    }
    if let Some(n) = args.repeats {
        importance_config.n_repeats = n;
    }
    if let Some(fraction) = args.sample_fraction {
        importance_config.sample_fraction = fraction;
    }
    if args.seed.is_some() {
        importance_config.seed = args.seed;
    }
    let mut parallel = config.parallel.clone();
    if let Some(n) = args.threads {
        parallel = parallel.with_threads(n);
    }

    let metric = importance_config.metric;
    let calc = PermutationImportance::new(importance_config).with_parallel(parallel);

    step_run(&format!("Permuting features against {}", args.target.cyan()));
    let start = Instant::now();
    let result = if args.features.is_empty() {
        calc.compute_all(&model, &data, &args.target, &metric)?
    } else {
        calc.compute(&model, &data, &args.target, &metric, &args.features)?
    };
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!(
        "  {:<16} {:.4}",
        muted(&format!("baseline {}", result.metric)),
        result.baseline_loss
    );
    println!("  {:<16} {}", muted("mode"), result.mode);
    println!("  {:<16} {}", muted("rows"), result.n_rows);
    println!("  {:<16} {}", muted("seed"), result.seed);
    println!();

    println!(
        "  {:>4}  {:<24} {:>12} {:>10}",
        muted("#"),
        muted("Feature"),
        muted("Importance"),
        muted("Std")
    );
    println!("  {}", dim(&"─".repeat(54)));

    let shown = match args.top {
        Some(k) => result.top_k(k),
        None => &result.importances[..],
    };
    for (rank, entry) in shown.iter().enumerate() {
        println!(
            "  {:>4}  {:<24} {:>12.4} {:>10.4}",
            rank + 1,
            entry.feature,
            entry.importance,
            entry.std_dev
        );
    }

    if let Some(best) = result.importances.first() {
        println!();
        step_ok(&format!("most important: {}", best.feature.white().bold()));
    }

    if let Some(output) = &args.output {
        println!();
        write_json(output, &result)?;
    }

    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let data = load_dataset(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), data.n_rows());
    println!("  {:<12} {}", muted("Columns"), data.n_columns());
    println!();

    println!(
        "  {:<20} {:>12} {:>12} {:>12}",
        muted("Column"),
        muted("Min"),
        muted("Max"),
        muted("Mean")
    );
    println!("  {}", dim(&"─".repeat(58)));

    for column in data.summary() {
        println!(
            "  {:<20} {:>12.4} {:>12.4} {:>12.4}",
            column.name, column.min, column.max, column.mean
        );
    }

    println!();
    Ok(())
}
