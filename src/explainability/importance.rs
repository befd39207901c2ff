//! Permutation feature importance

use super::{mean, std_dev};
use crate::config::{ComparisonMode, ImportanceConfig};
use crate::data::Dataset;
use crate::error::{InterpretError, Result};
use crate::metrics::Loss;
use crate::predictor::{predict_checked, Predictor};
use crate::utils::{non_finite, try_parallel_map, ParallelConfig};
use ndarray::Array1;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Importance of a single feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name
    pub feature: String,
    /// Mean importance over all repeats
    #[serde(with = "non_finite")]
    pub importance: f64,
    /// Standard deviation over all repeats
    #[serde(with = "non_finite")]
    pub std_dev: f64,
    /// Raw importance per repeat
    #[serde(with = "non_finite::vec")]
    pub samples: Vec<f64>,
}

/// Result of feature importance computation
///
/// Features are ordered by descending importance, ties broken by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceResult {
    /// Per-feature importances, most important first
    pub importances: Vec<FeatureImportance>,
    /// Loss of the unpermuted data
    #[serde(with = "non_finite")]
    pub baseline_loss: f64,
    /// Name of the loss used
    pub metric: String,
    /// How permuted losses were compared with the baseline
    pub mode: ComparisonMode,
    /// Seed the computation ran with
    pub seed: u64,
    /// Rows evaluated after subsampling
    pub n_rows: usize,
}

impl ImportanceResult {
    /// Importance entry for a feature
    pub fn get(&self, feature: &str) -> Option<&FeatureImportance> {
        self.importances.iter().find(|f| f.feature == feature)
    }

    /// Iterate in rank order
    pub fn iter(&self) -> impl Iterator<Item = &FeatureImportance> {
        self.importances.iter()
    }

    /// The `k` most important features
    pub fn top_k(&self, k: usize) -> &[FeatureImportance] {
        &self.importances[..k.min(self.importances.len())]
    }

    /// Features with importance strictly above `threshold`
    pub fn above_threshold(&self, threshold: f64) -> Vec<&FeatureImportance> {
        self.importances
            .iter()
            .filter(|f| f.importance > threshold)
            .collect()
    }

    /// Feature name → mean importance
    pub fn scores(&self) -> BTreeMap<String, f64> {
        self.importances
            .iter()
            .map(|f| (f.feature.clone(), f.importance))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.importances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.importances.is_empty()
    }
}

/// Permutation feature importance calculator
#[derive(Debug, Clone, Default)]
pub struct PermutationImportance {
    config: ImportanceConfig,
    parallel: ParallelConfig,
}

impl PermutationImportance {
    /// Create new permutation importance calculator
    pub fn new(config: ImportanceConfig) -> Self {
        Self {
            config,
            parallel: ParallelConfig::default(),
        }
    }

    /// Set parallelism across features
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &ImportanceConfig {
        &self.config
    }

    /// Compute importance using the configured metric
    pub fn compute_with_metric<P, S>(
        &self,
        predictor: &P,
        data: &Dataset,
        target: &str,
        features: &[S],
    ) -> Result<ImportanceResult>
    where
        P: Predictor + ?Sized,
        S: AsRef<str>,
    {
        let metric = self.config.metric;
        self.compute(predictor, data, target, &metric, features)
    }

    /// Compute importance for every column except the target
    pub fn compute_all<P, L>(
        &self,
        predictor: &P,
        data: &Dataset,
        target: &str,
        loss: &L,
    ) -> Result<ImportanceResult>
    where
        P: Predictor + ?Sized,
        L: Loss + ?Sized,
    {
        let features: Vec<&str> = data
            .column_names()
            .iter()
            .map(String::as_str)
            .filter(|name| *name != target)
            .collect();
        self.compute(predictor, data, target, loss, &features)
    }

    /// Compute permutation importance of `features` against `target`
    pub fn compute<P, L, S>(
        &self,
        predictor: &P,
        data: &Dataset,
        target: &str,
        loss: &L,
        features: &[S],
    ) -> Result<ImportanceResult>
    where
        P: Predictor + ?Sized,
        L: Loss + ?Sized,
        S: AsRef<str>,
    {
        self.config.validate()?;
        if features.is_empty() {
            return Err(InterpretError::InvalidConfig(
                "at least one feature is required".to_string(),
            ));
        }
        let target_index = data.column_index(target).ok_or_else(|| {
            InterpretError::InvalidTarget(format!("column '{}' not found in dataset", target))
        })?;
        let mut targets = Vec::with_capacity(features.len());
        let mut seen = HashSet::with_capacity(features.len());
        for (position, feature) in features.iter().enumerate() {
            let name = feature.as_ref();
            if !seen.insert(name) {
                return Err(InterpretError::InvalidConfig(format!(
                    "feature '{}' listed more than once",
                    name
                )));
            }
            targets.push((position, name, data.feature_index(name)?));
        }

        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        let subsample;
        let data = if self.config.sample_fraction < 1.0 {
            subsample = subsample_rows(data, self.config.sample_fraction, &mut rng);
            &subsample
        } else {
            data
        };

        info!(
            features = targets.len(),
            n_repeats = self.config.n_repeats,
            rows = data.n_rows(),
            seed,
            metric = loss.name(),
            "Computing permutation importance"
        );

        let y_true = data.values().column(target_index).to_owned();
        let baseline_pred = predict_checked(predictor, data)?;
        let baseline_loss = loss.loss(y_true.view(), baseline_pred.view());
        let smaller_is_better = loss.smaller_is_better();

        let mut importances = try_parallel_map(&targets, &self.parallel, |&(position, name, index)| {
            // Per-position streams keep results independent of scheduling
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1 + position as u64));
            let mut samples = Vec::with_capacity(self.config.n_repeats);

            for _ in 0..self.config.n_repeats {
                let mut column = data.values().column(index).to_vec();
                column.shuffle(&mut rng);
                let permuted = data.with_column(index, &Array1::from_vec(column));

                let predictions = predict_checked(predictor, &permuted)?;
                let permuted_loss = loss.loss(y_true.view(), predictions.view());
                samples.push(compare(
                    baseline_loss,
                    permuted_loss,
                    self.config.mode,
                    smaller_is_better,
                ));
            }

            let importance = mean(&samples);
            debug!(feature = name, importance, "Permutation importance");

            Ok(FeatureImportance {
                feature: name.to_string(),
                importance,
                std_dev: std_dev(&samples, importance),
                samples,
            })
        })?;

        importances.sort_by(|a, b| {
            b.importance
                .total_cmp(&a.importance)
                .then_with(|| a.feature.cmp(&b.feature))
        });

        Ok(ImportanceResult {
            importances,
            baseline_loss,
            metric: loss.name().to_string(),
            mode: self.config.mode,
            seed,
            n_rows: data.n_rows(),
        })
    }
}

/// Uniform subsample without replacement, original row order preserved
fn subsample_rows(data: &Dataset, fraction: f64, rng: &mut StdRng) -> Dataset {
    let n = data.n_rows();
    let k = ((n as f64 * fraction).round() as usize).clamp(1, n);
    let mut indices = rand::seq::index::sample(rng, n, k).into_vec();
    indices.sort_unstable();
    data.select_rows(&indices)
}

/// Importance of one permuted loss relative to the baseline
///
/// Larger always means more important: operands swap for metrics where
/// larger is better.
fn compare(baseline: f64, permuted: f64, mode: ComparisonMode, smaller_is_better: bool) -> f64 {
    let (worse, better) = if smaller_is_better {
        (permuted, baseline)
    } else {
        (baseline, permuted)
    };

    match mode {
        ComparisonMode::Difference => worse - better,
        ComparisonMode::Ratio if worse == better => 1.0,
        ComparisonMode::Ratio => worse / better,
    }
}
