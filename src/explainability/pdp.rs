//! Partial Dependence and Individual Conditional Expectation

use super::{mean, std_dev};
use crate::config::{GridStrategy, PdpConfig};
use crate::data::Dataset;
use crate::error::Result;
use crate::predictor::{predict_checked, Predictor};
use crate::utils::{try_parallel_map, ParallelConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of Partial Dependence computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdpResult {
    /// Feature name
    pub feature: String,
    /// Grid values for the feature, ascending
    pub grid_values: Vec<f64>,
    /// Average predictions at each grid point
    pub average_predictions: Vec<f64>,
    /// Standard deviation of predictions at each grid point
    pub std_predictions: Vec<f64>,
    /// Mean of `std_predictions`; zero when every ICE curve is parallel
    pub heterogeneity: f64,
}

impl PdpResult {
    /// `(grid_value, average_prediction)` pairs in grid order
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.grid_values
            .iter()
            .copied()
            .zip(self.average_predictions.iter().copied())
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.grid_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid_values.is_empty()
    }
}

/// Individual Conditional Expectation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceResult {
    /// Feature name
    pub feature: String,
    /// Grid values for the feature
    pub grid_values: Vec<f64>,
    /// Individual predictions: shape (n_rows, n_grid_points)
    pub individual_predictions: Vec<Vec<f64>>,
    /// Centered ICE (c-ICE): predictions minus each curve's first value
    pub centered_predictions: Option<Vec<Vec<f64>>>,
}

impl IceResult {
    /// Average the ICE curves into a partial dependence result
    pub fn to_pdp(&self) -> PdpResult {
        let mut average_predictions = Vec::with_capacity(self.grid_values.len());
        let mut std_predictions = Vec::with_capacity(self.grid_values.len());

        for grid_idx in 0..self.grid_values.len() {
            let values: Vec<f64> = self
                .individual_predictions
                .iter()
                .map(|curve| curve[grid_idx])
                .collect();
            let avg = mean(&values);
            std_predictions.push(std_dev(&values, avg));
            average_predictions.push(avg);
        }

        let heterogeneity = mean(&std_predictions);

        PdpResult {
            feature: self.feature.clone(),
            grid_values: self.grid_values.clone(),
            average_predictions,
            std_predictions,
            heterogeneity,
        }
    }
}

/// Partial dependence calculator
#[derive(Debug, Clone, Default)]
pub struct PartialDependence {
    config: PdpConfig,
    parallel: ParallelConfig,
}

impl PartialDependence {
    /// Create new PDP calculator
    pub fn new(config: PdpConfig) -> Self {
        Self {
            config,
            parallel: ParallelConfig::default(),
        }
    }

    /// Set parallelism for batch computations
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &PdpConfig {
        &self.config
    }

    /// Compute partial dependence for a single feature
    pub fn compute<P>(&self, predictor: &P, data: &Dataset, feature: &str) -> Result<PdpResult>
    where
        P: Predictor + ?Sized,
    {
        Ok(self.compute_ice(predictor, data, feature)?.to_pdp())
    }

    /// Compute ICE curves for a single feature
    pub fn compute_ice<P>(&self, predictor: &P, data: &Dataset, feature: &str) -> Result<IceResult>
    where
        P: Predictor + ?Sized,
    {
        self.config.validate()?;
        let feature_index = data.feature_index(feature)?;
        self.ice_for(predictor, data, feature, feature_index)
    }

    /// Compute partial dependence for several features, in the given order
    ///
    /// Every feature is validated before the first prediction.
    pub fn compute_batch<P, S>(
        &self,
        predictor: &P,
        data: &Dataset,
        features: &[S],
    ) -> Result<Vec<PdpResult>>
    where
        P: Predictor + ?Sized,
        S: AsRef<str> + Sync,
    {
        let curves = self.compute_ice_batch(predictor, data, features)?;
        Ok(curves.iter().map(IceResult::to_pdp).collect())
    }

    /// ICE curves for several features, in the given order
    pub fn compute_ice_batch<P, S>(
        &self,
        predictor: &P,
        data: &Dataset,
        features: &[S],
    ) -> Result<Vec<IceResult>>
    where
        P: Predictor + ?Sized,
        S: AsRef<str> + Sync,
    {
        self.config.validate()?;
        let mut targets = Vec::with_capacity(features.len());
        for feature in features {
            let name = feature.as_ref();
            targets.push((name, data.feature_index(name)?));
        }

        info!(
            features = targets.len(),
            grid_size = self.config.grid_size,
            threads = self.parallel.num_threads(),
            "Computing partial dependence batch"
        );

        try_parallel_map(&targets, &self.parallel, |&(name, index)| {
            self.ice_for(predictor, data, name, index)
        })
    }

    /// Grid of values the feature is swept over
    pub fn grid(&self, data: &Dataset, feature: &str) -> Result<Vec<f64>> {
        self.config.validate()?;
        let feature_index = data.feature_index(feature)?;
        Ok(self.grid_for(data, feature_index))
    }

    fn ice_for<P>(
        &self,
        predictor: &P,
        data: &Dataset,
        feature: &str,
        feature_index: usize,
    ) -> Result<IceResult>
    where
        P: Predictor + ?Sized,
    {
        let grid_values = self.grid_for(data, feature_index);
        let n_rows = data.n_rows();
        let n_grid = grid_values.len();

        debug!(
            feature,
            grid_size = n_grid,
            rows = n_rows,
            "Computing partial dependence"
        );

        let mut individual_predictions = vec![vec![0.0; n_grid]; n_rows];

        for (grid_idx, &grid_val) in grid_values.iter().enumerate() {
            let modified = data.with_constant_column(feature_index, grid_val);
            let predictions = predict_checked(predictor, &modified)?;

            for (row_idx, &pred) in predictions.iter().enumerate() {
                individual_predictions[row_idx][grid_idx] = pred;
            }
        }

        let centered_predictions = self.config.center_ice.then(|| {
            individual_predictions
                .iter()
                .map(|curve| {
                    let center = curve[0];
                    curve.iter().map(|p| p - center).collect()
                })
                .collect()
        });

        Ok(IceResult {
            feature: feature.to_string(),
            grid_values,
            individual_predictions,
            centered_predictions,
        })
    }

    fn grid_for(&self, data: &Dataset, feature_index: usize) -> Vec<f64> {
        let column = data.values().column(feature_index);

        let (low, high) = match self.config.grid_strategy {
            GridStrategy::Uniform => column
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                }),
            GridStrategy::Percentile { low, high } => {
                let mut values = column.to_vec();
                values.sort_by(f64::total_cmp);
                (percentile(&values, low), percentile(&values, high))
            }
        };

        uniform_grid(low, high, self.config.grid_size)
    }
}

/// `n` evenly spaced values from `min` to `max`, both inclusive
///
/// A degenerate range yields `n` copies of `min`. The first point is exactly
/// `min` and the last exactly `max`, even when `max - min` overflows.
pub fn uniform_grid(min: f64, max: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 || min == max {
        return vec![min; n];
    }

    let last = n - 1;
    (0..n)
        .map(|k| {
            if k == 0 {
                return min;
            }
            if k == last {
                return max;
            }
            let scaled = k as f64 * (max - min);
            if scaled.is_finite() {
                min + scaled / last as f64
            } else {
                let t = k as f64 / last as f64;
                min * (1.0 - t) + max * t
            }
        })
        .collect()
}

// Percentile on sorted values: element at the floored position
// `pct/100 * (len - 1)`, no interpolation
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let idx = ((pct / 100.0) * (sorted.len() - 1) as f64) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Row;
    use crate::error::InterpretError;
    use ndarray::array;

    fn linear_data() -> Dataset {
        Dataset::new(
            vec!["x0".to_string(), "x1".to_string()],
            array![
                [0.0, 0.0],
                [1.0, 0.5],
                [2.0, 1.0],
                [3.0, 1.5],
                [4.0, 2.0],
                [5.0, 2.5],
                [6.0, 3.0],
                [7.0, 3.5],
                [8.0, 4.0],
                [9.0, 4.5]
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_pdp_linear_model() {
        // y = x0 + 2*x1
        let predict = |row: &Row<'_>| -> Result<f64> {
            Ok(row.value("x0")? + 2.0 * row.value("x1")?)
        };

        let pdp = PartialDependence::new(PdpConfig::new().with_grid_size(10));
        let result = pdp.compute(&predict, &linear_data(), "x0").unwrap();

        assert_eq!(result.feature, "x0");
        assert_eq!(result.len(), 10);
        // mean(2*x1) = 4.5
        for (grid, avg) in result.points() {
            assert!((avg - (grid + 4.5)).abs() < 1e-9);
        }
        assert!(result.heterogeneity > 0.0);
    }

    #[test]
    fn test_ice_curves() {
        let predict = |row: &Row<'_>| -> Result<f64> { row.value("x0") };

        let pdp = PartialDependence::new(PdpConfig::new().with_grid_size(5).with_center_ice(true));
        let ice = pdp.compute_ice(&predict, &linear_data(), "x0").unwrap();

        assert_eq!(ice.individual_predictions.len(), 10);
        assert_eq!(ice.individual_predictions[0].len(), 5);
        let centered = ice.centered_predictions.unwrap();
        assert!(centered.iter().all(|curve| curve[0] == 0.0));
    }

    #[test]
    fn test_ice_not_centered_by_default() {
        let predict = |row: &Row<'_>| -> Result<f64> { row.value("x0") };
        let pdp = PartialDependence::new(PdpConfig::new().with_grid_size(3));
        let ice = pdp.compute_ice(&predict, &linear_data(), "x0").unwrap();
        assert!(ice.centered_predictions.is_none());
    }

    #[test]
    fn test_uniform_grid() {
        assert_eq!(uniform_grid(1.0, 4.0, 4), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(uniform_grid(2.0, 2.0, 3), vec![2.0, 2.0, 2.0]);

        let grid = uniform_grid(0.1, 0.7, 7);
        assert_eq!(grid[0], 0.1);
        assert_eq!(grid[6], 0.7);
    }

    #[test]
    fn test_uniform_grid_huge_range() {
        let grid = uniform_grid(-1e308, 1e308, 3);
        assert_eq!(grid, vec![-1e308, 0.0, 1e308]);

        let grid = uniform_grid(-f64::MAX, f64::MAX, 5);
        assert_eq!(grid[0], -f64::MAX);
        assert_eq!(grid[4], f64::MAX);
        assert!(grid.iter().all(|v| v.is_finite()));
        assert!(grid.windows(2).all(|w| w[0] < w[1]));

        let data = Dataset::new(vec!["a".to_string()], array![[-1e308], [1e308]]).unwrap();
        let pdp = PartialDependence::new(PdpConfig::new().with_grid_size(3));
        assert_eq!(pdp.grid(&data, "a").unwrap(), vec![-1e308, 0.0, 1e308]);
    }

    #[test]
    fn test_percentile_floors_position() {
        let sorted: Vec<f64> = (0..10).map(|v| v as f64).collect();
        assert_eq!(percentile(&sorted, 95.0), 8.0);
        assert_eq!(percentile(&sorted, 100.0), 9.0);
        assert_eq!(percentile(&sorted, 0.0), 0.0);
    }

    #[test]
    fn test_percentile_grid() {
        let pdp = PartialDependence::new(
            PdpConfig::new()
                .with_grid_size(2)
                .with_percentile_range(0.0, 50.0),
        );
        let grid = pdp.grid(&linear_data(), "x0").unwrap();
        assert_eq!(grid, vec![0.0, 4.0]);
    }

    #[test]
    fn test_invalid_inputs() {
        let predict = |_row: &Row<'_>| -> Result<f64> { Ok(0.0) };
        let data = linear_data();

        let pdp = PartialDependence::default();
        assert!(matches!(
            pdp.compute(&predict, &data, "nope"),
            Err(InterpretError::InvalidFeature(_))
        ));

        let pdp = PartialDependence::new(PdpConfig::new().with_grid_size(1));
        assert!(matches!(
            pdp.compute(&predict, &data, "x0"),
            Err(InterpretError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_batch_keeps_feature_order() {
        let predict = |row: &Row<'_>| -> Result<f64> {
            Ok(row.value("x0")? * row.value("x1")?)
        };

        let pdp = PartialDependence::new(PdpConfig::new().with_grid_size(4));
        let results = pdp
            .compute_batch(&predict, &linear_data(), &["x1", "x0"])
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].feature, "x1");
        assert_eq!(results[1].feature, "x0");
    }

    #[test]
    fn test_ice_batch_on_dedicated_pool() {
        let predict = |row: &Row<'_>| -> Result<f64> {
            Ok(row.value("x0")? - 2.0 * row.value("x1")?)
        };
        let config = PdpConfig::new().with_grid_size(5).with_center_ice(true);
        let data = linear_data();

        let pooled = PartialDependence::new(config.clone())
            .with_parallel(ParallelConfig::new().with_threads(2))
            .compute_ice_batch(&predict, &data, &["x1", "x0"])
            .unwrap();
        let sequential = PartialDependence::new(config)
            .with_parallel(ParallelConfig::sequential());

        assert_eq!(pooled.len(), 2);
        assert_eq!(pooled[0], sequential.compute_ice(&predict, &data, "x1").unwrap());
        assert_eq!(pooled[1], sequential.compute_ice(&predict, &data, "x0").unwrap());
    }
}
