//! Model explainability module
//!
//! Provides global interpretation methods for fitted regression models:
//! - Partial dependence (PDP)
//! - Individual conditional expectation (ICE)
//! - Permutation feature importance

mod importance;
mod pdp;

pub use importance::{FeatureImportance, ImportanceResult, PermutationImportance};
pub use pdp::{uniform_grid, IceResult, PartialDependence, PdpResult};

/// Arithmetic mean, exact when every value is identical
///
/// Infinite samples (ratio against a zero baseline) yield an infinite mean.
pub(crate) fn mean(values: &[f64]) -> f64 {
    match values.first() {
        Some(&shift) if shift.is_finite() => {
            shift + values.iter().map(|v| v - shift).sum::<f64>() / values.len() as f64
        }
        Some(_) => values.iter().sum::<f64>() / values.len() as f64,
        None => 0.0,
    }
}

/// Population standard deviation around `mean`
pub(crate) fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|&v| if v == mean { 0.0 } else { (v - mean).powi(2) })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
