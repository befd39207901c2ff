//! Predictor abstraction
//!
//! The interpretation routines only ever see a fitted model through the
//! [`Predictor`] trait. Any `Fn(&Row<'_>) -> Result<f64>` closure is a
//! predictor; read-only serialized models live in [`serialized`].

pub mod serialized;

pub use serialized::{LinearModel, SerializedModel, TreeEnsemble, TreeNode};

use crate::data::{Dataset, Row};
use crate::error::{InterpretError, Result};
use ndarray::Array1;

/// A fitted regression model
///
/// Implementations must be pure: the same row always yields the same
/// prediction and calls share no mutable state.
pub trait Predictor: Send + Sync {
    /// Predict a single row
    fn predict(&self, row: &Row<'_>) -> Result<f64>;

    /// Predict every row of a dataset, in row order
    fn predict_dataset(&self, data: &Dataset) -> Result<Array1<f64>> {
        data.rows()
            .map(|row| self.predict(&row))
            .collect::<Result<Vec<f64>>>()
            .map(Array1::from_vec)
    }
}

impl<F> Predictor for F
where
    F: Fn(&Row<'_>) -> Result<f64> + Send + Sync,
{
    fn predict(&self, row: &Row<'_>) -> Result<f64> {
        self(row)
    }
}

/// Run a predictor over a dataset, reporting any failure as `PredictionFailure`
pub(crate) fn predict_checked<P>(predictor: &P, data: &Dataset) -> Result<Array1<f64>>
where
    P: Predictor + ?Sized,
{
    let predictions = predictor.predict_dataset(data).map_err(|e| match e {
        InterpretError::PredictionFailure(_) => e,
        other => InterpretError::PredictionFailure(other.to_string()),
    })?;

    if predictions.len() != data.n_rows() {
        return Err(InterpretError::PredictionFailure(format!(
            "predictor returned {} predictions for {} rows",
            predictions.len(),
            data.n_rows()
        )));
    }

    Ok(predictions)
}
