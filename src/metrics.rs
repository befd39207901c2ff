//! Loss functions for permutation importance

use crate::error::{InterpretError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scalar measure of prediction error
pub trait Loss: Send + Sync {
    /// Short name used in reports
    fn name(&self) -> &str {
        "custom"
    }

    /// Evaluate the loss of `y_pred` against `y_true`
    fn loss(&self, y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64;

    /// Whether lower values mean a better model
    fn smaller_is_better(&self) -> bool {
        true
    }
}

impl<F> Loss for F
where
    F: Fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64 + Send + Sync,
{
    fn loss(&self, y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
        self(y_true, y_pred)
    }
}

/// Built-in regression metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Root mean squared error
    #[default]
    Rmse,
    /// Mean squared error
    Mse,
    /// Mean absolute error
    Mae,
    /// Coefficient of determination (larger is better)
    R2,
}

impl Metric {
    /// All built-in metrics
    pub const ALL: [Metric; 4] = [Metric::Rmse, Metric::Mse, Metric::Mae, Metric::R2];

    fn as_str(&self) -> &'static str {
        match self {
            Metric::Rmse => "rmse",
            Metric::Mse => "mse",
            Metric::Mae => "mae",
            Metric::R2 => "r2",
        }
    }
}

impl Loss for Metric {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn loss(&self, y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
        match self {
            Metric::Rmse => mse(y_true, y_pred).sqrt(),
            Metric::Mse => mse(y_true, y_pred),
            Metric::Mae => mae(y_true, y_pred),
            Metric::R2 => r2(y_true, y_pred),
        }
    }

    fn smaller_is_better(&self) -> bool {
        !matches!(self, Metric::R2)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = InterpretError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rmse" => Ok(Metric::Rmse),
            "mse" => Ok(Metric::Mse),
            "mae" => Ok(Metric::Mae),
            "r2" | "rsq" | "rsquared" => Ok(Metric::R2),
            other => Err(InterpretError::InvalidConfig(format!(
                "unknown metric '{}' (expected rmse, mse, mae or r2)",
                other
            ))),
        }
    }
}

fn mse(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
    let n = y_true.len() as f64;
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n
}

fn mae(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
    let n = y_true.len() as f64;
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / n
}

fn r2(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> f64 {
    let n = y_true.len() as f64;
    let y_mean = y_true.sum() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    }
}
