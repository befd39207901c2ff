//! mlinterpret - Model interpretation for fitted regression models
//!
//! This crate provides two global interpretation techniques over any
//! [`Predictor`](predictor::Predictor):
//! - Partial dependence (PDP) and individual conditional expectation (ICE)
//! - Permutation feature importance
//!
//! # Modules
//!
//! - [`data`] - Immutable named-column datasets and file loading
//! - [`predictor`] - Predictor trait and read-only serialized models
//! - [`metrics`] - Loss functions
//! - [`explainability`] - PDP, ICE and permutation importance
//! - [`config`] - Serializable configuration
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```
//! use mlinterpret::prelude::*;
//!
//! let data = Dataset::from_records(vec![
//!     vec![("x", 1.0), ("y", 10.0)],
//!     vec![("x", 2.0), ("y", 20.0)],
//!     vec![("x", 3.0), ("y", 30.0)],
//! ])?;
//! let model = |row: &Row<'_>| -> Result<f64> { Ok(10.0 * row.value("x")?) };
//!
//! let pdp = PartialDependence::new(PdpConfig::new().with_grid_size(3));
//! let result = pdp.compute(&model, &data, "x")?;
//! assert_eq!(result.average_predictions, vec![10.0, 20.0, 30.0]);
//!
//! let importance = PermutationImportance::new(ImportanceConfig::new().with_seed(7));
//! let scores = importance.compute(&model, &data, "y", &Metric::Rmse, &["x"])?;
//! assert!(scores.get("x").is_some());
//! # Ok::<(), mlinterpret::InterpretError>(())
//! ```

pub mod error;

pub mod config;
pub mod data;
pub mod explainability;
pub mod metrics;
pub mod predictor;
pub mod utils;

pub mod cli;

pub use error::{InterpretError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        ComparisonMode, ExplainConfig, GridStrategy, ImportanceConfig, ParallelConfig, PdpConfig,
    };
    pub use crate::data::{load_dataset, Dataset, Row};
    pub use crate::error::{InterpretError, Result};
    pub use crate::explainability::{
        FeatureImportance, IceResult, ImportanceResult, PartialDependence, PdpResult,
        PermutationImportance,
    };
    pub use crate::metrics::{Loss, Metric};
    pub use crate::predictor::{Predictor, SerializedModel};
}
