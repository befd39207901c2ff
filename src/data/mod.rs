//! Tabular data handed to the interpretation routines
//!
//! A [`Dataset`] is an immutable, non-empty table of finite numeric values
//! addressed by column name. Rows are exposed to predictors as borrowed
//! [`Row`] views.

mod dataset;
mod loader;

pub use dataset::{ColumnSummary, Dataset, Row};
pub use loader::{load_dataframe, load_dataset};
