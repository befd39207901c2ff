//! Dataset and row views

use crate::error::{InterpretError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use polars::prelude::{DataFrame, DataType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Column names and their positions, shared between a dataset and its copies
#[derive(Debug, PartialEq)]
struct Schema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    fn new(names: Vec<String>) -> Result<Self> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(InterpretError::DataError(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
        }
        Ok(Self { names, index })
    }
}

/// Immutable table of named numeric columns
///
/// Every row carries the same set of columns and every value is finite.
/// Copies produced by the interpretation routines share the column schema
/// and own their values.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: Arc<Schema>,
    values: Array2<f64>,
}

impl Dataset {
    /// Create a dataset from column names and a `(n_rows, n_columns)` matrix
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if values.nrows() == 0 {
            return Err(InterpretError::InvalidConfig(
                "dataset must contain at least one row".to_string(),
            ));
        }
        if names.len() != values.ncols() {
            return Err(InterpretError::ShapeError {
                expected: format!("{} columns", names.len()),
                actual: format!("{} columns", values.ncols()),
            });
        }

        for ((row, col), value) in values.indexed_iter() {
            if !value.is_finite() {
                return Err(InterpretError::DataError(format!(
                    "non-finite value {} in column '{}' at row {}",
                    value, names[col], row
                )));
            }
        }

        Ok(Self {
            schema: Arc::new(Schema::new(names)?),
            values,
        })
    }

    /// Create a dataset from row records
    ///
    /// Column order follows the sorted keys of the first record. Every other
    /// record must carry exactly the same keys.
    pub fn from_records<I, R, K>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let records: Vec<BTreeMap<String, f64>> = records
            .into_iter()
            .map(|r| r.into_iter().map(|(k, v)| (k.into(), v)).collect())
            .collect();

        let first = records.first().ok_or_else(|| {
            InterpretError::InvalidConfig("dataset must contain at least one row".to_string())
        })?;
        let names: Vec<String> = first.keys().cloned().collect();

        let mut data = Vec::with_capacity(records.len() * names.len());
        for (i, record) in records.iter().enumerate() {
            if let Some(extra) = record.keys().find(|k| !first.contains_key(*k)) {
                return Err(InterpretError::InvalidFeature(format!(
                    "row {} has unexpected column '{}'",
                    i, extra
                )));
            }
            for name in &names {
                let value = record.get(name).ok_or_else(|| {
                    InterpretError::InvalidFeature(format!(
                        "row {} is missing column '{}'",
                        i, name
                    ))
                })?;
                data.push(*value);
            }
        }

        let values = Array2::from_shape_vec((records.len(), names.len()), data)?;
        Self::new(names, values)
    }

    /// Create a dataset from a polars `DataFrame`, casting every column to `f64`
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut values = Array2::<f64>::zeros((df.height(), names.len()));
        for (j, name) in names.iter().enumerate() {
            let column = df.column(name)?.cast(&DataType::Float64).map_err(|e| {
                InterpretError::DataError(format!("column '{}' is not numeric: {}", name, e))
            })?;
            for (i, value) in column.f64()?.into_iter().enumerate() {
                values[[i, j]] = value.ok_or_else(|| {
                    InterpretError::DataError(format!(
                        "column '{}' has a missing or non-numeric value at row {}",
                        name, i
                    ))
                })?;
            }
        }

        Self::new(names, values)
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns
    pub fn n_columns(&self) -> usize {
        self.values.ncols()
    }

    /// Column names in storage order
    pub fn column_names(&self) -> &[String] {
        &self.schema.names
    }

    /// Whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.schema.index.contains_key(name)
    }

    /// Position of a column, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.index.get(name).copied()
    }

    /// Position of a feature column, failing with `InvalidFeature` when absent
    pub fn feature_index(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            InterpretError::InvalidFeature(format!("column '{}' not found in dataset", name))
        })
    }

    /// Values of one column
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        let idx = self.feature_index(name)?;
        Ok(self.values.column(idx))
    }

    /// Underlying `(n_rows, n_columns)` matrix
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Row view at `index`
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.n_rows()).then(|| Row {
            schema: &self.schema,
            values: self.values.row(index),
        })
    }

    /// Iterate over all rows in order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.values.rows().into_iter().map(move |values| Row {
            schema: &self.schema,
            values,
        })
    }

    /// Observed `(min, max)` of a column
    pub fn column_range(&self, name: &str) -> Result<(f64, f64)> {
        let column = self.column(name)?;
        Ok(column
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            }))
    }

    /// Copy with every value of column `index` replaced by `value`
    pub(crate) fn with_constant_column(&self, index: usize, value: f64) -> Self {
        let mut values = self.values.clone();
        values.column_mut(index).fill(value);
        Self {
            schema: Arc::clone(&self.schema),
            values,
        }
    }

    /// Copy with column `index` replaced by `column`
    pub(crate) fn with_column(&self, index: usize, column: &Array1<f64>) -> Self {
        let mut values = self.values.clone();
        values.column_mut(index).assign(column);
        Self {
            schema: Arc::clone(&self.schema),
            values,
        }
    }

    /// Copy holding only the rows at `indices`, in the given order
    pub(crate) fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            values: self.values.select(Axis(0), indices),
        }
    }

    /// Per-column min, max and mean
    pub fn summary(&self) -> Vec<ColumnSummary> {
        let n = self.n_rows() as f64;
        self.schema
            .names
            .iter()
            .zip(self.values.columns())
            .map(|(name, column)| {
                let (min, max) = column
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    });
                ColumnSummary {
                    name: name.clone(),
                    min,
                    max,
                    mean: column.sum() / n,
                }
            })
            .collect()
    }
}

/// Summary statistics of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Borrowed view of a single dataset row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    schema: &'a Schema,
    values: ArrayView1<'a, f64>,
}

impl<'a> Row<'a> {
    /// Value of a column, if present
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.index.get(name).map(|&i| self.values[i])
    }

    /// Value of a column, failing with `InvalidFeature` when absent
    pub fn value(&self, name: &str) -> Result<f64> {
        self.get(name).ok_or_else(|| {
            InterpretError::InvalidFeature(format!("column '{}' not found in row", name))
        })
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        let schema: &'a Schema = self.schema;
        let values = self.values;
        schema
            .names
            .iter()
            .zip(values.into_iter())
            .map(|(name, &value)| (name.as_str(), value))
    }

    /// Raw values in column order
    pub fn values(&self) -> ArrayView1<'a, f64> {
        self.values
    }

    /// Owned copy of the row as a name → value map
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use polars::df;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_empty() {
        let result = Dataset::new(vec!["a".to_string()], Array2::zeros((0, 1)));
        assert!(matches!(result, Err(InterpretError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_rejects_shape_mismatch() {
        let result = Dataset::new(vec!["a".to_string()], array![[1.0, 2.0]]);
        assert!(matches!(result, Err(InterpretError::ShapeError { .. })));
    }

    #[test]
    fn test_new_rejects_duplicates_and_nan() {
        let dup = Dataset::new(vec!["a".to_string(), "a".to_string()], array![[1.0, 2.0]]);
        assert!(matches!(dup, Err(InterpretError::DataError(_))));

        let nan = Dataset::new(vec!["a".to_string()], array![[f64::NAN]]);
        assert!(matches!(nan, Err(InterpretError::DataError(_))));
    }

    #[test]
    fn test_from_records() {
        let ds = Dataset::from_records(vec![
            vec![("y", 10.0), ("x", 1.0)],
            vec![("x", 2.0), ("y", 20.0)],
        ])
        .unwrap();

        assert_eq!(ds.column_names(), &["x".to_string(), "y".to_string()]);
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.row(1).unwrap().get("y"), Some(20.0));
    }

    #[test]
    fn test_from_records_mismatched_keys() {
        let missing = Dataset::from_records(vec![
            vec![("x", 1.0), ("y", 10.0)],
            vec![("x", 2.0)],
        ]);
        assert!(matches!(missing, Err(InterpretError::InvalidFeature(_))));

        let extra = Dataset::from_records(vec![
            vec![("x", 1.0)],
            vec![("x", 2.0), ("z", 3.0)],
        ]);
        assert!(matches!(extra, Err(InterpretError::InvalidFeature(_))));
    }

    #[test]
    fn test_from_records_empty() {
        let records: Vec<Vec<(&str, f64)>> = Vec::new();
        let result = Dataset::from_records(records);
        assert!(matches!(result, Err(InterpretError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_dataframe() {
        let df = df!(
            "x" => &[1.0, 2.0, 3.0],
            "n" => &[1i32, 2, 3]
        )
        .unwrap();

        let ds = Dataset::from_dataframe(&df).unwrap();
        assert_eq!(ds.n_columns(), 2);
        assert_eq!(ds.column("n").unwrap().to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_from_dataframe_rejects_nulls() {
        let df = df!("x" => &[Some(1.0), None, Some(3.0)]).unwrap();
        assert!(matches!(
            Dataset::from_dataframe(&df),
            Err(InterpretError::DataError(_))
        ));
    }

    #[test]
    fn test_row_access() {
        let ds = sample();
        let row = ds.row(0).unwrap();

        assert_eq!(row.value("b").unwrap(), 10.0);
        assert!(matches!(row.value("zzz"), Err(InterpretError::InvalidFeature(_))));
        assert_eq!(row.iter().collect::<Vec<_>>(), vec![("a", 1.0), ("b", 10.0)]);
        assert!(ds.row(3).is_none());
    }

    #[test]
    fn test_column_range_and_copies() {
        let ds = sample();
        assert_eq!(ds.column_range("b").unwrap(), (10.0, 30.0));

        let constant = ds.with_constant_column(0, 7.0);
        assert!(constant.column("a").unwrap().iter().all(|&v| v == 7.0));
        assert_eq!(ds.column("a").unwrap().to_vec(), vec![1.0, 2.0, 3.0]);

        let subset = ds.select_rows(&[2, 0]);
        assert_eq!(subset.column("a").unwrap().to_vec(), vec![3.0, 1.0]);
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        assert_eq!(summary[1].name, "b");
        assert_eq!(summary[1].min, 10.0);
        assert_eq!(summary[1].max, 30.0);
        assert!((summary[1].mean - 20.0).abs() < 1e-12);
    }
}
