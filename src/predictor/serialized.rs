//! Read-only serialized models
//!
//! Models are stored as tagged JSON documents:
//!
//! ```json
//! {"type": "linear", "intercept": 0.5, "coefficients": {"x": 2.0}}
//! {"type": "tree_ensemble", "base_score": 0.0, "trees": [
//!     {"feature": "x", "threshold": 2.5, "left": {"leaf": 1.0}, "right": {"leaf": 3.0}}
//! ]}
//! ```

use super::Predictor;
use crate::data::Row;
use crate::error::{InterpretError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A model loaded from disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SerializedModel {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl SerializedModel {
    /// Parse a model from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a model from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Names of every feature the model reads
    pub fn feature_names(&self) -> BTreeSet<String> {
        match self {
            SerializedModel::Linear(model) => model.coefficients.keys().cloned().collect(),
            SerializedModel::TreeEnsemble(model) => {
                let mut names = BTreeSet::new();
                for tree in &model.trees {
                    tree.collect_features(&mut names);
                }
                names
            }
        }
    }
}

impl Predictor for SerializedModel {
    fn predict(&self, row: &Row<'_>) -> Result<f64> {
        match self {
            SerializedModel::Linear(model) => model.predict(row),
            SerializedModel::TreeEnsemble(model) => model.predict(row),
        }
    }
}

/// Linear regression: `intercept + Σ coefficient * value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default)]
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: BTreeMap<String, f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }
}

impl Predictor for LinearModel {
    fn predict(&self, row: &Row<'_>) -> Result<f64> {
        self.coefficients
            .iter()
            .try_fold(self.intercept, |acc, (name, coef)| -> Result<f64> {
                Ok(acc + coef * feature_value(row, name)?)
            })
    }
}

/// Additive ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<TreeNode>,
}

impl Predictor for TreeEnsemble {
    fn predict(&self, row: &Row<'_>) -> Result<f64> {
        self.trees
            .iter()
            .try_fold(self.base_score, |acc, tree| -> Result<f64> {
                Ok(acc + tree.evaluate(row)?)
            })
    }
}

/// Regression tree node; rows with `value <= threshold` go left
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf {
        leaf: f64,
    },
    Split {
        feature: String,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Walk the tree for one row
    pub fn evaluate(&self, row: &Row<'_>) -> Result<f64> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { leaf } => return Ok(*leaf),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if feature_value(row, feature)? <= *threshold {
                        &**left
                    } else {
                        &**right
                    };
                }
            }
        }
    }

    fn collect_features(&self, names: &mut BTreeSet<String>) {
        if let TreeNode::Split {
            feature,
            left,
            right,
            ..
        } = self
        {
            names.insert(feature.clone());
            left.collect_features(names);
            right.collect_features(names);
        }
    }
}

fn feature_value(row: &Row<'_>, name: &str) -> Result<f64> {
    row.get(name).ok_or_else(|| {
        InterpretError::PredictionFailure(format!("model expects feature '{}'", name))
    })
}
