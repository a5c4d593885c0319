//! Decision tree and random forest regressors
//!
//! Trees are stored as nested split/leaf nodes exported from the training
//! pipeline. A sample goes left when `x[feature] <= threshold`.

use super::{EnsembleRegressor, Regressor};
use crate::error::InferenceError;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64 },
    /// Internal node with split
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn leaf(value: f64) -> Self {
        TreeNode::Leaf { value }
    }

    pub fn split(feature: usize, threshold: f64, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Walk the tree for one sample
    pub fn evaluate(&self, row: &[f64]) -> Result<f64, InferenceError> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = row.get(*feature).ok_or(InferenceError::FeatureCount {
                        expected: feature + 1,
                        actual: row.len(),
                    })?;
                    node = if *x <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Largest feature index referenced by any split
    pub fn max_feature_index(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                feature,
                left,
                right,
                ..
            } => [Some(*feature), left.max_feature_index(), right.max_feature_index()]
                .into_iter()
                .flatten()
                .max(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Single regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub root: TreeNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

impl Regressor for DecisionTree {
    fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        self.root.evaluate(row)
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }
}

/// Bagged ensemble of regression trees; the prediction is the tree mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

impl RandomForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        let predictions = self.member_predictions(row)?;
        if predictions.is_empty() {
            return Err(InferenceError::EmptyEnsemble);
        }
        Ok(predictions.iter().sum::<f64>() / predictions.len() as f64)
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }
}

impl EnsembleRegressor for RandomForest {
    fn member_predictions(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        self.trees.iter().map(|tree| tree.evaluate(row)).collect()
    }
}
