//! Model artifacts and their loading
//!
//! A trained model is resolved once, at load time, into a [`Model`]: either
//! an ensemble whose members can be queried individually, or a plain point
//! estimate. Prediction code branches on that tag instead of probing the
//! model on every call.

mod linear;
mod loader;
mod onnx;
mod tree;

pub use linear::LinearRegression;
pub use loader::{
    compute_checksum, LoadedArtifacts, ModelLoader, DEFAULT_METADATA_PATH, DEFAULT_MODEL_PATH,
};
pub use onnx::OnnxRegressor;
pub use tree::{DecisionTree, RandomForest, TreeNode};

use crate::error::{ArtifactError, InferenceError};
use serde::{Deserialize, Serialize};

/// Trait for regression model implementations
pub trait Regressor: Send + Sync {
    /// Predict the score for a single feature row in canonical order
    fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError>;

    /// Per-feature importance weights, aligned with the feature ordering
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }
}

/// Regressor composed of sub-estimators that can be queried individually
///
/// The aggregate prediction is the mean of the member predictions.
pub trait EnsembleRegressor: Regressor {
    fn member_predictions(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// A loaded model, tagged by whether it exposes sub-estimators
pub enum Model {
    Ensemble(Box<dyn EnsembleRegressor>),
    PointEstimate(Box<dyn Regressor>),
}

impl Model {
    pub fn ensemble(model: impl EnsembleRegressor + 'static) -> Self {
        Model::Ensemble(Box::new(model))
    }

    pub fn point(model: impl Regressor + 'static) -> Self {
        Model::PointEstimate(Box::new(model))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Model::Ensemble(_) => "ensemble",
            Model::PointEstimate(_) => "point_estimate",
        }
    }

    pub fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        match self {
            Model::Ensemble(m) => m.predict_row(row),
            Model::PointEstimate(m) => m.predict_row(row),
        }
    }

    pub fn feature_importances(&self) -> Option<&[f64]> {
        match self {
            Model::Ensemble(m) => m.feature_importances(),
            Model::PointEstimate(m) => m.feature_importances(),
        }
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").field("kind", &self.kind()).finish()
    }
}

/// Serialized model document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LinearRegression(LinearRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl ModelArtifact {
    /// Check that the artifact agrees with the feature ordering it will be fed
    pub fn check_shape(&self, n_features: usize) -> Result<(), ArtifactError> {
        match self {
            ModelArtifact::LinearRegression(m) => {
                if m.coefficients.len() != n_features {
                    return Err(ArtifactError::Shape(format!(
                        "linear model has {} coefficients for {} features",
                        m.coefficients.len(),
                        n_features
                    )));
                }
            }
            ModelArtifact::DecisionTree(m) => {
                check_tree(&m.root, n_features)?;
                check_importances(m.feature_importances.as_deref(), n_features)?;
            }
            ModelArtifact::RandomForest(m) => {
                if m.trees.is_empty() {
                    return Err(ArtifactError::Shape("random forest has no trees".to_string()));
                }
                for tree in &m.trees {
                    check_tree(tree, n_features)?;
                }
                check_importances(m.feature_importances.as_deref(), n_features)?;
            }
        }
        Ok(())
    }

    pub fn into_model(self) -> Model {
        match self {
            ModelArtifact::LinearRegression(m) => Model::point(m),
            ModelArtifact::DecisionTree(m) => Model::point(m),
            ModelArtifact::RandomForest(m) => Model::ensemble(m),
        }
    }
}

fn check_tree(tree: &TreeNode, n_features: usize) -> Result<(), ArtifactError> {
    match tree.max_feature_index() {
        Some(idx) if idx >= n_features => Err(ArtifactError::Shape(format!(
            "tree splits on feature index {} but only {} features are declared",
            idx, n_features
        ))),
        _ => Ok(()),
    }
}

fn check_importances(importances: Option<&[f64]>, n_features: usize) -> Result<(), ArtifactError> {
    match importances {
        Some(weights) if weights.len() != n_features => Err(ArtifactError::Shape(format!(
            "{} importance weights for {} features",
            weights.len(),
            n_features
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_artifact_tags() {
        let linear: ModelArtifact = serde_json::from_value(json!({
            "kind": "linear_regression",
            "coefficients": [0.3, 0.25, 0.25, 0.2, 0.0],
            "intercept": 1.5
        }))
        .unwrap();
        assert!(matches!(linear, ModelArtifact::LinearRegression(_)));
        assert_eq!(linear.into_model().kind(), "point_estimate");

        let forest: ModelArtifact = serde_json::from_value(json!({
            "kind": "random_forest",
            "trees": [{"leaf": {"value": 70.0}}],
            "feature_importances": [0.2, 0.2, 0.2, 0.2, 0.2]
        }))
        .unwrap();
        assert_eq!(forest.into_model().kind(), "ensemble");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let parsed: Result<ModelArtifact, _> =
            serde_json::from_value(json!({"kind": "svr", "support_vectors": []}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_shape_checks() {
        let linear = ModelArtifact::LinearRegression(LinearRegression {
            coefficients: vec![1.0; 4],
            intercept: 0.0,
        });
        assert!(matches!(linear.check_shape(5), Err(ArtifactError::Shape(_))));

        let tree = ModelArtifact::DecisionTree(DecisionTree {
            root: TreeNode::split(5, 1.0, TreeNode::leaf(0.0), TreeNode::leaf(1.0)),
            feature_importances: None,
        });
        assert!(tree.check_shape(5).is_err());
        assert!(tree.check_shape(6).is_ok());

        let forest = ModelArtifact::RandomForest(RandomForest {
            trees: vec![TreeNode::leaf(1.0)],
            feature_importances: Some(vec![0.5, 0.5]),
        });
        assert!(forest.check_shape(5).is_err());
        assert!(forest.check_shape(2).is_ok());

        let empty = ModelArtifact::RandomForest(RandomForest {
            trees: vec![],
            feature_importances: None,
        });
        assert!(empty.check_shape(5).is_err());
    }

    #[test]
    fn test_model_delegates_importances() {
        let model = Model::point(DecisionTree {
            root: TreeNode::leaf(1.0),
            feature_importances: Some(vec![0.7, 0.3]),
        });
        assert_eq!(model.feature_importances(), Some(&[0.7, 0.3][..]));
        assert_eq!(model.predict_row(&[0.0, 0.0]).unwrap(), 1.0);
    }
}
