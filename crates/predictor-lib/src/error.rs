//! Error types for artifact loading, validation and inference

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the model artifact. All of these are fatal.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("model artifact not found: {}", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode model artifact {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("failed to load ONNX model {}: {reason}", path.display())]
    Onnx { path: PathBuf, reason: String },

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("model does not match feature ordering: {0}")]
    Shape(String),
}

/// Reasons a feature record is rejected before inference
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required features: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    #[error("{feature} must be a number, got {found}")]
    NonNumeric { feature: String, found: &'static str },
}

/// Failures while assembling the feature vector or running the model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("feature {0} could not be read as a number")]
    Assembly(String),

    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("model produced a non-finite prediction ({0})")]
    NonFinite(f64),

    #[error("ensemble produced no member predictions")]
    EmptyEnsemble,

    #[error("inference backend failed: {0}")]
    Backend(String),
}

/// Per-record prediction failure; never aborts a batch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("input rejected: {0}")]
    Rejected(#[from] ValidationError),

    #[error("prediction failed: {0}")]
    Inference(#[from] InferenceError),
}
