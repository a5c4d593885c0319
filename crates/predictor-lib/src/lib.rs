//! Student performance prediction library
//!
//! This crate provides the core functionality for:
//! - Loading serialized regression models and their metadata
//! - Validating student feature records
//! - Single and batch assessment-score prediction with confidence
//! - Feature importance diagnostics
//! - Configuration and observability

pub mod artifact;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod predictor;

pub use artifact::{Model, ModelLoader};
pub use config::PredictorConfig;
pub use error::{ArtifactError, InferenceError, PredictionError, ValidationError};
pub use models::*;
pub use observability::{PredictorMetrics, StructuredLogger};
pub use predictor::{BatchFailure, BatchReport, StudentPredictor};
