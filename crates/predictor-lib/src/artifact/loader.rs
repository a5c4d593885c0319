//! Model artifact loading
//!
//! Reads the primary model artifact and its optional metadata record,
//! verifies the artifact checksum when the metadata carries one, and
//! resolves the feature ordering the model will be fed with.

use super::{Model, ModelArtifact, OnnxRegressor};
use crate::error::ArtifactError;
use crate::models::{fallback_features, ModelMetadata, UNKNOWN_MODEL_TYPE};
use crate::observability::StructuredLogger;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the model artifact
pub const DEFAULT_MODEL_PATH: &str = "models/final_model.json";

/// Default location of the metadata record
pub const DEFAULT_METADATA_PATH: &str = "models/model_info.json";

/// Everything a predictor needs, loaded once
#[derive(Debug)]
pub struct LoadedArtifacts {
    pub model: Model,
    pub metadata: Option<ModelMetadata>,
    pub feature_order: Vec<String>,
}

/// Loads a model artifact and optional metadata from disk
#[derive(Debug, Clone)]
pub struct ModelLoader {
    model_path: PathBuf,
    metadata_path: Option<PathBuf>,
    logger: StructuredLogger,
}

impl ModelLoader {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        let model_path = model_path.into();
        let logger = StructuredLogger::new(model_path.display().to_string());
        Self {
            model_path,
            metadata_path: None,
            logger,
        }
    }

    pub fn with_metadata(mut self, metadata_path: impl Into<PathBuf>) -> Self {
        self.metadata_path = Some(metadata_path.into());
        self
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Load the model, failing if the primary artifact is absent or corrupt
    pub fn load(&self) -> Result<LoadedArtifacts, ArtifactError> {
        if !self.model_path.is_file() {
            return Err(ArtifactError::ModelNotFound {
                path: self.model_path.clone(),
            });
        }

        let metadata = self
            .metadata_path
            .as_deref()
            .and_then(|path| self.load_metadata(path));
        let feature_order = metadata
            .as_ref()
            .map(|m| m.features.clone())
            .unwrap_or_else(fallback_features);

        let bytes = fs::read(&self.model_path).map_err(|source| ArtifactError::Io {
            path: self.model_path.clone(),
            source,
        })?;

        if let Some(expected) = metadata.as_ref().and_then(|m| m.model_sha256.as_deref()) {
            verify_checksum(&bytes, expected)?;
            debug!(checksum = %expected, "Model checksum validated");
        }

        let model = self.decode(&bytes, feature_order.len())?;

        let model_type = metadata
            .as_ref()
            .map(|m| m.model_type.as_str())
            .unwrap_or(UNKNOWN_MODEL_TYPE);
        self.logger.log_model_loaded(
            model_type,
            model.kind(),
            feature_order.len(),
            metadata.as_ref().map(|m| m.performance.r2),
        );

        Ok(LoadedArtifacts {
            model,
            metadata,
            feature_order,
        })
    }

    fn decode(&self, bytes: &[u8], n_features: usize) -> Result<Model, ArtifactError> {
        if is_onnx(&self.model_path) {
            let regressor = OnnxRegressor::from_bytes(bytes, n_features).map_err(|e| {
                ArtifactError::Onnx {
                    path: self.model_path.clone(),
                    reason: format!("{:#}", e),
                }
            })?;
            return Ok(Model::point(regressor));
        }

        let artifact: ModelArtifact =
            serde_json::from_slice(bytes).map_err(|e| ArtifactError::Decode {
                path: self.model_path.clone(),
                reason: e.to_string(),
            })?;
        artifact.check_shape(n_features)?;
        Ok(artifact.into_model())
    }

    /// Read the metadata record; any problem degrades to the fallback ordering
    fn load_metadata(&self, path: &Path) -> Option<ModelMetadata> {
        if !path.exists() {
            debug!(path = %path.display(), "No metadata record, using fallback feature ordering");
            return None;
        }

        let parsed = fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                serde_json::from_slice::<ModelMetadata>(&bytes).map_err(|e| e.to_string())
            })
            .and_then(|metadata| check_feature_list(&metadata.features).map(|_| metadata));

        match parsed {
            Ok(metadata) => Some(metadata),
            Err(reason) => {
                self.logger.log_metadata_fallback(path, &reason);
                None
            }
        }
    }
}

fn is_onnx(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("onnx"))
        .unwrap_or(false)
}

fn check_feature_list(features: &[String]) -> Result<(), String> {
    if features.is_empty() {
        return Err("metadata declares no features".to_string());
    }
    let mut seen = HashSet::new();
    for feature in features {
        if !seen.insert(feature.as_str()) {
            return Err(format!("feature {} is declared twice", feature));
        }
    }
    Ok(())
}

fn verify_checksum(data: &[u8], expected: &str) -> Result<(), ArtifactError> {
    let actual = compute_checksum(data);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(ArtifactError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}

/// Hex-encoded SHA-256 of the artifact bytes
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
