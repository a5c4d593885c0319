//! Single-record prediction pipeline
//!
//! validate -> assemble the row in canonical order -> run the model ->
//! derive confidence -> clamp, round and shape the result.

use super::output::OutputFormatter;
use super::validator::InputValidator;
use crate::artifact::{LoadedArtifacts, Model, ModelLoader};
use crate::config::PredictorConfig;
use crate::error::{ArtifactError, InferenceError, PredictionError};
use crate::models::{
    fallback_features, FeatureRecord, ModelInfo, ModelMetadata, PredictionResult,
    UNKNOWN_MODEL_TYPE,
};
use crate::observability::{PredictorMetrics, StructuredLogger};
use std::path::Path;
use std::time::Instant;

/// Predicts assessment scores from a loaded, immutable model
#[derive(Debug)]
pub struct StudentPredictor {
    model: Model,
    metadata: Option<ModelMetadata>,
    feature_order: Vec<String>,
    validator: InputValidator,
    formatter: OutputFormatter,
    metrics: PredictorMetrics,
    pub(super) logger: StructuredLogger,
    pub(super) parallel_batch: bool,
}

impl StudentPredictor {
    /// Build a predictor from configuration
    pub fn load(config: &PredictorConfig) -> Result<Self, ArtifactError> {
        let predictor = Self::from_paths(&config.model_path, config.metadata_path.as_deref())?;
        Ok(predictor.with_parallel_batch(config.parallel_batch))
    }

    /// Load the model artifact and optional metadata from disk
    pub fn from_paths(
        model_path: &Path,
        metadata_path: Option<&Path>,
    ) -> Result<Self, ArtifactError> {
        let mut loader = ModelLoader::new(model_path);
        if let Some(path) = metadata_path {
            loader = loader.with_metadata(path);
        }
        let artifacts = loader.load()?;
        let logger = StructuredLogger::new(model_path.display().to_string());
        Ok(Self::from_artifacts(artifacts, logger))
    }

    /// Wrap an already constructed model
    ///
    /// The feature ordering comes from `metadata` when present, otherwise
    /// from the fallback list.
    pub fn from_parts(model: Model, metadata: Option<ModelMetadata>) -> Self {
        let feature_order = metadata
            .as_ref()
            .map(|m| m.features.clone())
            .unwrap_or_else(fallback_features);
        let artifacts = LoadedArtifacts {
            model,
            metadata,
            feature_order,
        };
        Self::from_artifacts(artifacts, StructuredLogger::new("in-memory"))
    }

    fn from_artifacts(artifacts: LoadedArtifacts, logger: StructuredLogger) -> Self {
        let metrics = PredictorMetrics::new();
        let model_type = artifacts
            .metadata
            .as_ref()
            .map(|m| m.model_type.as_str())
            .unwrap_or(UNKNOWN_MODEL_TYPE);
        metrics.set_model_info(model_type, artifacts.model.kind());

        Self {
            validator: InputValidator::new(artifacts.feature_order.clone()),
            model: artifacts.model,
            metadata: artifacts.metadata,
            feature_order: artifacts.feature_order,
            formatter: OutputFormatter::new(),
            metrics,
            logger,
            parallel_batch: false,
        }
    }

    pub fn with_formatter(mut self, formatter: OutputFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_parallel_batch(mut self, parallel: bool) -> Self {
        self.parallel_batch = parallel;
        self
    }

    /// Feature ordering the model is fed with
    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }

    pub fn model_type(&self) -> &str {
        self.metadata
            .as_ref()
            .map(|m| m.model_type.as_str())
            .unwrap_or(UNKNOWN_MODEL_TYPE)
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_type: self.model_type().to_string(),
            features_used: self.feature_order.clone(),
        }
    }

    /// Check a record against the required features
    pub fn validate(&self, record: &FeatureRecord) -> bool {
        self.validator.is_valid(record)
    }

    /// Predict one record, returning `None` if it was rejected or failed
    pub fn predict(&self, record: &FeatureRecord) -> Option<PredictionResult> {
        self.predict_at(record, None).ok()
    }

    /// Predict one record, reporting why it was rejected or failed
    pub fn try_predict(&self, record: &FeatureRecord) -> Result<PredictionResult, PredictionError> {
        self.predict_at(record, None)
    }

    /// Shared single-record path; `student_index` is set for batch members
    pub(super) fn predict_at(
        &self,
        record: &FeatureRecord,
        student_index: Option<usize>,
    ) -> Result<PredictionResult, PredictionError> {
        let start = Instant::now();

        let warnings = match self.validator.check(record) {
            Ok(warnings) => warnings,
            Err(e) => {
                self.metrics.inc_rejections();
                self.logger.log_rejection(student_index, &e.to_string());
                return Err(e.into());
            }
        };
        for w in &warnings {
            self.metrics.inc_range_warnings();
            self.logger
                .log_range_warning(&w.feature, w.value, *w.expected.start(), *w.expected.end());
        }

        let mut result = match self.score(record) {
            Ok(result) => result,
            Err(e) => {
                self.metrics.inc_prediction_errors();
                self.logger.log_prediction_failure(student_index, &e.to_string());
                return Err(e.into());
            }
        };
        result.student_index = student_index;

        self.metrics.observe_prediction_latency(start.elapsed().as_secs_f64());
        self.metrics.inc_predictions();
        self.logger.log_prediction(
            student_index,
            result.predicted_assessment_score,
            result.confidence,
            &result.model_info.model_type,
        );
        Ok(result)
    }

    fn score(&self, record: &FeatureRecord) -> Result<PredictionResult, InferenceError> {
        let row = self.assemble(record)?;

        // Ensemble members are evaluated once; their mean is the raw score
        let (raw, confidence) = match &self.model {
            Model::Ensemble(ensemble) => {
                let members = ensemble.member_predictions(&row)?;
                if members.is_empty() {
                    return Err(InferenceError::EmptyEnsemble);
                }
                let mean = members.iter().sum::<f64>() / members.len() as f64;
                (mean, self.formatter.ensemble_confidence(&members))
            }
            Model::PointEstimate(model) => {
                (model.predict_row(&row)?, self.formatter.default_confidence())
            }
        };
        if !raw.is_finite() {
            return Err(InferenceError::NonFinite(raw));
        }

        Ok(self
            .formatter
            .format(raw, confidence, record.clone(), self.model_info()))
    }

    /// Build the numeric row in the model's feature ordering
    fn assemble(&self, record: &FeatureRecord) -> Result<Vec<f64>, InferenceError> {
        self.feature_order
            .iter()
            .map(|feature| {
                record
                    .numeric(feature)
                    .ok_or_else(|| InferenceError::Assembly(feature.clone()))
            })
            .collect()
    }
}
