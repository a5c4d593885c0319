//! Prediction output formatting and post-processing
//!
//! Handles conversion of raw model outputs to a PredictionResult with
//! score clamping, rounding and confidence scoring.

use crate::models::{FeatureRecord, ModelInfo, PredictionResult};

/// Lowest reportable assessment score
pub const MIN_SCORE: f64 = 0.0;

/// Highest reportable assessment score
pub const MAX_SCORE: f64 = 100.0;

/// Confidence reported for models without sub-estimators
pub const DEFAULT_CONFIDENCE: f64 = 85.0;

/// Confidence points lost per unit of sub-estimator standard deviation
pub const CONFIDENCE_PER_STDDEV: f64 = 10.0;

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Decimal places kept on the predicted score
    pub score_decimals: i32,
    /// Decimal places kept on the confidence
    pub confidence_decimals: i32,
    /// Confidence used when the model has no ensemble signal
    pub default_confidence: f64,
    /// Linear confidence penalty per unit of standard deviation
    pub confidence_per_stddev: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            score_decimals: 2,
            confidence_decimals: 1,
            default_confidence: DEFAULT_CONFIDENCE,
            confidence_per_stddev: CONFIDENCE_PER_STDDEV,
        }
    }
}

/// Formats raw model outputs into a PredictionResult
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    config: OutputConfig,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self {
            config: OutputConfig::default(),
        }
    }

    pub fn with_config(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Shape a result from a raw score and an unrounded confidence
    pub fn format(
        &self,
        raw_score: f64,
        confidence: f64,
        input_features: FeatureRecord,
        model_info: ModelInfo,
    ) -> PredictionResult {
        PredictionResult {
            predicted_assessment_score: round_to(
                clamp_score(raw_score),
                self.config.score_decimals,
            ),
            confidence: round_to(confidence.max(0.0), self.config.confidence_decimals),
            input_features,
            model_info,
            student_index: None,
        }
    }

    /// Confidence from sub-estimator disagreement: `max(0, 100 - k * stddev)`
    pub fn ensemble_confidence(&self, member_predictions: &[f64]) -> f64 {
        let spread = population_std_dev(member_predictions);
        (100.0 - self.config.confidence_per_stddev * spread).max(0.0)
    }

    pub fn default_confidence(&self) -> f64 {
        self.config.default_confidence
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp a raw score into the reportable range
pub fn clamp_score(raw: f64) -> f64 {
    raw.clamp(MIN_SCORE, MAX_SCORE)
}

/// Round to `decimals` places, ties to even
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Population standard deviation (divides by n)
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / n).sqrt()
}
