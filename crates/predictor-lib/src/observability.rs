//! Observability infrastructure for the predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcome counters, model info)
//! - Structured logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, Encoder, GaugeVec, Histogram,
    IntCounter, TextEncoder,
};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

struct PredictorMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    rejections_total: IntCounter,
    prediction_errors_total: IntCounter,
    range_warnings_total: IntCounter,
    model_info: GaugeVec,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "student_predictor_prediction_latency_seconds",
                "Time spent validating and scoring a single record",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "student_predictor_predictions_total",
                "Total number of predictions generated"
            )
            .expect("Failed to register predictions_total"),

            rejections_total: register_int_counter!(
                "student_predictor_rejections_total",
                "Total number of records rejected by input validation"
            )
            .expect("Failed to register rejections_total"),

            prediction_errors_total: register_int_counter!(
                "student_predictor_prediction_errors_total",
                "Total number of records that failed during inference"
            )
            .expect("Failed to register prediction_errors_total"),

            range_warnings_total: register_int_counter!(
                "student_predictor_range_warnings_total",
                "Total number of feature values outside their expected range"
            )
            .expect("Failed to register range_warnings_total"),

            model_info: register_gauge_vec!(
                "student_predictor_model_info",
                "Information about the currently loaded model",
                &["model_type", "kind"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Predictor metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Debug, Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_rejections(&self) {
        self.inner().rejections_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    pub fn inc_range_warnings(&self) {
        self.inner().range_warnings_total.inc();
    }

    /// Update model info, replacing any previous labels
    pub fn set_model_info(&self, model_type: &str, kind: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[model_type, kind])
            .set(1.0);
    }

    /// Render every registered metric in the Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Structured logger for predictor events
///
/// Every record carries an `event` tag and the `instance` it came from
/// (the model artifact path).
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_model_loaded(
        &self,
        model_type: &str,
        kind: &str,
        n_features: usize,
        r2: Option<f64>,
    ) {
        info!(
            event = "model_loaded",
            instance = %self.instance,
            model_type = %model_type,
            kind = %kind,
            n_features = n_features,
            r2 = ?r2,
            "Model loaded successfully"
        );
    }

    pub fn log_metadata_fallback(&self, path: &Path, reason: &str) {
        warn!(
            event = "metadata_fallback",
            instance = %self.instance,
            path = %path.display(),
            reason = %reason,
            "Model metadata unreadable, using fallback feature ordering"
        );
    }

    pub fn log_range_warning(&self, feature: &str, value: f64, min: f64, max: f64) {
        warn!(
            event = "range_warning",
            instance = %self.instance,
            feature = %feature,
            value = value,
            expected_min = min,
            expected_max = max,
            "Feature value is outside its typical range"
        );
    }

    pub fn log_rejection(&self, student_index: Option<usize>, reason: &str) {
        warn!(
            event = "input_rejected",
            instance = %self.instance,
            student_index = ?student_index,
            reason = %reason,
            "Input record rejected"
        );
    }

    pub fn log_prediction(
        &self,
        student_index: Option<usize>,
        score: f64,
        confidence: f64,
        model_type: &str,
    ) {
        debug!(
            event = "prediction_generated",
            instance = %self.instance,
            student_index = ?student_index,
            score = score,
            confidence = confidence,
            model_type = %model_type,
            "Generated assessment score prediction"
        );
    }

    pub fn log_prediction_failure(&self, student_index: Option<usize>, reason: &str) {
        warn!(
            event = "prediction_failed",
            instance = %self.instance,
            student_index = ?student_index,
            reason = %reason,
            "Error making prediction"
        );
    }

    pub fn log_batch_progress(&self, student_index: usize, total: usize) {
        info!(
            event = "batch_progress",
            instance = %self.instance,
            student = student_index + 1,
            total = total,
            "Processing student {}/{}",
            student_index + 1,
            total
        );
    }

    pub fn log_batch_completed(&self, total: usize, succeeded: usize, failed: usize) {
        info!(
            event = "batch_completed",
            instance = %self.instance,
            total = total,
            succeeded = succeeded,
            failed = failed,
            "Batch prediction completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predictor_metrics_render() {
        let metrics = PredictorMetrics::new();

        metrics.observe_prediction_latency(0.0002);
        metrics.inc_predictions();
        metrics.inc_rejections();
        metrics.inc_range_warnings();
        metrics.set_model_info("RandomForestRegressor", "ensemble");

        let text = metrics.render().unwrap();
        assert!(text.contains("student_predictor_predictions_total"));
        assert!(text.contains("student_predictor_rejections_total"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("models/final_model.json");
        assert_eq!(logger.instance, "models/final_model.json");
    }
}
