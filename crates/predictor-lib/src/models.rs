//! Core data models for the student performance predictor

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Feature ordering used when no metadata record is available
pub const FALLBACK_FEATURES: [&str; 5] = [
    "comprehension",
    "attention",
    "focus",
    "retention",
    "engagement_time",
];

/// Model type label reported when metadata is absent
pub const UNKNOWN_MODEL_TYPE: &str = "Unknown";

/// Caller-supplied identifier carried alongside batch records
pub const STUDENT_ID_KEY: &str = "student_id";

/// Feature record for a single student
///
/// Values are kept as raw JSON so that the record can be echoed back
/// verbatim and so that non-numeric inputs reach the validator instead of
/// failing at deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord(Map<String, Value>);

impl FeatureRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert, mostly useful for tests and fixtures
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric value of a feature, if present and a JSON number
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    /// Caller-side identifier, rendered as a string when it is a string or number
    pub fn student_id(&self) -> Option<String> {
        match self.0.get(STUDENT_ID_KEY)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for FeatureRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Model information echoed in every prediction result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub features_used: Vec<String>,
}

/// Prediction output for one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Score bounded to [0, 100], rounded to 2 decimals
    pub predicted_assessment_score: f64,
    /// Confidence percentage, rounded to 1 decimal
    pub confidence: f64,
    pub input_features: FeatureRecord,
    pub model_info: ModelInfo,
    /// Zero-based position in the submitted batch (batch results only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_index: Option<usize>,
}

/// Training performance recorded alongside the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub r2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mae: Option<f64>,
}

/// Companion metadata record for a model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Feature ordering the model was trained with
    pub features: Vec<String>,
    pub model_type: String,
    pub performance: ModelPerformance,
    /// Hex-encoded SHA-256 of the model artifact bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_sha256: Option<String>,
}

/// Name of the JSON type of a value, for diagnostics
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn fallback_features() -> Vec<String> {
    FALLBACK_FEATURES.iter().map(|f| f.to_string()).collect()
}
