//! Input validation for feature records
//!
//! Presence and numeric type are hard requirements. Ranges are advisory:
//! an out-of-range value produces a [`RangeWarning`] but the record is
//! still accepted.

use crate::error::ValidationError;
use crate::models::{json_type_name, FeatureRecord};
use std::ops::RangeInclusive;
use tracing::warn;

/// Feature whose expected range is measured in minutes, not percent
pub const ENGAGEMENT_FEATURE: &str = "engagement_time";

/// Typical weekly engagement time in minutes
pub const ENGAGEMENT_RANGE: RangeInclusive<f64> = 30.0..=300.0;

/// Typical range for cognitive skill scores
pub const SKILL_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Expected range for a feature
pub fn expected_range(feature: &str) -> RangeInclusive<f64> {
    if feature == ENGAGEMENT_FEATURE {
        ENGAGEMENT_RANGE
    } else {
        SKILL_RANGE
    }
}

/// A value outside its typical range
#[derive(Debug, Clone, PartialEq)]
pub struct RangeWarning {
    pub feature: String,
    pub value: f64,
    pub expected: RangeInclusive<f64>,
}

/// Validates feature records against a required feature list
#[derive(Debug, Clone)]
pub struct InputValidator {
    required: Vec<String>,
}

impl InputValidator {
    pub fn new(required: Vec<String>) -> Self {
        Self { required }
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Check a record, returning advisory range warnings when it is accepted
    pub fn check(&self, record: &FeatureRecord) -> Result<Vec<RangeWarning>, ValidationError> {
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|feature| !record.contains(feature))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFeatures(missing));
        }

        let mut warnings = Vec::new();
        for feature in &self.required {
            let raw = record
                .get(feature)
                .ok_or_else(|| ValidationError::MissingFeatures(vec![feature.clone()]))?;
            let value = raw.as_f64().ok_or_else(|| ValidationError::NonNumeric {
                feature: feature.clone(),
                found: json_type_name(raw),
            })?;

            let expected = expected_range(feature);
            if !expected.contains(&value) {
                warnings.push(RangeWarning {
                    feature: feature.clone(),
                    value,
                    expected,
                });
            }
        }

        Ok(warnings)
    }

    pub fn is_valid(&self, record: &FeatureRecord) -> bool {
        validate(record, &self.required)
    }
}

/// Validate a record against `required_features`, logging why it fails
///
/// Out-of-range values are logged at warn level but do not invalidate
/// the record.
pub fn validate(record: &FeatureRecord, required_features: &[String]) -> bool {
    let validator = InputValidator::new(required_features.to_vec());
    match validator.check(record) {
        Ok(warnings) => {
            for w in &warnings {
                warn!(
                    feature = %w.feature,
                    value = w.value,
                    "{} value {} is outside typical range ({}-{})",
                    w.feature,
                    w.value,
                    w.expected.start(),
                    w.expected.end()
                );
            }
            true
        }
        Err(e) => {
            warn!(error = %e, "Input validation failed");
            false
        }
    }
}
