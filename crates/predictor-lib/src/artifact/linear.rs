//! Ordinary linear regression

use super::Regressor;
use crate::error::InferenceError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl Regressor for LinearRegression {
    fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        if row.len() != self.coefficients.len() {
            return Err(InferenceError::FeatureCount {
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }
        let dot: f64 = self.coefficients.iter().zip(row).map(|(w, x)| w * x).sum();
        Ok(dot + self.intercept)
    }
}
