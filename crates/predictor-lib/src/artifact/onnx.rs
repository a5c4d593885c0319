//! ONNX inference using tract
//!
//! Runs regressors exported to ONNX (for example with skl2onnx). The graph
//! takes a single `[1, n_features]` float32 input and the first value of the
//! first output is the predicted score.

use super::Regressor;
use crate::error::InferenceError;
use anyhow::Context;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-backed point-estimate regressor
pub struct OnnxRegressor {
    plan: TractModel,
    n_features: usize,
}

impl OnnxRegressor {
    /// Parse and optimize an ONNX model from bytes
    pub fn from_bytes(model_bytes: &[u8], n_features: usize) -> TractResult<Self> {
        let plan = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, n_features]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(Self { plan, n_features })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    fn row_to_tensor(&self, row: &[f64]) -> Result<Tensor, InferenceError> {
        let data: Vec<f32> = row.iter().map(|v| *v as f32).collect();
        tract_ndarray::Array2::from_shape_vec((1, self.n_features), data)
            .map(Into::into)
            .map_err(|e| InferenceError::Backend(e.to_string()))
    }
}

impl Regressor for OnnxRegressor {
    fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        if row.len() != self.n_features {
            return Err(InferenceError::FeatureCount {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let start = Instant::now();
        let input = self.row_to_tensor(row)?;
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::Backend(e.to_string()))?;
        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::Backend("no output from model".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Backend(e.to_string()))?;
        let value = view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| InferenceError::Backend("empty model output".to_string()))?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(
                elapsed_ms = elapsed.as_millis(),
                "Inference exceeded {}ms target",
                MAX_INFERENCE_MS
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(f64::from(value))
    }
}
