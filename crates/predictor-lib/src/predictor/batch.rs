//! Batch prediction
//!
//! Each record goes through the single-record path independently. Failed
//! records are left out of `predict_batch`; every surviving result carries
//! its `student_index` in the submitted batch. `predict_batch_report`
//! additionally lists the failures.

use super::engine::StudentPredictor;
use crate::error::PredictionError;
use crate::models::{FeatureRecord, PredictionResult};
use rayon::prelude::*;
use serde::Serialize;

/// A record that produced no result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub student_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub reason: String,
}

/// Results and failures of a batch, both ordered by `student_index`
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub results: Vec<PredictionResult>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

impl StudentPredictor {
    /// Predict every record, silently omitting the ones that fail
    pub fn predict_batch(&self, records: &[FeatureRecord]) -> Vec<PredictionResult> {
        self.predict_batch_report(records).results
    }

    /// Predict every record and account for the ones that fail
    pub fn predict_batch_report(&self, records: &[FeatureRecord]) -> BatchReport {
        let total = records.len();
        let score = |(index, record): (usize, &FeatureRecord)| {
            self.logger.log_batch_progress(index, total);
            (index, self.predict_at(record, Some(index)))
        };

        // Indexed parallel collect keeps input order
        let outcomes: Vec<(usize, Result<PredictionResult, PredictionError>)> =
            if self.parallel_batch {
                records.par_iter().enumerate().map(score).collect()
            } else {
                records.iter().enumerate().map(score).collect()
            };

        let mut report = BatchReport::default();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(result) => report.results.push(result),
                Err(e) => report.failures.push(BatchFailure {
                    student_index: index,
                    student_id: records[index].student_id(),
                    reason: e.to_string(),
                }),
            }
        }

        self.logger
            .log_batch_completed(total, report.results.len(), report.failures.len());
        report
    }
}
