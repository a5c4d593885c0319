//! Feature importance diagnostics

use super::engine::StudentPredictor;
use super::output::round_to;
use indexmap::IndexMap;

/// Decimal places kept on importance weights
pub const IMPORTANCE_DECIMALS: i32 = 4;

/// Importance weight per feature, in the model's feature ordering
pub type FeatureImportance = IndexMap<String, f64>;

impl StudentPredictor {
    /// Importance weight per feature, or `None` when the model has none
    pub fn feature_importance(&self) -> Option<FeatureImportance> {
        let weights = self.model().feature_importances()?;
        Some(
            self.feature_order()
                .iter()
                .zip(weights)
                .map(|(feature, weight)| (feature.clone(), round_to(*weight, IMPORTANCE_DECIMALS)))
                .collect(),
        )
    }
}

/// Importances ordered from most to least important; ties keep feature order
pub fn ranked(importance: &FeatureImportance) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = importance
        .iter()
        .map(|(feature, weight)| (feature.as_str(), *weight))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}
