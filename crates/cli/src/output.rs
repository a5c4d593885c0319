//! Output formatting utilities

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use predictor_lib::predictor::{ranked, FeatureImportance};
use predictor_lib::PredictionResult;
use serde_json::{json, Map, Value};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Output format for the feature importance report
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

#[derive(Tabled)]
struct ImportanceRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Importance")]
    importance: String,
}

/// Write results as an indented JSON array
pub fn write_results(path: &Path, results: &[PredictionResult]) -> Result<()> {
    let content = serde_json::to_string_pretty(results).context("Failed to serialize results")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write results to {}", path.display()))
}

/// Print results and feature importance to stdout
///
/// In JSON mode stdout carries a single document with both sections.
pub fn print_report(
    results: &[PredictionResult],
    importance: Option<&FeatureImportance>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", serde_json::to_string_pretty(results)?);
            print_importance(importance, format)
        }
        OutputFormat::Json => {
            let report = json!({
                "results": results,
                "feature_importance": importance.map(ranked_json),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

/// Print feature importances, most important first
pub fn print_importance(
    importance: Option<&FeatureImportance>,
    format: OutputFormat,
) -> Result<()> {
    let Some(importance) = importance else {
        return Ok(());
    };

    match format {
        OutputFormat::Table => {
            let rows: Vec<ImportanceRow> = ranked(importance)
                .into_iter()
                .map(|(feature, weight)| ImportanceRow {
                    feature: feature.to_string(),
                    importance: format!("{:.4}", weight),
                })
                .collect();
            println!();
            println!("{}", "Feature Importance:".bold());
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ranked_json(importance))?);
        }
    }
    Ok(())
}

/// Importances as a JSON object, most important first
fn ranked_json(importance: &FeatureImportance) -> Value {
    ranked(importance)
        .into_iter()
        .map(|(feature, weight)| (feature.to_string(), json!(weight)))
        .collect::<Map<String, Value>>()
        .into()
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}
