//! Student Performance Predictor CLI
//!
//! Scores a single student record or a batch of records against a trained
//! model and prints the results as JSON.

mod input;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use input::PredictionInput;
use predictor_lib::{PredictorConfig, PredictorMetrics, StudentPredictor};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Student Performance Predictor CLI
#[derive(Parser)]
#[command(name = "spp")]
#[command(author, version, about = "Predict student assessment scores from cognitive metrics", long_about = None)]
pub struct Cli {
    /// JSON record or array of records, inline or as a path to a JSON file
    pub input: String,

    /// Write results as indented JSON to this file instead of stdout
    pub output: Option<PathBuf>,

    /// Path to the model artifact (.json or .onnx)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Path to the model metadata record
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Score batch records in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output format for feature importance
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Emit logs as JSON
    #[arg(long, env = "PREDICTOR_LOG_JSON")]
    pub log_json: bool,

    /// Write Prometheus metrics to this file after the run
    #[arg(long)]
    pub metrics_out: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of file/environment configuration
    fn resolve_config(&self) -> Result<PredictorConfig> {
        let mut config = PredictorConfig::load().context("Failed to load predictor configuration")?;
        if let Some(model) = &self.model {
            config.model_path = model.clone();
        }
        if let Some(metadata) = &self.metadata {
            config.metadata_path = Some(metadata.clone());
        }
        config.parallel_batch |= self.parallel;
        Ok(config)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = cli.resolve_config()?;
    let predictor = StudentPredictor::load(&config)
        .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?;

    let input = input::read_input(&cli.input)?;
    let results = match input {
        PredictionInput::Batch(records) => {
            let results = predictor.predict_batch(&records);
            output::print_info(&format!(
                "Batch prediction completed for {} students",
                results.len()
            ));
            results
        }
        PredictionInput::Single(record) => predictor.predict(&record).into_iter().collect(),
    };

    let importance = predictor.feature_importance();
    match &cli.output {
        Some(path) => {
            output::write_results(path, &results)?;
            output::print_success(&format!("Results saved to {}", path.display()));
            output::print_importance(importance.as_ref(), cli.format)?;
        }
        None => output::print_report(&results, importance.as_ref(), cli.format)?,
    }

    if let Some(path) = &cli.metrics_out {
        let text = PredictorMetrics::new()
            .render()
            .context("Failed to render metrics")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
        info!(path = %path.display(), "Metrics written");
    }

    Ok(())
}
