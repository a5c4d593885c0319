//! Predictor configuration

use crate::artifact::{DEFAULT_METADATA_PATH, DEFAULT_MODEL_PATH};
use serde::Deserialize;
use std::path::PathBuf;

/// Optional configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "predictor";

/// Environment variable prefix, e.g. `PREDICTOR_MODEL_PATH`
pub const ENV_PREFIX: &str = "PREDICTOR";

/// Predictor configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictorConfig {
    /// Serialized model artifact (`.json` or `.onnx`)
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Companion metadata record; absence is tolerated
    #[serde(default = "default_metadata_path")]
    pub metadata_path: Option<PathBuf>,

    /// Score batch records on the rayon thread pool
    #[serde(default)]
    pub parallel_batch: bool,
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

fn default_metadata_path() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_METADATA_PATH))
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            metadata_path: default_metadata_path(),
            parallel_batch: false,
        }
    }
}

impl PredictorConfig {
    /// Load configuration from `predictor.toml` (if present) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
