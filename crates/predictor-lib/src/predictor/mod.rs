//! Student performance prediction engine

mod batch;
mod diagnostics;
mod engine;
mod output;
mod validator;


pub use batch::{BatchFailure, BatchReport};
pub use diagnostics::{ranked, FeatureImportance, IMPORTANCE_DECIMALS};
pub use engine::StudentPredictor;
pub use output::{
    clamp_score, population_std_dev, round_to, OutputConfig, OutputFormatter,
    CONFIDENCE_PER_STDDEV, DEFAULT_CONFIDENCE, MAX_SCORE, MIN_SCORE,
};
pub use validator::{
    expected_range, validate, InputValidator, RangeWarning, ENGAGEMENT_FEATURE, ENGAGEMENT_RANGE,
    SKILL_RANGE,
};
