//! Integration tests for loading artifacts from disk and predicting with them

use predictor_lib::{
    artifact::compute_checksum, ArtifactError, FeatureRecord, ModelLoader, PredictorConfig,
    StudentPredictor,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_json(dir: &TempDir, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
    path
}

fn forest_artifact() -> serde_json::Value {
    // Two stumps on comprehension (index 0) and one constant tree
    json!({
        "kind": "random_forest",
        "trees": [
            {"split": {"feature": 0, "threshold": 70.0,
                "left": {"leaf": {"value": 62.0}},
                "right": {"leaf": {"value": 84.0}}}},
            {"split": {"feature": 0, "threshold": 80.0,
                "left": {"leaf": {"value": 78.0}},
                "right": {"leaf": {"value": 90.0}}}},
            {"leaf": {"value": 81.0}}
        ],
        "feature_importances": [0.41234, 0.2, 0.17, 0.12, 0.09766]
    })
}

fn model_info() -> serde_json::Value {
    json!({
        "features": ["comprehension", "attention", "focus", "retention", "engagement_time"],
        "model_type": "RandomForestRegressor",
        "performance": {"r2": 0.874, "rmse": 4.91}
    })
}

fn student() -> FeatureRecord {
    serde_json::from_value(json!({
        "comprehension": 75.5,
        "attention": 82.0,
        "focus": 78.4,
        "retention": 80.1,
        "engagement_time": 150
    }))
    .unwrap()
}

#[test]
fn test_forest_from_disk() {
    let dir = TempDir::new().unwrap();
    let model = write_json(&dir, "final_model.json", forest_artifact());
    let metadata = write_json(&dir, "model_info.json", model_info());

    let predictor = StudentPredictor::from_paths(&model, Some(metadata.as_path())).unwrap();
    assert_eq!(predictor.model().kind(), "ensemble");
    assert_eq!(predictor.model_type(), "RandomForestRegressor");

    let result = predictor.predict(&student()).unwrap();
    // members: 84, 78, 81 -> mean 81, population stddev sqrt(6)
    assert_eq!(result.predicted_assessment_score, 81.0);
    assert_eq!(result.confidence, 75.5);
    assert_eq!(result.model_info.model_type, "RandomForestRegressor");

    let importance = predictor.feature_importance().unwrap();
    assert_eq!(importance["comprehension"], 0.4123);
    assert_eq!(importance["engagement_time"], 0.0977);
}

#[test]
fn test_linear_without_metadata() {
    let dir = TempDir::new().unwrap();
    let model = write_json(
        &dir,
        "final_model.json",
        json!({
            "kind": "linear_regression",
            "coefficients": [0.3, 0.25, 0.25, 0.2, 0.0],
            "intercept": 0.0
        }),
    );

    let metadata = dir.path().join("model_info.json");
    let predictor = StudentPredictor::from_paths(&model, Some(metadata.as_path())).unwrap();
    assert!(predictor.metadata().is_none());
    assert!(predictor.feature_importance().is_none());

    let result = predictor.predict(&student()).unwrap();
    // 22.65 + 20.5 + 19.6 + 16.02
    assert_eq!(result.predicted_assessment_score, 78.77);
    assert_eq!(result.confidence, 85.0);
    assert_eq!(result.model_info.model_type, "Unknown");
}

#[test]
fn test_load_from_config() {
    let dir = TempDir::new().unwrap();
    let model = write_json(&dir, "final_model.json", forest_artifact());
    let metadata = write_json(&dir, "model_info.json", model_info());
    let config = PredictorConfig {
        model_path: model,
        metadata_path: Some(metadata),
        parallel_batch: true,
    };

    let predictor = StudentPredictor::load(&config).unwrap();
    let batch = vec![student(), FeatureRecord::new().with("student_id", "X"), student()];
    let results = predictor.predict_batch(&batch);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].student_index, Some(0));
    assert_eq!(results[1].student_index, Some(2));
}

#[test]
fn test_checksum_guards_model() {
    let dir = TempDir::new().unwrap();
    let model = write_json(&dir, "final_model.json", forest_artifact());
    let mut info = model_info();
    info["model_sha256"] = json!(compute_checksum(&fs::read(&model).unwrap()));
    let metadata = write_json(&dir, "model_info.json", info);
    assert!(StudentPredictor::from_paths(&model, Some(metadata.as_path())).is_ok());

    // Tamper with the artifact after the checksum was recorded
    write_json(
        &dir,
        "final_model.json",
        json!({"kind": "random_forest", "trees": [{"leaf": {"value": 100.0}}]}),
    );
    let err = StudentPredictor::from_paths(&model, Some(metadata.as_path())).unwrap_err();
    assert!(matches!(err, ArtifactError::ChecksumMismatch { .. }));
}

#[test]
fn test_missing_model_names_path() {
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("final_model.json");
    let err = StudentPredictor::from_paths(&model, None).unwrap_err();
    assert!(err.to_string().contains("final_model.json"));
}

fn onnx_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/linear_regressor.onnx")
}

#[test]
fn test_onnx_model_through_loader() {
    let loaded = ModelLoader::new(onnx_fixture()).load().unwrap();
    assert_eq!(loaded.model.kind(), "point_estimate");
    assert_eq!(loaded.feature_order.len(), 5);

    let predictor = StudentPredictor::from_paths(&onnx_fixture(), None).unwrap();
    let record: FeatureRecord = serde_json::from_value(json!({
        "comprehension": 80,
        "attention": 60,
        "focus": 72,
        "retention": 64,
        "engagement_time": 120
    }))
    .unwrap();

    let result = predictor.predict(&record).unwrap();
    assert_eq!(result.predicted_assessment_score, 73.0);
    assert_eq!(result.confidence, 85.0);
    assert_eq!(result.model_info.model_type, "Unknown");
    assert!(predictor.feature_importance().is_none());
}

#[test]
fn test_onnx_with_checksummed_metadata() {
    let dir = TempDir::new().unwrap();
    let bytes = fs::read(onnx_fixture()).unwrap();
    let model = dir.path().join("final_model.onnx");
    fs::write(&model, &bytes).unwrap();
    let mut info = model_info();
    info["model_type"] = json!("LinearRegression");
    info["model_sha256"] = json!(compute_checksum(&bytes));
    let metadata = write_json(&dir, "model_info.json", info);

    let predictor = StudentPredictor::from_paths(&model, Some(metadata.as_path())).unwrap();
    let result = predictor.predict(&student()).unwrap();
    assert_eq!(result.confidence, 85.0);
    assert_eq!(result.model_info.model_type, "LinearRegression");
}

#[test]
fn test_onnx_width_must_match_feature_order() {
    let dir = TempDir::new().unwrap();
    let metadata = write_json(
        &dir,
        "model_info.json",
        json!({
            "features": ["comprehension", "attention", "focus"],
            "model_type": "LinearRegression",
            "performance": {"r2": 0.9}
        }),
    );

    let err = StudentPredictor::from_paths(&onnx_fixture(), Some(metadata.as_path())).unwrap_err();
    assert!(matches!(err, ArtifactError::Onnx { .. }));
}
