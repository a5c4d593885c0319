//! CLI integration tests

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const STUDENT: &str = r#"{"student_id": "TEST001", "comprehension": 75.5, "attention": 82.0, "focus": 78.4, "retention": 80.1, "engagement_time": 150}"#;

fn write_json(dir: &TempDir, name: &str, value: Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
    path
}

/// Model directory with a small forest and its metadata
fn model_dir() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let model = write_json(
        &dir,
        "final_model.json",
        json!({
            "kind": "random_forest",
            "trees": [
                {"leaf": {"value": 84.0}},
                {"leaf": {"value": 78.0}},
                {"leaf": {"value": 81.0}}
            ],
            "feature_importances": [0.4, 0.2, 0.2, 0.1, 0.1]
        }),
    );
    let metadata = write_json(
        &dir,
        "model_info.json",
        json!({
            "features": ["comprehension", "attention", "focus", "retention", "engagement_time"],
            "model_type": "RandomForestRegressor",
            "performance": {"r2": 0.87}
        }),
    );
    (dir, model, metadata)
}

fn spp(model: &Path, metadata: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_spp"))
        .arg("--model")
        .arg(model)
        .arg("--metadata")
        .arg(metadata)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_spp"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("--model"), "Should show model option");
    assert!(stdout.contains("--parallel"), "Should show parallel option");
}

#[test]
fn test_single_inline_record() {
    let (_dir, model, metadata) = model_dir();
    let output = spp(&model, &metadata, &["--format", "json", STUDENT]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["predicted_assessment_score"], json!(81.0));
    assert_eq!(results[0]["confidence"], json!(75.5));
    assert_eq!(results[0]["model_info"]["model_type"], "RandomForestRegressor");
    assert!(results[0].get("student_index").is_none());
    assert_eq!(report["feature_importance"]["comprehension"], json!(0.4));
}

#[test]
fn test_batch_written_to_file() {
    let (dir, model, metadata) = model_dir();
    let input = write_json(
        &dir,
        "students.json",
        json!([
            serde_json::from_str::<Value>(STUDENT).unwrap(),
            {"student_id": "TEST002", "comprehension": 60},
            serde_json::from_str::<Value>(STUDENT).unwrap()
        ]),
    );
    let results_path = dir.path().join("results.json");

    let output = spp(
        &model,
        &metadata,
        &["--parallel", input.to_str().unwrap(), results_path.to_str().unwrap()],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let content = std::fs::read_to_string(&results_path).unwrap();
    let results: Value = serde_json::from_str(&content).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["student_index"], json!(0));
    assert_eq!(results[1]["student_index"], json!(2));
}

#[test]
fn test_rejected_single_record_gives_empty_array() {
    let (_dir, model, metadata) = model_dir();
    let output = spp(&model, &metadata, &["--format", "json", r#"{"comprehension": "high"}"#]);
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["results"], json!([]));
}

#[test]
fn test_invalid_json_fails() {
    let (_dir, model, metadata) = model_dir();
    let output = spp(&model, &metadata, &["{comprehension: 75"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid JSON format"));
}

#[test]
fn test_missing_model_fails() {
    let (dir, _model, metadata) = model_dir();
    let missing = dir.path().join("absent.json");
    let output = spp(&missing, &metadata, &[STUDENT]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.json"));
}

#[test]
fn test_metrics_written() {
    let (dir, model, metadata) = model_dir();
    let metrics = dir.path().join("metrics.prom");
    let output = spp(
        &model,
        &metadata,
        &["--metrics-out", metrics.to_str().unwrap(), "--format", "json", STUDENT],
    );
    assert!(output.status.success());

    let text = std::fs::read_to_string(&metrics).unwrap();
    assert!(text.contains("predictions_total"));
}
