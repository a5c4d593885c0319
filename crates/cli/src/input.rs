//! Reading prediction input from a file or an inline JSON string

use anyhow::{bail, Context, Result};
use predictor_lib::FeatureRecord;
use serde_json::Value;
use std::path::Path;

/// Parsed command-line input
#[derive(Debug)]
pub enum PredictionInput {
    Single(FeatureRecord),
    Batch(Vec<FeatureRecord>),
}

/// Interpret `arg` as a path if it names a file, otherwise as inline JSON
pub fn read_input(arg: &str) -> Result<PredictionInput> {
    let path = Path::new(arg);
    let raw = if path.is_file() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?
    } else {
        arg.to_string()
    };
    parse_input(&raw)
}

pub fn parse_input(raw: &str) -> Result<PredictionInput> {
    let value: Value = serde_json::from_str(raw).context("Invalid JSON format")?;
    match value {
        Value::Object(map) => Ok(PredictionInput::Single(map.into())),
        Value::Array(items) => {
            let records = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(map) => Ok(FeatureRecord::from(map)),
                    other => bail!("Batch entry {} is not a JSON object (got {})", i, other),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(PredictionInput::Batch(records))
        }
        other => bail!("Expected a JSON object or an array of objects, got {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_record() {
        let input = parse_input(r#"{"comprehension": 75, "attention": 80}"#).unwrap();
        match input {
            PredictionInput::Single(record) => assert_eq!(record.numeric("attention"), Some(80.0)),
            other => panic!("expected single record, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_records() {
        let input =
            parse_input(r#"[{"student_id": "TEST001"}, {"student_id": "TEST002"}]"#).unwrap();
        match input {
            PredictionInput::Batch(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[1].student_id().as_deref(), Some("TEST002"));
            }
            other => panic!("expected batch, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_input("{comprehension: 75").unwrap_err();
        assert!(err.to_string().contains("Invalid JSON format"));
    }

    #[test]
    fn test_non_object_batch_entry() {
        assert!(parse_input(r#"[{"focus": 1}, 42]"#).is_err());
        assert!(parse_input("75").is_err());
    }

    #[test]
    fn test_reads_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("students.json");
        std::fs::write(&path, r#"[{"focus": 70}]"#).unwrap();

        let input = read_input(path.to_str().unwrap()).unwrap();
        assert!(matches!(input, PredictionInput::Batch(records) if records.len() == 1));
    }
}
