use crate::domain::model::BenchStats;
use crate::utils::error::{AdapterError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Written by the fuzzer into its output directory.
pub const STATS_FILE: &str = "chart_stat.json";

/// 從 fuzzer 的統計 JSON 取出第一個 speed 值
pub fn parse_stats(content: &str) -> Result<BenchStats> {
    let document: Value = serde_json::from_str(content)?;

    let speed = document
        .get("speed")
        .and_then(Value::as_array)
        .ok_or_else(|| AdapterError::InvalidStatsError {
            reason: "missing \"speed\" array".to_string(),
        })?;

    let first = speed.first().ok_or_else(|| AdapterError::InvalidStatsError {
        reason: "\"speed\" array is empty".to_string(),
    })?;

    let execs_per_sec = match first {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite())
    .ok_or_else(|| AdapterError::InvalidStatsError {
        reason: format!("speed value {} is not a number", first),
    })?;

    Ok(BenchStats { execs_per_sec })
}

pub fn read_stats(output_corpus: &Path) -> Result<BenchStats> {
    let path = output_corpus.join(STATS_FILE);
    if !path.is_file() {
        return Err(AdapterError::MissingFileError { path });
    }
    parse_stats(&fs::read_to_string(&path)?)
}

/// Stats in the shape the benchmarking harness expects. The fuzzer log is
/// not consulted.
pub fn get_stats(output_corpus: &Path, _fuzzer_log: Option<&Path>) -> Result<String> {
    let stats = read_stats(output_corpus)?;
    tracing::debug!("execs_per_sec = {}", stats.execs_per_sec);
    Ok(serde_json::to_string(&stats)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_speed_value_is_used() {
        let stats = parse_stats(r#"{"speed": [153, 120, 98], "density": [0.1]}"#).unwrap();
        assert_eq!(stats.execs_per_sec, 153.0);
    }

    #[test]
    fn test_float_and_string_speed() {
        assert_eq!(parse_stats(r#"{"speed": [12.5]}"#).unwrap().execs_per_sec, 12.5);
        assert_eq!(parse_stats(r#"{"speed": ["42"]}"#).unwrap().execs_per_sec, 42.0);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            parse_stats(r#"{"density": [1]}"#),
            Err(AdapterError::InvalidStatsError { .. })
        ));
        assert!(matches!(
            parse_stats(r#"{"speed": []}"#),
            Err(AdapterError::InvalidStatsError { .. })
        ));
        assert!(matches!(
            parse_stats(r#"{"speed": [null]}"#),
            Err(AdapterError::InvalidStatsError { .. })
        ));
        for speed in [r#""inf""#, r#""nan""#, r#""1e400""#] {
            assert!(matches!(
                parse_stats(&format!(r#"{{"speed": [{}]}}"#, speed)),
                Err(AdapterError::InvalidStatsError { .. })
            ));
        }
        assert!(matches!(
            parse_stats("not json"),
            Err(AdapterError::SerializationError(_))
        ));
    }

    #[test]
    fn test_get_stats_output_shape() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(STATS_FILE), r#"{"speed": [250]}"#).unwrap();

        let output = get_stats(temp_dir.path(), None).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value, serde_json::json!({"execs_per_sec": 250.0}));
    }

    #[test]
    fn test_get_stats_without_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            get_stats(temp_dir.path(), None),
            Err(AdapterError::MissingFileError { .. })
        ));
    }
}
