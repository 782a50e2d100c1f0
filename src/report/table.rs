//! Tabular export of run results
//!
//! One row per question with Japanese column names, the format consumed by
//! the summary and comparison reports. The evaluation column is on a 0-10
//! scale.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::benchmark::RunRecord;

/// File name looked up inside a result directory
pub const BENCHMARK_CSV_NAME: &str = "benchmark_results.csv";

/// Header row, in column order
pub const CSV_HEADERS: [&str; 4] = ["質問番号", "応答時間(秒)", "評価スコア", "応答文字数"];

/// Factor from the keyword ratio (0-1) to the evaluation column (0-10)
pub const RATIO_TO_EVALUATION: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    /// 1-based
    #[serde(rename = "質問番号")]
    pub question_number: usize,
    #[serde(rename = "応答時間(秒)")]
    pub response_time: f64,
    /// 0-10
    #[serde(rename = "評価スコア")]
    pub evaluation_score: f64,
    #[serde(rename = "応答文字数")]
    pub response_length: usize,
}

/// Rows for a Run Record.
///
/// The keyword ratio is rescaled ×10 onto the evaluation column. Length is
/// counted in characters of the extracted answer, so a failed question
/// counts as 0.
pub fn rows_from_record(record: &RunRecord) -> Vec<BenchmarkRow> {
    record
        .questions
        .iter()
        .enumerate()
        .map(|(i, result)| BenchmarkRow {
            question_number: i + 1,
            response_time: result.execution_time,
            evaluation_score: result.score * RATIO_TO_EVALUATION,
            response_length: result.actual_response.chars().count(),
        })
        .collect()
}

pub fn read_rows(path: &Path) -> Result<Vec<BenchmarkRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV: {}", path.display()))?;

    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("{}: bad row {}", path.display(), i + 1)))
        .collect()
}

pub fn write_rows(path: &Path, rows: &[BenchmarkRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Header written explicitly so an empty table still has one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV: {}", path.display()))?;
    writer.write_record(CSV_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::ScoredResult;

    fn result(response: &str, actual: &str, time: f64, score: f64) -> ScoredResult {
        ScoredResult {
            question: "q".to_string(),
            category: None,
            response: response.to_string(),
            actual_response: actual.to_string(),
            execution_time: time,
            score,
            expected_keywords: vec![],
            success: true,
            error: None,
        }
    }

    #[test]
    fn test_rows_from_record() {
        let mut record = RunRecord::new(2, false);
        record.push(result("ルール1\n東京です", "東京です", 1.5, 0.6));
        record.push(result("Error: boom", "", 0.2, 0.0));

        let rows = rows_from_record(&record);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].question_number, 1);
        assert_eq!(rows[0].response_time, 1.5);
        assert!((rows[0].evaluation_score - 6.0).abs() < 1e-9);
        assert_eq!(rows[0].response_length, 4);
        assert_eq!(rows[1].question_number, 2);
        assert_eq!(rows[1].response_length, 0, "error text is not an answer");
    }

    #[test]
    fn test_write_then_read_keeps_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/benchmark_results.csv");
        let rows = vec![
            BenchmarkRow { question_number: 1, response_time: 0.25, evaluation_score: 7.0, response_length: 120 },
            BenchmarkRow { question_number: 2, response_time: 1.5, evaluation_score: 3.5, response_length: 48 },
        ];

        write_rows(&path, &rows).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().next().unwrap(), "質問番号,応答時間(秒),評価スコア,応答文字数");
        assert_eq!(read_rows(&path).unwrap(), rows);
    }

    #[test]
    fn test_write_empty_table_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_rows(&path, &[]).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.trim_end(), CSV_HEADERS.join(","));
        assert!(read_rows(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_integer_scores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("external.csv");
        std::fs::write(&path, "質問番号,応答時間(秒),評価スコア,応答文字数\n1,2.31,8,215\n2,0.9,5,64\n").unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows[0].evaluation_score, 8.0);
        assert_eq!(rows[1].response_length, 64);
    }

    #[test]
    fn test_read_rejects_bad_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "質問番号,応答時間(秒),評価スコア,応答文字数\n1,fast,8,215\n").unwrap();
        assert!(read_rows(&path).is_err());
    }
}
