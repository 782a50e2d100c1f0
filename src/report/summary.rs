//! Single-run summary statistics

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::table::{rows_from_record, BenchmarkRow};
use crate::benchmark::{RunRecord, ScoreScale};

/// Single-run report file name
pub const SUMMARY_FILE_NAME: &str = "summary.md";

/// Aggregate view of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub label: String,
    pub count: usize,
    pub mean_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub mean_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    /// Scale of the three score fields
    pub score_scale: ScoreScale,
    /// Mean response length in characters
    pub mean_length: f64,
}

impl RunSummary {
    /// Summarize tabular rows (evaluation scores, 0-10)
    pub fn from_rows(label: impl Into<String>, rows: &[BenchmarkRow]) -> Result<Self> {
        let label = label.into();
        if rows.is_empty() {
            anyhow::bail!("No rows to summarize for '{}'", label);
        }

        let times: Vec<f64> = rows.iter().map(|r| r.response_time).collect();
        let scores: Vec<f64> = rows.iter().map(|r| r.evaluation_score).collect();
        let lengths: Vec<f64> = rows.iter().map(|r| r.response_length as f64).collect();

        Ok(Self::build(label, &times, &scores, &lengths, ScoreScale::Evaluation10))
    }

    /// Summarize a Run Record (keyword ratio, 0-1)
    ///
    /// Times and lengths come from the same rows the CSV export writes, so
    /// both views of a run agree.
    pub fn from_record(label: impl Into<String>, record: &RunRecord) -> Result<Self> {
        let label = label.into();
        if record.questions.is_empty() {
            anyhow::bail!("Run record for '{}' has no results", label);
        }

        let rows = rows_from_record(record);
        let times: Vec<f64> = rows.iter().map(|r| r.response_time).collect();
        let lengths: Vec<f64> = rows.iter().map(|r| r.response_length as f64).collect();
        let scores: Vec<f64> = record.questions.iter().map(|q| q.score).collect();

        Ok(Self::build(label, &times, &scores, &lengths, ScoreScale::Ratio))
    }

    fn build(label: String, times: &[f64], scores: &[f64], lengths: &[f64], scale: ScoreScale) -> Self {
        Self {
            label,
            count: times.len(),
            mean_time: mean(times),
            min_time: min(times),
            max_time: max(times),
            mean_score: mean(scores),
            min_score: min(scores),
            max_score: max(scores),
            score_scale: scale,
            mean_length: mean(lengths),
        }
    }
}

/// `summary.md` body
pub fn render_summary_markdown(summary: &RunSummary) -> String {
    let scale = summary.score_scale;
    let mut md = String::new();

    md.push_str("# ベンチマーク結果サマリー\n\n");
    md.push_str(&format!("対象: **{}**\n\n", summary.label));
    md.push_str("## 統計情報\n\n");
    md.push_str(&format!("- 質問数: {}\n", summary.count));
    md.push_str(&format!("- 平均応答時間: {:.2} 秒\n", summary.mean_time));
    md.push_str(&format!("- 最短応答時間: {:.2} 秒\n", summary.min_time));
    md.push_str(&format!("- 最長応答時間: {:.2} 秒\n", summary.max_time));
    md.push_str(&format!("- 平均評価スコア: {}\n", scale.format(summary.mean_score)));
    md.push_str(&format!("- 最低評価スコア: {}\n", scale.format(summary.min_score)));
    md.push_str(&format!("- 最高評価スコア: {}\n", scale.format(summary.max_score)));
    md.push_str(&format!("- 平均応答文字数: {} 文字\n", summary.mean_length as u64));
    md.push_str(&format!("\nスコア尺度: {}\n", scale.name()));

    md
}

/// Where `summary.md` goes when no output directory is given: next to a
/// file input, inside a directory input
pub fn default_summary_dir(input: &Path) -> PathBuf {
    if input.is_dir() {
        return input.to_path_buf();
    }
    match input.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::from("."),
    }
}

/// Write `summary.md` into `dir`
pub fn write_summary(dir: &Path, summary: &RunSummary) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(SUMMARY_FILE_NAME);
    std::fs::write(&path, render_summary_markdown(summary))
        .with_context(|| format!("Failed to write summary: {}", path.display()))?;
    Ok(path)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::ScoredResult;

    fn row(n: usize, time: f64, score: f64, len: usize) -> BenchmarkRow {
        BenchmarkRow {
            question_number: n,
            response_time: time,
            evaluation_score: score,
            response_length: len,
        }
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![row(1, 1.0, 8.0, 100), row(2, 3.0, 4.0, 50), row(3, 2.0, 6.0, 30)];
        let summary = RunSummary::from_rows("v1", &rows).unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean_time, 2.0);
        assert_eq!(summary.min_time, 1.0);
        assert_eq!(summary.max_time, 3.0);
        assert_eq!(summary.mean_score, 6.0);
        assert_eq!(summary.min_score, 4.0);
        assert_eq!(summary.max_score, 8.0);
        assert_eq!(summary.mean_length, 60.0);
        assert_eq!(summary.score_scale, ScoreScale::Evaluation10);
    }

    #[test]
    fn test_from_rows_empty_is_error() {
        assert!(RunSummary::from_rows("empty", &[]).is_err());
    }

    #[test]
    fn test_from_record_uses_ratio_scale() {
        let mut record = RunRecord::new(2, false);
        for (score, answer) in [(1.0, "abcd"), (0.5, "ab")] {
            record.push(ScoredResult {
                question: "q".to_string(),
                category: None,
                response: answer.to_string(),
                actual_response: answer.to_string(),
                execution_time: 1.0,
                score,
                expected_keywords: vec![],
                success: true,
                error: None,
            });
        }

        let summary = RunSummary::from_record("json", &record).unwrap();
        assert_eq!(summary.score_scale, ScoreScale::Ratio);
        assert_eq!(summary.mean_score, 0.75);
        assert_eq!(summary.mean_length, 3.0);
    }

    #[test]
    fn test_record_and_csv_views_agree() {
        use crate::answer::Invocation;
        use crate::questions::Question;
        use std::time::Duration;

        let mut record = RunRecord::new(2, false);
        record.push(ScoredResult {
            question: "q1".to_string(),
            category: None,
            response: "abcd".to_string(),
            actual_response: "abcd".to_string(),
            execution_time: 1.0,
            score: 0.5,
            expected_keywords: vec![],
            success: true,
            error: None,
        });
        record.push(ScoredResult::from_invocation(
            &Question::new("q2"),
            Invocation::failure("process exited with status 1", Duration::from_secs(3)),
        ));

        let json = RunSummary::from_record("json", &record).unwrap();
        let csv = RunSummary::from_rows("csv", &rows_from_record(&record)).unwrap();

        assert_eq!(json.count, csv.count);
        assert_eq!(json.mean_length, 2.0);
        assert_eq!(json.mean_length, csv.mean_length);
        assert_eq!(json.mean_time, csv.mean_time);
        assert_eq!(json.min_time, csv.min_time);
        assert_eq!(json.max_time, csv.max_time);
        assert_eq!(csv.mean_score, json.mean_score * 10.0);
    }

    #[test]
    fn test_render_and_write() {
        let rows = vec![row(1, 1.234, 7.0, 99)];
        let summary = RunSummary::from_rows("latest", &rows).unwrap();

        let md = render_summary_markdown(&summary);
        assert!(md.contains("- 質問数: 1"));
        assert!(md.contains("- 平均応答時間: 1.23 秒"));
        assert!(md.contains("- 平均評価スコア: 7.0/10"));
        assert!(md.contains("- 平均応答文字数: 99 文字"));

        let dir = tempfile::tempdir().unwrap();
        let path = write_summary(&dir.path().join("charts"), &summary).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), md);
    }
}
