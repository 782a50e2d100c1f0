//! Report Aggregator
//!
//! Compares the summaries of several runs: fastest/slowest by mean latency,
//! best/worst by mean score and longest/shortest by mean answer length.
//! Scores are only ranked when every run uses the same score scale.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::summary::RunSummary;
use super::table::{read_rows, BENCHMARK_CSV_NAME};
use crate::benchmark::{RunRecord, ScoreScale};

/// Root searched for timestamped result directories
pub const DEFAULT_RESULTS_ROOT: &str = "benchmark/results";

/// Default output directory for the comparison report
pub const DEFAULT_COMPARISON_DIR: &str = "benchmark/results/comparison";

pub const COMPARISON_FILE_NAME: &str = "comparison_summary.md";

/// Summarize one input.
///
/// `path` may be a result directory holding `benchmark_results.csv`, a CSV
/// file or a JSON Run Record.
pub fn load_summary(path: &Path, label: &str) -> Result<RunSummary> {
    if path.is_dir() {
        let csv = path.join(BENCHMARK_CSV_NAME);
        if !csv.exists() {
            anyhow::bail!("{} not found", csv.display());
        }
        return RunSummary::from_rows(label, &read_rows(&csv)?);
    }

    if !path.exists() {
        anyhow::bail!("{} not found", path.display());
    }

    match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref() {
        Some("csv") => RunSummary::from_rows(label, &read_rows(path)?),
        Some("json") => RunSummary::from_record(label, &RunRecord::load(path)?),
        _ => anyhow::bail!("Unsupported input {} (expected a directory, .csv or .json)", path.display()),
    }
}

/// Display name of an input path
pub fn input_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One label per input: explicit labels first, basenames for the rest,
/// extras dropped
pub fn resolve_labels(inputs: &[PathBuf], labels: &[String]) -> Vec<String> {
    if !labels.is_empty() && labels.len() != inputs.len() {
        tracing::warn!(
            "Label count ({}) does not match input count ({})",
            labels.len(),
            inputs.len()
        );
    }

    inputs
        .iter()
        .enumerate()
        .map(|(i, path)| labels.get(i).cloned().unwrap_or_else(|| input_label(path)))
        .collect()
}

/// The `n` most recent `20*` result directories under `root`, oldest first
pub fn latest_result_dirs(root: &Path, n: usize) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("Failed to list result directories in {}", root.display()))?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && input_label(path).starts_with("20"))
        .collect();
    dirs.sort();

    if dirs.len() < n {
        anyhow::bail!(
            "Need at least {} result directories in {} to compare, found {}",
            n,
            root.display(),
            dirs.len()
        );
    }
    Ok(dirs.split_off(dirs.len() - n))
}

/// A run that made it into the comparison
#[derive(Debug, Clone)]
pub struct ComparedRun {
    pub source: PathBuf,
    pub summary: RunSummary,
}

/// Load every input, skipping the ones that cannot be read
pub fn load_runs(inputs: &[PathBuf], labels: &[String]) -> Result<Vec<ComparedRun>> {
    let mut runs = Vec::new();
    for (path, label) in inputs.iter().zip(labels) {
        match load_summary(path, label) {
            Ok(summary) => {
                eprintln!("Loaded {} ({} questions)", path.display(), summary.count);
                runs.push(ComparedRun { source: path.clone(), summary });
            }
            Err(e) => tracing::warn!("Skipping {}: {:#}", path.display(), e),
        }
    }

    if runs.is_empty() {
        anyhow::bail!("No valid benchmark results to compare");
    }
    Ok(runs)
}

/// Lowest and highest run for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct Extremes {
    pub low: usize,
    pub high: usize,
    pub low_value: f64,
    pub high_value: f64,
    /// `high_value - low_value`
    pub diff: f64,
    /// `diff` relative to `high_value`, in percent; `None` when that is zero
    pub percent: Option<f64>,
}

impl Extremes {
    /// First occurrence wins ties. `None` for an empty slice.
    pub fn of(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let (mut low, mut high) = (0, 0);
        let (mut low_value, mut high_value) = (first, first);
        for (i, &v) in values.iter().enumerate().skip(1) {
            if v < low_value {
                low = i;
                low_value = v;
            }
            if v > high_value {
                high = i;
                high_value = v;
            }
        }

        let diff = high_value - low_value;
        let percent = (high_value != 0.0).then(|| diff / high_value * 100.0);
        Some(Self { low, high, low_value, high_value, diff, percent })
    }
}

/// Cross-run comparison
#[derive(Debug, Clone)]
pub struct Comparison {
    pub runs: Vec<ComparedRun>,
    /// low = fastest, high = slowest
    pub latency: Extremes,
    /// low = worst, high = best; absent when scales differ
    pub score: Option<Extremes>,
    /// low = shortest, high = longest
    pub length: Extremes,
}

impl Comparison {
    pub fn from_runs(runs: Vec<ComparedRun>) -> Result<Self> {
        let metric = |f: fn(&RunSummary) -> f64| -> Vec<f64> { runs.iter().map(|r| f(&r.summary)).collect() };

        let latency = Extremes::of(&metric(|s| s.mean_time)).context("No runs to compare")?;
        let length = Extremes::of(&metric(|s| s.mean_length)).context("No runs to compare")?;

        let score = match shared_scale(&runs) {
            Some(_) => Extremes::of(&metric(|s| s.mean_score)),
            None => {
                tracing::warn!("Runs use different score scales, scores will not be ranked");
                None
            }
        };

        Ok(Self { runs, latency, score, length })
    }

    /// Scale shared by every run, if any
    pub fn score_scale(&self) -> Option<ScoreScale> {
        shared_scale(&self.runs)
    }

    fn label(&self, index: usize) -> &str {
        &self.runs[index].summary.label
    }
}

fn shared_scale(runs: &[ComparedRun]) -> Option<ScoreScale> {
    let first = runs.first()?.summary.score_scale;
    runs.iter().all(|r| r.summary.score_scale == first).then_some(first)
}

fn percent(p: Option<f64>) -> String {
    p.map(|p| format!(" ({:.1}%)", p)).unwrap_or_default()
}

/// `comparison_summary.md` body
pub fn render_comparison_markdown(comparison: &Comparison) -> String {
    let mut md = String::new();
    let scale = comparison.score_scale();

    md.push_str("# ベンチマーク比較結果\n\n");
    md.push_str(&format!("生成日時: {}\n\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));

    md.push_str("## 比較対象\n\n");
    for (i, run) in comparison.runs.iter().enumerate() {
        md.push_str(&format!("{}. **{}**: `{}`\n", i + 1, run.summary.label, run.source.display()));
    }

    md.push_str("\n## 統計情報\n\n");
    md.push_str("| ベンチマーク | 平均応答時間 | 平均評価スコア | 平均応答文字数 |\n");
    md.push_str("|------------|------------|--------------|------------|\n");
    for run in &comparison.runs {
        let s = &run.summary;
        md.push_str(&format!(
            "| {} | {:.2}秒 | {} | {}文字 |\n",
            s.label,
            s.mean_time,
            s.score_scale.format(s.mean_score),
            s.mean_length as u64
        ));
    }

    md.push_str("\n## 分析\n\n");

    let latency = &comparison.latency;
    md.push_str("### 応答時間\n\n");
    md.push_str(&format!("- 最速: **{}** ({:.2}秒)\n", comparison.label(latency.low), latency.low_value));
    md.push_str(&format!("- 最遅: **{}** ({:.2}秒)\n", comparison.label(latency.high), latency.high_value));
    md.push_str(&format!("- 差異: {:.2}秒{}\n\n", latency.diff, percent(latency.percent)));

    md.push_str("### 評価スコア\n\n");
    match (&comparison.score, scale) {
        (Some(score), Some(scale)) => {
            md.push_str(&format!("- 最高: **{}** ({})\n", comparison.label(score.high), scale.format(score.high_value)));
            md.push_str(&format!("- 最低: **{}** ({})\n", comparison.label(score.low), scale.format(score.low_value)));
            md.push_str(&format!("- 差異: {:.2}ポイント{}\n\n", score.diff, percent(score.percent)));
        }
        _ => {
            md.push_str("スコア尺度が異なるため比較できません。\n\n");
        }
    }

    let length = &comparison.length;
    md.push_str("### 応答文字数\n\n");
    md.push_str(&format!("- 最長: **{}** ({}文字)\n", comparison.label(length.high), length.high_value as u64));
    md.push_str(&format!("- 最短: **{}** ({}文字)\n", comparison.label(length.low), length.low_value as u64));
    md.push_str(&format!("- 差異: {}文字{}\n\n", length.diff as u64, percent(length.percent)));

    md.push_str("### 総合評価\n\n");
    md.push_str("各ベンチマークの特徴:\n\n");
    for run in &comparison.runs {
        let s = &run.summary;
        md.push_str(&format!("**{}**:\n", s.label));

        if s.mean_time == latency.low_value {
            md.push_str("- 応答時間が最も速い\n");
        } else if s.mean_time == latency.high_value {
            md.push_str("- 応答時間が最も遅い\n");
        } else {
            md.push_str(&format!("- 応答時間は平均的 ({:.2}秒)\n", s.mean_time));
        }

        if let Some(score) = &comparison.score {
            if s.mean_score == score.high_value {
                md.push_str("- 評価スコアが最も高い\n");
            } else if s.mean_score == score.low_value {
                md.push_str("- 評価スコアが最も低い\n");
            } else {
                md.push_str(&format!("- 評価スコアは平均的 ({})\n", s.score_scale.format(s.mean_score)));
            }
        }

        if s.mean_length == length.high_value {
            md.push_str("- 応答文字数が最も多い\n");
        } else if s.mean_length == length.low_value {
            md.push_str("- 応答文字数が最も少ない\n");
        } else {
            md.push_str(&format!("- 応答文字数は平均的 ({}文字)\n", s.mean_length as u64));
        }
        md.push('\n');
    }

    md
}

/// Write `comparison_summary.md` into `dir`
pub fn write_comparison(dir: &Path, comparison: &Comparison) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(COMPARISON_FILE_NAME);
    std::fs::write(&path, render_comparison_markdown(comparison))
        .with_context(|| format!("Failed to write comparison: {}", path.display()))?;
    Ok(path)
}
