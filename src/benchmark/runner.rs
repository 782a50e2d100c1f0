//! Benchmark Runner
//!
//! Asks each question in order, one at a time, and keeps the on-disk
//! Run Record current after every answer.

use anyhow::Result;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::genre::print_category_table;
use super::record::{RunRecord, ScoredResult};
use crate::answer::AnswerSource;
use crate::config::RunConfig;
use crate::questions::Question;

/// Characters of each answer echoed to the console
pub const DEFAULT_PREVIEW_CHARS: usize = 200;

/// Stamp in the file name of a category run's record
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Per-run settings
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Ask the source for diagnostic output
    pub debug: bool,
    /// Where the Run Record is persisted
    pub output: PathBuf,
    /// Pause between questions; zero disables pacing
    pub inter_question_delay: Duration,
    pub preview_chars: usize,
}

impl RunOptions {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            debug: false,
            output: output.into(),
            inter_question_delay: Duration::ZERO,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    /// Settings for a category run, full (`genre`) or compact.
    ///
    /// An explicit output or delay wins over the configured one. Compact
    /// runs echo the wider preview.
    pub fn category_run(
        run: &RunConfig,
        compact: bool,
        output: Option<PathBuf>,
        delay_ms: Option<u64>,
        now: NaiveDateTime,
    ) -> Self {
        let output =
            output.unwrap_or_else(|| category_run_output(&run.results_dir, compact, now));
        let delay = delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| run.inter_question_delay());
        let preview_chars = if compact {
            run.compact_preview_chars
        } else {
            run.preview_chars
        };

        Self::new(output)
            .with_delay(delay)
            .with_preview_chars(preview_chars)
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.inter_question_delay = delay;
        self
    }

    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }
}

/// `genre` or `compact`
pub fn category_run_mode(compact: bool) -> &'static str {
    if compact {
        "compact"
    } else {
        "genre"
    }
}

/// `<results_dir>/<mode>_benchmark_<stamp>.json`
pub fn category_run_output(results_dir: &Path, compact: bool, at: NaiveDateTime) -> PathBuf {
    results_dir.join(format!(
        "{}_benchmark_{}.json",
        category_run_mode(compact),
        at.format(RUN_STAMP_FORMAT)
    ))
}

/// Drives one answer source through a question list
pub struct BenchmarkRunner<'a> {
    source: &'a dyn AnswerSource,
    options: RunOptions,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new(source: &'a dyn AnswerSource, options: RunOptions) -> Self {
        Self { source, options }
    }

    /// Run every question sequentially.
    ///
    /// Failed invocations are recorded and the run continues; only an
    /// empty question list or a failed write aborts.
    pub async fn run(&self, questions: &[Question]) -> Result<RunRecord> {
        if questions.is_empty() {
            anyhow::bail!("No questions to run");
        }

        let total = questions.len();
        let mut record = RunRecord::new(total, self.options.debug);

        eprintln!(
            "Running {} questions against {} (debug: {})",
            total,
            self.source.name(),
            if self.options.debug { "on" } else { "off" }
        );
        eprintln!("Results: {}\n", self.options.output.display());

        for (i, question) in questions.iter().enumerate() {
            match &question.category {
                Some(category) => eprintln!("[{}/{}] [{}] {}", i + 1, total, category, question.text),
                None => eprintln!("[{}/{}] {}", i + 1, total, question.text),
            }

            let invocation = self.source.invoke(&question.text, self.options.debug).await;
            let result = ScoredResult::from_invocation(question, invocation);

            if result.success {
                eprintln!("  Answer: {}", preview(&result.actual_response, self.options.preview_chars));
                eprintln!("  Time: {:.2}s  Score: {:.2}", result.execution_time, result.score);
            } else {
                let detail = result.error.as_deref().unwrap_or("unknown error");
                eprintln!("  ✗ Failed after {:.2}s: {}", result.execution_time, detail);
                tracing::warn!(question = %question.text, "Invocation failed: {}", detail);
            }

            record.push(result);
            record.save(&self.options.output)?;

            let is_last = i + 1 == total;
            if !is_last && !self.options.inter_question_delay.is_zero() {
                tokio::time::sleep(self.options.inter_question_delay).await;
            }
        }

        record.completed = true;
        record.save(&self.options.output)?;

        print_run_summary(&record);
        print_category_table(&record.categories);
        println!("\nResults saved to {}", self.options.output.display());

        Ok(record)
    }
}

/// First `max_chars` characters, with `...` when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

fn print_run_summary(record: &RunRecord) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     BENCHMARK SUMMARY                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("  Questions:          {}", record.questions.len());
    println!("  Total time:         {:.2}s", record.total_execution_time);
    println!("  Mean response time: {:.2}s", record.average_execution_time);
    println!("  Mean keyword score: {:.2}", record.average_score);

    let failed = record.failed_count();
    if failed > 0 {
        println!("\n  ⚠ {} questions failed:", failed);
        for result in record.failed() {
            println!(
                "    - {}: {}",
                result.question,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_chars() {
        assert_eq!(preview("short", 200), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("日本語の回答です", 3), "日本語...");
        assert_eq!(preview("abc", 3), "abc");
        assert_eq!(preview("", 0), "");
    }

    #[test]
    fn test_run_options_builders() {
        let options = RunOptions::new("out.json")
            .with_debug(true)
            .with_delay(Duration::from_secs(1))
            .with_preview_chars(500);
        assert!(options.debug);
        assert_eq!(options.inter_question_delay, Duration::from_secs(1));
        assert_eq!(options.preview_chars, 500);
        assert_eq!(options.output, PathBuf::from("out.json"));
    }

    fn at() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_category_run_defaults_from_config() {
        let run = RunConfig {
            results_dir: PathBuf::from("results"),
            ..RunConfig::default()
        };

        let compact = RunOptions::category_run(&run, true, None, None, at());
        assert_eq!(compact.output, PathBuf::from("results/compact_benchmark_20250102_030405.json"));
        assert_eq!(compact.inter_question_delay, Duration::from_millis(1000));
        assert_eq!(compact.preview_chars, 500);
        assert!(!compact.debug);

        let genre = RunOptions::category_run(&run, false, None, None, at());
        assert_eq!(genre.output, PathBuf::from("results/genre_benchmark_20250102_030405.json"));
        assert_eq!(genre.preview_chars, 200);
    }

    #[test]
    fn test_category_run_overrides() {
        let run = RunConfig {
            inter_question_delay_ms: 250,
            compact_preview_chars: 80,
            ..RunConfig::default()
        };

        let options =
            RunOptions::category_run(&run, true, Some(PathBuf::from("mine.json")), Some(0), at());
        assert_eq!(options.output, PathBuf::from("mine.json"));
        assert_eq!(options.inter_question_delay, Duration::ZERO);
        assert_eq!(options.preview_chars, 80);

        let configured = RunOptions::category_run(&run, false, None, None, at());
        assert_eq!(configured.inter_question_delay, Duration::from_millis(250));
        assert_eq!(category_run_mode(false), "genre");
    }
}
