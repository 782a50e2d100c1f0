//! Run Record: the persisted result of one benchmark run
//!
//! The record is rewritten in full after every question so an interrupted
//! run still leaves a consistent file behind. Aggregates are recomputed on
//! each append, never patched.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::extract::extract_actual_response;
use super::genre::CategoryStats;
use super::scoring::keyword_score;
use crate::answer::Invocation;
use crate::questions::Question;

/// Timestamp format stored in records
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One question's outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Raw output of the answer source (or `Error: ...` on failure)
    pub response: String,
    /// Answer recovered from `response`; empty on failure
    pub actual_response: String,
    /// Seconds
    pub execution_time: f64,
    /// Keyword ratio in [0, 1]
    pub score: f64,
    #[serde(default)]
    pub expected_keywords: Vec<String>,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoredResult {
    /// Extract and score a finished invocation
    pub fn from_invocation(question: &Question, invocation: Invocation) -> Self {
        let execution_time = invocation.elapsed_secs();
        let (actual_response, score) = if invocation.success {
            let actual = extract_actual_response(&invocation.response);
            let score = keyword_score(&actual, &invocation.response, &question.expected_keywords);
            (actual, score)
        } else {
            (String::new(), 0.0)
        };

        Self {
            question: question.text.clone(),
            category: question.category.clone(),
            response: invocation.response,
            actual_response,
            execution_time,
            score,
            expected_keywords: question.expected_keywords.clone(),
            success: invocation.success,
            error: invocation.error,
        }
    }
}

/// Results of a run plus aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: String,
    /// Questions planned for the run
    pub total_questions: usize,
    pub debug_mode: bool,
    pub questions: Vec<ScoredResult>,
    pub total_execution_time: f64,
    pub average_execution_time: f64,
    pub average_score: f64,
    /// False while the run is still in progress (or was interrupted)
    #[serde(default)]
    pub completed: bool,
    /// Keyed by category, in order of first appearance
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub categories: IndexMap<String, CategoryStats>,
}

impl RunRecord {
    pub fn new(total_questions: usize, debug_mode: bool) -> Self {
        Self {
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            total_questions,
            debug_mode,
            questions: Vec::new(),
            total_execution_time: 0.0,
            average_execution_time: 0.0,
            average_score: 0.0,
            completed: false,
            categories: IndexMap::new(),
        }
    }

    /// Append a result and refresh every aggregate
    pub fn push(&mut self, result: ScoredResult) {
        let index = self.questions.len();
        if let Some(category) = &result.category {
            self.categories
                .entry(category.clone())
                .or_default()
                .record(index, result.execution_time, result.success);
        }
        self.questions.push(result);
        self.recompute();
    }

    fn recompute(&mut self) {
        let n = self.questions.len();
        self.total_execution_time = self.questions.iter().map(|q| q.execution_time).sum();
        if n == 0 {
            self.average_execution_time = 0.0;
            self.average_score = 0.0;
            return;
        }
        self.average_execution_time = self.total_execution_time / n as f64;
        self.average_score = self.questions.iter().map(|q| q.score).sum::<f64>() / n as f64;
    }

    pub fn failed(&self) -> impl Iterator<Item = &ScoredResult> {
        self.questions.iter().filter(|q| !q.success)
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// Write the record as pretty JSON.
    ///
    /// Goes through a temp file in the same directory and a rename, so
    /// readers never observe a half-written record.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write results: {}", tmp.display()))?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e).with_context(|| format!("Failed to write results: {}", path.display()));
        }

        tracing::debug!("Saved {} results to {}", self.questions.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read results: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse results: {}", path.display()))
    }
}

fn default_true() -> bool {
    true
}
