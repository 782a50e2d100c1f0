//! Benchmark infrastructure
//!
//! Runs question lists against an answer source, scores the answers and
//! persists a Run Record.
//!
//! ## Usage
//!
//! ```bash
//! answer-benchmark run --questions ./questions.json --debug
//! answer-benchmark genre --compact
//! ```
//!
//! ## Modules
//!
//! - `extract` - Recover the answer from responses with rule traces
//! - `scoring` - Keyword-overlap score
//! - `record` - Run Record and per-question results
//! - `runner` - Sequential runner with incremental persistence
//! - `genre` - Per-category statistics

pub mod extract;
pub mod genre;
pub mod record;
pub mod runner;
pub mod scoring;


pub use extract::extract_actual_response;
pub use genre::CategoryStats;
pub use record::{RunRecord, ScoredResult};
pub use runner::{
    category_run_mode, category_run_output, BenchmarkRunner, RunOptions, DEFAULT_PREVIEW_CHARS,
};
pub use scoring::{keyword_score, ScoreScale};
