//! Reports over finished runs
//!
//! - `table` - per-question CSV export/import
//! - `summary` - single-run statistics (`summary.md`)
//! - `compare` - multi-run comparison (`comparison_summary.md`)

pub mod compare;
pub mod summary;
pub mod table;

pub use compare::{Comparison, ComparedRun, Extremes};
pub use summary::RunSummary;
pub use table::{BenchmarkRow, BENCHMARK_CSV_NAME};
