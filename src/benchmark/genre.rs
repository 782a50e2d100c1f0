//! Per-category statistics for category runs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Running statistics for one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Questions recorded
    pub count: usize,
    #[serde(default)]
    pub failed: usize,
    /// Mean execution time of the successful questions (seconds)
    pub avg_time: f64,
    /// Positions in the run's question list
    pub question_indices: Vec<usize>,
}

impl CategoryStats {
    /// Fold one result in: `avg = (avg * (n - 1) + t) / n` over successes
    pub fn record(&mut self, index: usize, elapsed: f64, success: bool) {
        self.count += 1;
        self.question_indices.push(index);
        if !success {
            self.failed += 1;
            return;
        }
        let n = (self.count - self.failed) as f64;
        self.avg_time = (self.avg_time * (n - 1.0) + elapsed) / n;
    }

    pub fn succeeded(&self) -> usize {
        self.count - self.failed
    }
}

/// Print the per-category breakdown of a run, in run order
pub fn print_category_table(categories: &IndexMap<String, CategoryStats>) {
    if categories.is_empty() {
        return;
    }

    println!("\n┌─ BY CATEGORY ─────────────────────────────────────────────┐");
    println!("{:20} {:>10} {:>10} {:>14}", "Category", "Questions", "Failed", "Avg time (s)");
    println!("{}", "─".repeat(57));
    for (name, stats) in categories {
        let avg = if stats.succeeded() > 0 {
            format!("{:.2}", stats.avg_time)
        } else {
            "-".to_string()
        };
        println!("{:20} {:>10} {:>10} {:>14}", name, stats.count, stats.failed, avg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_average() {
        let mut stats = CategoryStats::default();
        stats.record(0, 1.0, true);
        stats.record(3, 2.0, true);
        stats.record(7, 6.0, true);

        assert_eq!(stats.count, 3);
        assert!((stats.avg_time - 3.0).abs() < 1e-12);
        assert_eq!(stats.question_indices, vec![0, 3, 7]);
    }

    #[test]
    fn test_failures_do_not_skew_average() {
        let mut stats = CategoryStats::default();
        stats.record(0, 2.0, true);
        stats.record(1, 120.0, false);
        stats.record(2, 4.0, true);

        assert_eq!(stats.count, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.succeeded(), 2);
        assert!((stats.avg_time - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_only_failures() {
        let mut stats = CategoryStats::default();
        stats.record(5, 9.0, false);
        assert_eq!(stats.avg_time, 0.0);
        assert_eq!(stats.question_indices, vec![5]);
    }
}
