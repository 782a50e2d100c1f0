//! Answer extraction from responses with interleaved diagnostics
//!
//! In debug mode the answer program prints its rule matching trace around
//! the real answer. This recovers the answer with plain text heuristics:
//!
//! 1. If a rule override fired, everything after the override marker.
//! 2. Otherwise the last non-blank line that is not a diagnostic line.
//! 3. Otherwise the response unchanged.
//!
//! The heuristic is approximate. It only knows the trace formats seen so
//! far and can misfire on answers that happen to look like trace lines.

/// Printed by the answer program when a rule-based override produced the answer
pub const RULE_OVERRIDE_MARKER: &str = "推論ルールが適用されました:";

/// Trace lines start with a rule label...
const DIAGNOSTIC_PREFIX: &str = "ルール";

/// ...or report a match / mismatch
const DIAGNOSTIC_MARKERS: [&str; 2] = ["一致:", "不一致:"];

/// Recover the answer part of a raw response
pub fn extract_actual_response(response: &str) -> String {
    if let Some((_, after)) = response.split_once(RULE_OVERRIDE_MARKER) {
        return after.trim().to_string();
    }

    response
        .split('\n')
        .rev()
        .find(|line| !line.trim().is_empty() && !is_diagnostic_line(line))
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| response.to_string())
}

/// Heuristic check for a rule-trace line
pub fn is_diagnostic_line(line: &str) -> bool {
    line.starts_with(DIAGNOSTIC_PREFIX) || DIAGNOSTIC_MARKERS.iter().any(|m| line.contains(m))
}
