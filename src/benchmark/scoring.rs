//! Keyword-overlap scoring
//!
//! A quality proxy without a reference model: the fraction of expected
//! keywords that appear verbatim in the answer. Not a measure of semantic
//! correctness.

use serde::{Deserialize, Serialize};

/// The two score scales found in benchmark artifacts.
///
/// They are not convertible into each other and are never averaged together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    /// Locally computed keyword ratio, 0.0 to 1.0
    Ratio,
    /// Externally assigned evaluation score, 0 to 10
    Evaluation10,
}

impl ScoreScale {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ratio => "keyword ratio (0-1)",
            Self::Evaluation10 => "evaluation score (0-10)",
        }
    }

    /// Human-readable value on this scale
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Ratio => format!("{:.2}", value),
            Self::Evaluation10 => format!("{:.1}/10", value),
        }
    }
}

/// Keywords found (case-sensitive substring) in the answer or the raw response
pub fn matched_keywords<'a>(actual: &str, raw: &str, keywords: &'a [String]) -> Vec<&'a str> {
    keywords
        .iter()
        .filter(|kw| actual.contains(kw.as_str()) || raw.contains(kw.as_str()))
        .map(String::as_str)
        .collect()
}

/// `matched / expected`, or 0.0 when nothing is expected
pub fn keyword_score(actual: &str, raw: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    matched_keywords(actual, raw, keywords).len() as f64 / keywords.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_keyword_score_ratio() {
        let keywords = kws(&["requests", "BeautifulSoup", "HTML", "lxml"]);
        let answer = "requestsでHTMLを取得します";
        assert_eq!(keyword_score(answer, answer, &keywords), 0.5);
    }

    #[test]
    fn test_keyword_score_empty_set_is_zero() {
        assert_eq!(keyword_score("anything", "anything", &[]), 0.0);
        assert_eq!(keyword_score("", "", &[]), 0.0);
    }

    #[test]
    fn test_keyword_score_is_case_sensitive() {
        let keywords = kws(&["File"]);
        assert_eq!(keyword_score("use file", "use file", &keywords), 0.0);
        assert_eq!(keyword_score("use File", "use File", &keywords), 1.0);
    }

    #[test]
    fn test_raw_response_counts_too() {
        let keywords = kws(&["量子ビット", "重ね合わせ"]);
        let raw = "ルール1 一致: 量子ビット\n重ね合わせを利用します";
        let actual = "重ね合わせを利用します";
        assert_eq!(matched_keywords(actual, raw, &keywords), vec!["量子ビット", "重ね合わせ"]);
        assert_eq!(keyword_score(actual, raw, &keywords), 1.0);
    }

    #[test]
    fn test_score_matches_definition() {
        let keywords = kws(&["a", "b", "c"]);
        for (text, expected_matches) in [("", 0), ("a", 1), ("ab", 2), ("cab", 3), ("xyz", 0)] {
            let score = keyword_score(text, text, &keywords);
            assert_eq!(score, expected_matches as f64 / 3.0, "text: {}", text);
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_score_scale_format() {
        assert_eq!(ScoreScale::Ratio.format(0.5), "0.50");
        assert_eq!(ScoreScale::Evaluation10.format(7.25), "7.2/10");
        assert_eq!(ScoreScale::Ratio.name(), "keyword ratio (0-1)");
    }
}
