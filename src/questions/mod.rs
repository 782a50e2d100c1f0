//! Benchmark questions with expected keywords
//!
//! The default datasets are embedded JSON files; a custom file passed with
//! `--questions` overrides them. A custom file that cannot be used is never
//! fatal: the run falls back to the embedded list with a warning.
//!
//! ## Question File Format (JSON)
//!
//! Any of these shapes is accepted:
//!
//! ```json
//! ["What is X?", "What is Y?"]
//! ```
//!
//! ```json
//! {
//!   "metadata": { "name": "my-set", "version": "1.0" },
//!   "questions": [
//!     { "text": "What is X?", "expected_keywords": ["X"] },
//!     "What is Y?"
//!   ]
//! }
//! ```
//!
//! Bare strings pick up expected keywords from the default dataset when
//! their text matches one of its questions.
//!
//! ## Category File Format (JSON)
//!
//! ```json
//! { "categories": { "AI": ["..."], "数学": ["..."] } }
//! ```
//!
//! The `categories` wrapper is optional; category order is preserved.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Default question list with expected keywords
pub const DEFAULT_QUESTIONS_JSON: &str = include_str!("../../data/default_questions.json");

/// Default category map used by category runs
pub const DEFAULT_CATEGORIES_JSON: &str = include_str!("../../data/genre_questions.json");

/// A benchmark question
///
/// Identity is the question text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "question")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Keywords a good answer should contain (order kept, may be empty)
    #[serde(default, alias = "keywords")]
    pub expected_keywords: Vec<String>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: None,
            expected_keywords: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

/// A question file entry: either bare text or a full object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuestionEntry {
    Text(String),
    Full(Question),
}

/// Metadata about a question file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionFileMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
}

/// Question text → expected keywords
pub type KeywordTable = HashMap<String, Vec<String>>;

/// An ordered list of questions
#[derive(Debug, Clone)]
pub struct QuestionSet {
    pub metadata: QuestionFileMetadata,
    pub questions: Vec<Question>,
}

impl QuestionSet {
    /// The embedded default question list
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_QUESTIONS_JSON, &KeywordTable::new())
            .context("Embedded default question list is invalid")
    }

    /// Parse a question file, filling missing keywords from `keywords`
    pub fn parse(content: &str, keywords: &KeywordTable) -> Result<Self> {
        let value: Value = serde_json::from_str(content).context("Invalid JSON")?;

        let (metadata, entries) = match value {
            Value::Array(items) => (QuestionFileMetadata::default(), items),
            Value::Object(mut map) => {
                let metadata = take_metadata(&mut map)?;
                match map.shift_remove("questions") {
                    Some(Value::Array(items)) => (metadata, items),
                    Some(_) => anyhow::bail!("\"questions\" must be a list"),
                    None => anyhow::bail!("Object has no \"questions\" field"),
                }
            }
            _ => anyhow::bail!("Expected a list of questions or an object with a \"questions\" field"),
        };

        let questions = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| parse_entry(entry, None, keywords).with_context(|| format!("Question {}", i)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { metadata, questions })
    }

    /// Load a question file from disk
    pub fn load(path: &Path, keywords: &KeywordTable) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read question file: {}", path.display()))?;
        Self::parse(&content, keywords)
            .with_context(|| format!("Failed to parse question file: {}", path.display()))
    }

    /// Load `path` when given and usable, otherwise the embedded defaults.
    ///
    /// Errors only if the embedded dataset itself is broken.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let builtin = Self::builtin()?;
        let Some(path) = path else {
            return Ok(builtin);
        };

        if !path.exists() {
            tracing::warn!("Question file {} not found, using the default question list", path.display());
            return Ok(builtin);
        }

        match Self::load(path, &builtin.keyword_table()) {
            Ok(set) if !set.questions.is_empty() => Ok(set),
            Ok(_) => {
                tracing::warn!("Question file {} is empty, using the default question list", path.display());
                Ok(builtin)
            }
            Err(e) => {
                tracing::warn!("{:#}", e);
                tracing::warn!("Using the default question list");
                Ok(builtin)
            }
        }
    }

    /// Expected keywords indexed by question text
    pub fn keyword_table(&self) -> KeywordTable {
        self.questions
            .iter()
            .filter(|q| !q.expected_keywords.is_empty())
            .map(|q| (q.text.clone(), q.expected_keywords.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Number of questions that cannot score above zero
    pub fn without_keywords(&self) -> usize {
        self.questions.iter().filter(|q| q.expected_keywords.is_empty()).count()
    }
}

/// Questions grouped by category, in file order
#[derive(Debug, Clone)]
pub struct CategorySet {
    pub metadata: QuestionFileMetadata,
    pub categories: Vec<(String, Vec<Question>)>,
}

impl CategorySet {
    /// The embedded default category map
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_CATEGORIES_JSON, &KeywordTable::new())
            .context("Embedded default category map is invalid")
    }

    pub fn parse(content: &str, keywords: &KeywordTable) -> Result<Self> {
        let value: Value = serde_json::from_str(content).context("Invalid JSON")?;
        let Value::Object(mut map) = value else {
            anyhow::bail!("Expected an object mapping category names to question lists");
        };

        let metadata = take_metadata(&mut map)?;
        let map = match map.shift_remove("categories") {
            Some(Value::Object(inner)) => inner,
            Some(_) => anyhow::bail!("\"categories\" must be an object"),
            None => map,
        };

        let mut categories = Vec::with_capacity(map.len());
        for (name, entries) in map {
            let Value::Array(entries) = entries else {
                anyhow::bail!("Category '{}' must be a list of questions", name);
            };
            let questions = entries
                .into_iter()
                .enumerate()
                .map(|(i, entry)| {
                    parse_entry(entry, Some(&name), keywords)
                        .with_context(|| format!("Category '{}', question {}", name, i))
                })
                .collect::<Result<Vec<_>>>()?;
            categories.push((name, questions));
        }

        Ok(Self { metadata, categories })
    }

    pub fn load(path: &Path, keywords: &KeywordTable) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read category file: {}", path.display()))?;
        Self::parse(&content, keywords)
            .with_context(|| format!("Failed to parse category file: {}", path.display()))
    }

    /// Same fallback rules as [`QuestionSet::load_or_default`]
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let builtin = Self::builtin()?;
        let Some(path) = path else {
            return Ok(builtin);
        };

        if !path.exists() {
            tracing::warn!("Category file {} not found, using the default categories", path.display());
            return Ok(builtin);
        }

        let keywords = QuestionSet::builtin()?.keyword_table();
        match Self::load(path, &keywords) {
            Ok(set) if set.question_count() > 0 => Ok(set),
            Ok(_) => {
                tracing::warn!("Category file {} has no questions, using the default categories", path.display());
                Ok(builtin)
            }
            Err(e) => {
                tracing::warn!("{:#}", e);
                tracing::warn!("Using the default categories");
                Ok(builtin)
            }
        }
    }

    pub fn question_count(&self) -> usize {
        self.categories.iter().map(|(_, qs)| qs.len()).sum()
    }

    /// Every question, category by category
    pub fn flatten(&self) -> Vec<Question> {
        self.categories
            .iter()
            .flat_map(|(_, questions)| questions.iter().cloned())
            .collect()
    }

    /// First question of each non-empty category
    pub fn compact(&self) -> Vec<Question> {
        self.categories
            .iter()
            .filter_map(|(_, questions)| questions.first().cloned())
            .collect()
    }
}

/// Questions per category, in first-seen order. Uncategorized questions
/// are counted under `-`.
pub fn category_counts(questions: &[Question]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for question in questions {
        let name = question.category.as_deref().unwrap_or("-");
        match counts.iter_mut().find(|(n, _)| n == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name.to_string(), 1)),
        }
    }
    counts
}

/// Shuffle once before a run. `None` draws a fresh order every time.
pub fn shuffle(questions: &mut [Question], seed: Option<u64>) {
    match seed {
        Some(seed) => questions.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => questions.shuffle(&mut rand::rng()),
    }
}

fn take_metadata(map: &mut Map<String, Value>) -> Result<QuestionFileMetadata> {
    match map.shift_remove("metadata") {
        Some(value) => serde_json::from_value(value).context("Invalid \"metadata\""),
        None => Ok(QuestionFileMetadata::default()),
    }
}

fn parse_entry(entry: Value, category: Option<&str>, keywords: &KeywordTable) -> Result<Question> {
    let mut question = match serde_json::from_value(entry)? {
        QuestionEntry::Text(text) => Question::new(text),
        QuestionEntry::Full(question) => question,
    };

    if question.text.trim().is_empty() {
        anyhow::bail!("Empty question text");
    }
    if question.expected_keywords.is_empty() {
        if let Some(known) = keywords.get(&question.text) {
            question.expected_keywords = known.clone();
        }
    }
    if let Some(category) = category {
        question.category = Some(category.to_string());
    }

    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_without_keywords_counts_unscorable() {
        let mut keywords = KeywordTable::new();
        keywords.insert("known".to_string(), vec!["k".to_string()]);
        let set = QuestionSet::parse(r#"["known", "unknown", "also unknown"]"#, &keywords).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.without_keywords(), 2);
    }

    #[test]
    fn test_builtin_questions() {
        let set = QuestionSet::builtin().unwrap();
        assert_eq!(set.len(), 10);
        assert_eq!(set.without_keywords(), 0);
        assert_eq!(
            set.questions[2].expected_keywords,
            vec!["stdio.h", "main", "scanf", "printf", "switch"]
        );
    }

    #[test]
    fn test_builtin_categories() {
        let set = CategorySet::builtin().unwrap();
        assert_eq!(set.categories.len(), 10);
        assert_eq!(set.question_count(), 100);
        // File order, not alphabetical
        assert_eq!(set.categories[0].0, "システム");
        assert_eq!(set.categories[9].0, "旅行");
    }

    #[test]
    fn test_parse_flat_list_uses_keyword_table() {
        let mut table = KeywordTable::new();
        table.insert("What is X?".to_string(), vec!["X".to_string()]);

        let set = QuestionSet::parse(r#"["What is X?", "What is Y?"]"#, &table).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.questions[0].expected_keywords, vec!["X"]);
        assert!(set.questions[1].expected_keywords.is_empty());
    }

    #[test]
    fn test_parse_questions_object_mixed_entries() {
        let content = r#"{
            "metadata": { "name": "mixed" },
            "questions": [
                { "question": "What is Y?", "keywords": ["Y", "Z"], "category": "letters" },
                "What is X?"
            ]
        }"#;
        let set = QuestionSet::parse(content, &KeywordTable::new()).unwrap();
        assert_eq!(set.metadata.name, "mixed");
        assert_eq!(set.questions[0].text, "What is Y?");
        assert_eq!(set.questions[0].expected_keywords, vec!["Y", "Z"]);
        assert_eq!(set.questions[0].category.as_deref(), Some("letters"));
        assert_eq!(set.questions[1], Question::new("What is X?"));
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        let table = KeywordTable::new();
        assert!(QuestionSet::parse(r#"{"items": []}"#, &table).is_err());
        assert!(QuestionSet::parse(r#"{"questions": "nope"}"#, &table).is_err());
        assert!(QuestionSet::parse("42", &table).is_err());
        assert!(QuestionSet::parse(r#"["ok", ""]"#, &table).is_err());
        assert!(QuestionSet::parse("not json", &table).is_err());
    }

    #[test]
    fn test_load_or_default_falls_back_on_malformed_file() {
        let (_dir, path) = write_temp("{ this is not json");
        let set = QuestionSet::load_or_default(Some(&path)).unwrap();
        assert_eq!(set.len(), 10);
    }

    #[test]
    fn test_load_or_default_falls_back_on_missing_and_empty() {
        let set = QuestionSet::load_or_default(Some(Path::new("/nonexistent/questions.json"))).unwrap();
        assert_eq!(set.len(), 10);

        let (_dir, path) = write_temp("[]");
        let set = QuestionSet::load_or_default(Some(&path)).unwrap();
        assert_eq!(set.len(), 10);
    }

    #[test]
    fn test_load_or_default_custom_file_inherits_default_keywords() {
        let (_dir, path) = write_temp(r#"["投資の始め方を教えてください", "新しい質問"]"#);
        let set = QuestionSet::load_or_default(Some(&path)).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.questions[0].expected_keywords, vec!["資金", "リスク", "分散", "株式", "計画"]);
        assert!(set.questions[1].expected_keywords.is_empty());
    }

    #[test]
    fn test_category_parse_with_and_without_wrapper() {
        let table = KeywordTable::new();
        let wrapped = CategorySet::parse(r#"{"categories": {"B": ["b1"], "A": ["a1", "a2"]}}"#, &table).unwrap();
        let bare = CategorySet::parse(r#"{"B": ["b1"], "A": ["a1", "a2"]}"#, &table).unwrap();

        for set in [wrapped, bare] {
            assert_eq!(set.categories[0].0, "B");
            assert_eq!(set.question_count(), 3);
            assert_eq!(set.categories[1].1[1].category.as_deref(), Some("A"));
        }
    }

    #[test]
    fn test_category_load_or_default_falls_back() {
        let (_dir, path) = write_temp(r#"{"A": "not a list"}"#);
        let set = CategorySet::load_or_default(Some(&path)).unwrap();
        assert_eq!(set.question_count(), 100);
    }

    #[test]
    fn test_flatten_and_compact() {
        let set = CategorySet::parse(r#"{"A": ["a1", "a2"], "B": [], "C": ["c1"]}"#, &KeywordTable::new()).unwrap();

        let all: Vec<_> = set.flatten().into_iter().map(|q| q.text).collect();
        assert_eq!(all, vec!["a1", "a2", "c1"]);

        let compact: Vec<_> = set.compact().into_iter().map(|q| q.text).collect();
        assert_eq!(compact, vec!["a1", "c1"]);
    }

    #[test]
    fn test_shuffle_with_seed_is_a_permutation() {
        let original = CategorySet::builtin().unwrap().flatten();

        let mut first = original.clone();
        let mut second = original.clone();
        shuffle(&mut first, Some(7));
        shuffle(&mut second, Some(7));
        assert_eq!(first, second);

        let mut sorted_original: Vec<_> = original.iter().map(|q| q.text.clone()).collect();
        let mut sorted_shuffled: Vec<_> = first.iter().map(|q| q.text.clone()).collect();
        sorted_original.sort();
        sorted_shuffled.sort();
        assert_eq!(sorted_original, sorted_shuffled);
    }

    #[test]
    fn test_category_counts() {
        let questions = vec![
            Question::new("a").with_category("B"),
            Question::new("b").with_category("A"),
            Question::new("c").with_category("B"),
            Question::new("d"),
        ];
        assert_eq!(
            category_counts(&questions),
            vec![("B".to_string(), 2), ("A".to_string(), 1), ("-".to_string(), 1)]
        );
    }
}
