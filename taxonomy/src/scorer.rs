//! Corpus scoring capability.
//!
//! The matrix builder only needs a non-negative presence strength for a
//! (category, document) pair. How that strength is derived is pluggable.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::types::Category;

/// Scores how strongly a category is present in a document.
///
/// Implementations must return a finite value `>= 0` and must be
/// deterministic for identical inputs.
pub trait CorpusScorer: Send + Sync {
    /// Name of the scorer (for logging).
    fn name(&self) -> &str;

    /// Presence strength of `category` in `text`.
    fn score(&self, category: &Category, text: &str) -> f64;
}

/// Keyword table keyed by category name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordTable(pub HashMap<String, Vec<String>>);

impl KeywordTable {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

/// Whole-token keyword matcher.
///
/// Score is keyword hits per 100 tokens of the document. A category with no
/// keyword entry falls back to its own name split on `_`.
pub struct KeywordScorer {
    keywords: HashMap<String, HashSet<String>>,
}

impl KeywordScorer {
    pub fn new(table: KeywordTable) -> Self {
        let keywords = table
            .0
            .into_iter()
            .map(|(name, words)| {
                let words = words.iter().map(|w| w.to_lowercase()).collect();
                (name, words)
            })
            .collect();
        Self { keywords }
    }

    fn keywords_for(&self, category: &Category) -> HashSet<String> {
        match self.keywords.get(&category.name) {
            Some(words) => words.clone(),
            None => category
                .name
                .split('_')
                .filter(|w| !w.is_empty())
                .map(|w| w.to_lowercase())
                .collect(),
        }
    }
}

impl CorpusScorer for KeywordScorer {
    fn name(&self) -> &str {
        "keyword"
    }

    fn score(&self, category: &Category, text: &str) -> f64 {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }
        let keywords = self.keywords_for(category);
        let hits = tokens.iter().filter(|t| keywords.contains(*t)).count();
        hits as f64 * 100.0 / tokens.len() as f64
    }
}

/// Lowercased alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> KeywordScorer {
        KeywordScorer::new(
            KeywordTable::from_yaml("security: [auth, token, encrypt]\ntesting: [test, assert]\n")
                .unwrap(),
        )
    }

    #[test]
    fn test_keyword_hits_per_hundred_tokens() {
        let security = Category::root("A", "security");
        let score = scorer().score(&security, "Auth token refresh; rotate token daily");
        // 3 hits out of 6 tokens
        assert!((score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_whole_token_only() {
        let testing = Category::root("B", "testing");
        assert_eq!(scorer().score(&testing, "contest attestation"), 0.0);
    }

    #[test]
    fn test_name_fallback() {
        let quality = Category::root("C", "code_quality");
        assert!(scorer().score(&quality, "improve quality of the code") > 0.0);
    }

    #[test]
    fn test_empty_text() {
        let security = Category::root("A", "security");
        assert_eq!(scorer().score(&security, "  ...  "), 0.0);
    }
}
