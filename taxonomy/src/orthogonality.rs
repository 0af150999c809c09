//! Advisory orthogonality check between categories.
//!
//! Each category gets a presence vector (its score in every sample
//! document). Pairs whose Pearson correlation exceeds the ceiling are
//! flagged as merge/split candidates. Anti-correlated pairs never co-occur,
//! so they are reported in `pairs` but not flagged. Nothing here blocks
//! activation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::scorer::CorpusScorer;
use crate::types::Category;

/// Default correlation ceiling (5%).
pub const DEFAULT_CORRELATION_CEILING: f64 = 0.05;

/// Correlation between two categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub first: String,
    pub second: String,
    pub correlation: f64,
}

/// Result of an orthogonality check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrthogonalityReport {
    pub ceiling: f64,
    pub sample_size: usize,
    /// Every unordered pair, in axis order
    pub pairs: Vec<CorrelationPair>,
    /// Pairs whose correlation exceeds the ceiling
    pub flagged: Vec<CorrelationPair>,
    /// Highest positive correlation, 0 if none
    pub max_correlation: f64,
}

impl OrthogonalityReport {
    pub fn is_orthogonal(&self) -> bool {
        self.flagged.is_empty()
    }
}

/// Compute pairwise correlations over a sample corpus.
pub fn validate_orthogonality(
    categories: &[Category],
    sample: &[&str],
    scorer: &dyn CorpusScorer,
    ceiling: f64,
) -> OrthogonalityReport {
    let vectors: Vec<Vec<f64>> = categories
        .iter()
        .map(|c| sample.iter().map(|text| scorer.score(c, text)).collect())
        .collect();

    let mut pairs = Vec::new();
    let mut flagged = Vec::new();
    let mut max_correlation: f64 = 0.0;

    for i in 0..categories.len() {
        for j in (i + 1)..categories.len() {
            let correlation = pearson(&vectors[i], &vectors[j]);
            let pair = CorrelationPair {
                first: categories[i].code.clone(),
                second: categories[j].code.clone(),
                correlation,
            };
            max_correlation = max_correlation.max(correlation);
            if correlation > ceiling {
                debug!(
                    first = %pair.first,
                    second = %pair.second,
                    correlation,
                    "Categories exceed correlation ceiling"
                );
                flagged.push(pair.clone());
            }
            pairs.push(pair);
        }
    }

    if !flagged.is_empty() {
        warn!(
            flagged = flagged.len(),
            max_correlation,
            scorer = scorer.name(),
            "Taxonomy is not orthogonal"
        );
    }

    OrthogonalityReport {
        ceiling,
        sample_size: sample.len(),
        pairs,
        flagged,
        max_correlation,
    }
}

/// Pearson correlation; 0 when either side has no variance.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let mean_a = a[..n].iter().sum::<f64>() / n as f64;
    let mean_b = b[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for k in 0..n {
        let da = a[k] - mean_a;
        let db = b[k] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a <= f64::EPSILON || var_b <= f64::EPSILON {
        return 0.0;
    }
    (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{KeywordScorer, KeywordTable};

    fn categories() -> Vec<Category> {
        vec![
            Category::root("A", "security"),
            Category::root("B", "testing"),
            Category::root("C", "auth"),
        ]
    }

    fn scorer() -> KeywordScorer {
        KeywordScorer::new(
            KeywordTable::from_yaml(
                "security: [token, crypto]\ntesting: [test, fixture]\nauth: [token, login]\n",
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_pearson_bounds() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(pearson(&[1.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_overlapping_keywords_are_flagged() {
        let sample = [
            "token crypto token",
            "test fixture test",
            "login token",
            "nothing relevant here",
        ];
        let report = validate_orthogonality(
            &categories(),
            &sample,
            &scorer(),
            DEFAULT_CORRELATION_CEILING,
        );

        assert_eq!(report.pairs.len(), 3);
        assert!(!report.is_orthogonal());
        assert!(report
            .flagged
            .iter()
            .any(|p| p.first == "A" && p.second == "C" && p.correlation > 0.0));
        assert!(report.max_correlation <= 1.0);
    }

    #[test]
    fn test_anti_correlated_pair_is_not_flagged() {
        let security = Category::root("A", "security");
        let testing = Category::root("B", "testing");
        let sample = ["token crypto", "test fixture", "crypto token token", "fixture test test"];
        let report = validate_orthogonality(
            &[security, testing],
            &sample,
            &scorer(),
            DEFAULT_CORRELATION_CEILING,
        );

        assert_eq!(report.pairs.len(), 1);
        assert!(report.pairs[0].correlation < -0.5);
        assert!(report.is_orthogonal());
        assert_eq!(report.max_correlation, 0.0);
    }

    #[test]
    fn test_empty_sample_is_orthogonal() {
        let report = validate_orthogonality(&categories(), &[], &scorer(), 0.05);
        assert!(report.is_orthogonal());
        assert_eq!(report.max_correlation, 0.0);
    }
}
