//! Identity vectors.
//!
//! An identity vector is derived from a grade record: one health score per
//! category plus an aggregate sovereignty score. It is recomputed on demand
//! and never edited by hand.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use trust_debt::GradeRecord;

/// Per-subject standing across categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityVector {
    pub subject: String,
    /// Category name -> score in `[0, 1]`
    pub scores: BTreeMap<String, f64>,
    /// Aggregate standing in `[0, 1]`
    pub sovereignty_score: f64,
    /// Grade record this vector was derived from
    pub source_record: Option<String>,
    pub computed_at: DateTime<Utc>,
}

impl IdentityVector {
    /// Build from explicit scores; every value is clamped to `[0, 1]`.
    pub fn new(
        subject: impl Into<String>,
        scores: impl IntoIterator<Item = (String, f64)>,
        sovereignty_score: f64,
    ) -> Self {
        Self {
            subject: subject.into(),
            scores: scores
                .into_iter()
                .map(|(name, score)| (name, clamp_unit(score)))
                .collect(),
            sovereignty_score: clamp_unit(sovereignty_score),
            source_record: None,
            computed_at: Utc::now(),
        }
    }

    /// Derive from a grade's per-category breakdown.
    ///
    /// Sovereignty is the weight-averaged category health.
    pub fn from_grade(subject: impl Into<String>, record: &GradeRecord) -> Self {
        let scores: BTreeMap<String, f64> = record
            .category_health
            .iter()
            .map(|h| (h.name.clone(), clamp_unit(h.score)))
            .collect();

        let total_weight: f64 = record.category_health.iter().map(|h| h.weight).sum();
        let sovereignty_score = if total_weight > 0.0 {
            record
                .category_health
                .iter()
                .map(|h| clamp_unit(h.score) * h.weight)
                .sum::<f64>()
                / total_weight
        } else {
            0.0
        };

        Self {
            subject: subject.into(),
            scores,
            sovereignty_score: clamp_unit(sovereignty_score),
            source_record: Some(record.id.clone()),
            computed_at: Utc::now(),
        }
    }

    /// Score for a category; absent categories read as 0.
    pub fn score(&self, category: &str) -> f64 {
        self.scores.get(category).copied().unwrap_or(0.0)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Identity vectors keyed by subject.
pub struct IdentityRegistry {
    identities: DashMap<String, IdentityVector>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self {
            identities: DashMap::new(),
        }
    }

    /// Insert or replace a subject's vector.
    pub fn upsert(&self, identity: IdentityVector) {
        self.identities.insert(identity.subject.clone(), identity);
    }

    /// Recompute a subject's vector from the latest grade.
    pub fn refresh_from_grade(&self, subject: &str, record: &GradeRecord) -> IdentityVector {
        let identity = IdentityVector::from_grade(subject, record);
        debug!(
            subject = %subject,
            sovereignty = identity.sovereignty_score,
            record_id = %record.id,
            "Refreshed identity vector"
        );
        self.upsert(identity.clone());
        identity
    }

    pub fn get(&self, subject: &str) -> Option<IdentityVector> {
        self.identities.get(subject).map(|i| i.clone())
    }

    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self.identities.iter().map(|e| e.key().clone()).collect();
        subjects.sort();
        subjects
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxonomy::StableId;
    use trust_debt::{CategoryHealth, Grade};

    fn health(name: &str, weight: f64, score: f64) -> CategoryHealth {
        CategoryHealth {
            stable_id: StableId::generate(),
            code: name[..1].to_uppercase(),
            name: name.to_string(),
            weight,
            debt: 0.0,
            score,
        }
    }

    fn record() -> GradeRecord {
        GradeRecord {
            id: "grade-1".to_string(),
            total_units: 120.0,
            grade: Grade::A,
            upper_sum: 60.0,
            lower_sum: 40.0,
            diagonal_sum: 20.0,
            category_health: vec![health("security", 3.0, 0.9), health("testing", 1.0, 0.5)],
            taxonomy_version: 1,
            taxonomy_fingerprint: None,
            computed_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_grade() {
        let identity = IdentityVector::from_grade("alice", &record());
        assert_eq!(identity.score("security"), 0.9);
        assert_eq!(identity.score("testing"), 0.5);
        assert_eq!(identity.score("docs"), 0.0);
        // (0.9 * 3 + 0.5 * 1) / 4
        assert!((identity.sovereignty_score - 0.8).abs() < 1e-12);
        assert_eq!(identity.source_record.as_deref(), Some("grade-1"));
    }

    #[test]
    fn test_scores_are_clamped() {
        let identity = IdentityVector::new(
            "bob",
            [("security".to_string(), 1.4), ("testing".to_string(), -0.2)],
            f64::NAN,
        );
        assert_eq!(identity.score("security"), 1.0);
        assert_eq!(identity.score("testing"), 0.0);
        assert_eq!(identity.sovereignty_score, 0.0);
    }

    #[test]
    fn test_registry() {
        let registry = IdentityRegistry::new();
        assert!(registry.get("alice").is_none());

        registry.refresh_from_grade("alice", &record());
        registry.upsert(IdentityVector::new("bob", Vec::<(String, f64)>::new(), 0.1));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.subjects(), vec!["alice", "bob"]);
        assert_eq!(registry.get("bob").unwrap().sovereignty_score, 0.1);
    }
}
