//! Vector geometry over the category space.
//!
//! Identities and requirements are sparse maps keyed by category name. Both
//! are projected onto one ordered [`CategorySpace`] before comparison;
//! anything missing reads as 0.

use std::collections::{BTreeSet, HashSet};

use taxonomy::TaxonomySnapshot;

use crate::identity::IdentityVector;
use crate::requirement::PermissionRequirement;

/// Ordered list of category names that vectors are projected onto.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySpace {
    names: Vec<String>,
}

impl CategorySpace {
    /// Space over the given names; later duplicates are dropped.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();
        Self { names }
    }

    /// Space in taxonomy order.
    pub fn from_snapshot(snapshot: &TaxonomySnapshot) -> Self {
        Self::new(snapshot.names())
    }

    /// This space extended by every name the identity or requirement mentions.
    ///
    /// Extra names are appended in lexicographic order so the projection is
    /// the same regardless of map iteration order.
    pub fn covering(&self, identity: &IdentityVector, requirement: &PermissionRequirement) -> Self {
        let known: HashSet<&str> = self.names.iter().map(String::as_str).collect();
        let extra: BTreeSet<&String> = identity
            .scores
            .keys()
            .chain(requirement.required_scores.keys())
            .filter(|name| !known.contains(name.as_str()))
            .collect();

        let mut names = self.names.clone();
        names.extend(extra.into_iter().cloned());
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn identity_vector(&self, identity: &IdentityVector) -> Vec<f64> {
        self.names.iter().map(|name| identity.score(name)).collect()
    }

    pub fn requirement_vector(&self, requirement: &PermissionRequirement) -> Vec<f64> {
        self.names
            .iter()
            .map(|name| requirement.required(name))
            .collect()
    }
}

/// Cosine of the angle between two vectors.
///
/// Returns 0 when either side has zero magnitude. Vectors of different
/// lengths are compared over their common prefix.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 || !dot.is_finite() {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Geometric overlap in `[0, 1]`; opposing alignment counts as none.
pub fn compute_overlap(
    space: &CategorySpace,
    identity: &IdentityVector,
    requirement: &PermissionRequirement,
) -> f64 {
    let space = space.covering(identity, requirement);
    cosine_similarity(
        &space.identity_vector(identity),
        &space.requirement_vector(requirement),
    )
    .max(0.0)
}

/// Fraction of required categories the identity individually meets.
///
/// A requirement that names no categories is fully met.
pub fn compute_overlap_threshold(
    identity: &IdentityVector,
    requirement: &PermissionRequirement,
) -> f64 {
    let required = requirement.required_scores.len();
    if required == 0 {
        return 1.0;
    }
    let met = requirement
        .required_scores
        .iter()
        .filter(|(name, min)| identity.score(name) >= **min)
        .count();
    met as f64 / required as f64
}

/// Required categories where the identity falls short, in name order.
pub fn failed_categories(
    identity: &IdentityVector,
    requirement: &PermissionRequirement,
) -> Vec<String> {
    requirement
        .required_scores
        .iter()
        .filter(|(name, min)| identity.score(name) < **min)
        .map(|(name, _)| name.clone())
        .collect()
}
