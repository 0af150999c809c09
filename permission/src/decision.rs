//! Permission decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{compute_overlap, compute_overlap_threshold, failed_categories, CategorySpace};
use crate::identity::IdentityVector;
use crate::requirement::PermissionRequirement;
use crate::types::{DenialReason, OverlapMode};

/// Default overlap an identity must reach.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Outcome of checking one identity against one requirement.
///
/// `allowed` is exactly `overlap >= threshold && sovereignty >= min_sovereignty`.
/// `failed_categories` is diagnostic only and may be non-empty on an allowed
/// decision; `denial_reasons` is empty if and only if the decision allows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionDecision {
    pub action_name: String,
    pub subject: String,
    pub allowed: bool,
    pub overlap: f64,
    pub threshold: f64,
    pub sovereignty: f64,
    pub min_sovereignty: f64,
    /// Required categories the identity does not individually meet
    pub failed_categories: Vec<String>,
    pub denial_reasons: Vec<DenialReason>,
    pub mode: OverlapMode,
    pub timestamp: DateTime<Utc>,
}

impl PermissionDecision {
    pub fn overlap_passed(&self) -> bool {
        self.overlap >= self.threshold
    }

    pub fn sovereignty_passed(&self) -> bool {
        self.sovereignty >= self.min_sovereignty
    }
}

/// Cosine check over the space the identity and requirement themselves span.
pub fn check_permission(
    identity: &IdentityVector,
    requirement: &PermissionRequirement,
    threshold: f64,
) -> PermissionDecision {
    check_permission_in(
        &CategorySpace::default(),
        identity,
        requirement,
        threshold,
        OverlapMode::Cosine,
    )
}

/// Check an identity against a requirement in the given space and mode.
pub fn check_permission_in(
    space: &CategorySpace,
    identity: &IdentityVector,
    requirement: &PermissionRequirement,
    threshold: f64,
    mode: OverlapMode,
) -> PermissionDecision {
    let overlap = match mode {
        OverlapMode::Cosine => compute_overlap(space, identity, requirement),
        OverlapMode::Threshold => compute_overlap_threshold(identity, requirement),
    };
    let sovereignty = identity.sovereignty_score;

    let mut denial_reasons = Vec::new();
    if overlap < threshold {
        denial_reasons.push(DenialReason::OverlapBelowThreshold);
    }
    if sovereignty < requirement.min_sovereignty {
        denial_reasons.push(DenialReason::SovereigntyBelowMinimum);
    }

    PermissionDecision {
        action_name: requirement.action_name.clone(),
        subject: identity.subject.clone(),
        allowed: denial_reasons.is_empty(),
        overlap,
        threshold,
        sovereignty,
        min_sovereignty: requirement.min_sovereignty,
        failed_categories: failed_categories(identity, requirement),
        denial_reasons,
        mode,
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(scores: &[(&str, f64)], sovereignty: f64) -> IdentityVector {
        IdentityVector::new(
            "agent",
            scores.iter().map(|(n, s)| (n.to_string(), *s)),
            sovereignty,
        )
    }

    fn git_push() -> PermissionRequirement {
        PermissionRequirement::new("git_push")
            .require("code_quality", 0.7)
            .require("testing", 0.6)
            .require("security", 0.5)
            .min_sovereignty(0.7)
    }

    #[test]
    fn test_well_rounded_identity_may_push() {
        let id = identity(
            &[
                ("security", 0.9),
                ("reliability", 0.9),
                ("code_quality", 0.8),
                ("testing", 0.7),
            ],
            0.9,
        );
        let decision = check_permission(&id, &git_push(), DEFAULT_THRESHOLD);
        assert!(decision.allowed);
        assert!(decision.overlap > 0.8 && decision.overlap < 0.85);
        assert!(decision.failed_categories.is_empty());
        assert!(decision.denial_reasons.is_empty());
    }

    #[test]
    fn test_missing_category_is_reported() {
        let id = identity(&[("security", 0.9), ("reliability", 0.9), ("testing", 0.7)], 0.9);

        let cosine = check_permission(&id, &git_push(), DEFAULT_THRESHOLD);
        assert!(!cosine.allowed);
        assert_eq!(cosine.failed_categories, vec!["code_quality"]);
        assert_eq!(cosine.denial_reasons, vec![DenialReason::OverlapBelowThreshold]);

        // Two of three requirements met clears a lower bar, but the gap is still listed.
        let threshold = check_permission_in(
            &CategorySpace::default(),
            &id,
            &git_push(),
            0.5,
            OverlapMode::Threshold,
        );
        assert!(threshold.allowed);
        assert_eq!(threshold.failed_categories, vec!["code_quality"]);
    }

    #[test]
    fn test_sovereignty_gates_independently() {
        let id = identity(&[("code_quality", 0.7), ("testing", 0.6), ("security", 0.5)], 0.4);
        let decision = check_permission(&id, &git_push(), DEFAULT_THRESHOLD);
        assert!(decision.overlap_passed());
        assert!(!decision.sovereignty_passed());
        assert!(!decision.allowed);
        assert_eq!(decision.denial_reasons, vec![DenialReason::SovereigntyBelowMinimum]);
    }

    #[test]
    fn test_allowed_matches_both_conditions() {
        let space = CategorySpace::new(
            ["security", "testing", "code_quality"].map(String::from),
        );
        let levels = [0.0, 0.3, 0.6, 0.9];
        for &s in &levels {
            for &t in &levels {
                for &sov in &levels {
                    for mode in [OverlapMode::Cosine, OverlapMode::Threshold] {
                        let id = identity(&[("security", s), ("testing", t)], sov);
                        let d = check_permission_in(&space, &id, &git_push(), 0.6, mode);
                        assert_eq!(
                            d.allowed,
                            d.overlap >= d.threshold && d.sovereignty >= d.min_sovereignty
                        );
                        assert_eq!(d.allowed, d.denial_reasons.is_empty());
                    }
                }
            }
        }
    }
}
