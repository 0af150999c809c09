//! Geometric permission engine.
//!
//! Decides whether a subject may perform an action by comparing its identity
//! vector (derived from Trust Debt grades) against the action's requirement:
//!
//! - **Overlap**: cosine similarity over the category space, clamped to
//!   `[0, 1]`, or the fraction of required categories met
//! - **Sovereignty**: aggregate standing that must reach the action's minimum
//! - **Diagnostics**: every unmet required category is listed, even on allow
//! - **Audit**: every decision is retained in a bounded log
//!
//! # Example
//!
//! ```ignore
//! use permission::{PermissionConfig, PermissionEngine};
//!
//! let engine = PermissionEngine::new(PermissionConfig::default())?;
//! engine.refresh_identity("agent-7", &grade_record);
//! let decision = engine.authorize("agent-7", "git_push").await?;
//! if !decision.allowed {
//!     // refuse the action
//! }
//! ```

pub mod audit;
pub mod config;
pub mod decision;
pub mod engine;
pub mod geometry;
pub mod identity;
pub mod requirement;
pub mod types;

// Re-export main types
pub use audit::{AuditEntry, AuditStats, DecisionAuditLog};
pub use config::{PermissionConfig, DEFAULT_AUDIT_CAPACITY};
pub use decision::{check_permission, check_permission_in, PermissionDecision, DEFAULT_THRESHOLD};
pub use engine::PermissionEngine;
pub use geometry::{
    compute_overlap, compute_overlap_threshold, cosine_similarity, failed_categories,
    CategorySpace,
};
pub use identity::{IdentityRegistry, IdentityVector};
pub use requirement::{default_requirements, PermissionRequirement, RequirementRegistry};
pub use types::*;
