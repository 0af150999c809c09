//! Permission engine.
//!
//! Ties together identity lookup, requirement lookup, the overlap check and
//! the audit trail. Checks are reads against the latest identity vector and
//! category space; nothing here blocks on external calls.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use taxonomy::TaxonomySnapshot;
use trust_debt::GradeRecord;

use crate::audit::DecisionAuditLog;
use crate::config::PermissionConfig;
use crate::decision::{check_permission_in, PermissionDecision};
use crate::geometry::CategorySpace;
use crate::identity::{IdentityRegistry, IdentityVector};
use crate::requirement::RequirementRegistry;
use crate::types::{PermissionError, Result};

/// Gates actions on identity vectors.
pub struct PermissionEngine {
    config: PermissionConfig,
    requirements: RequirementRegistry,
    identities: IdentityRegistry,
    space: Arc<RwLock<CategorySpace>>,
    audit: DecisionAuditLog,
}

impl PermissionEngine {
    /// Create an engine; the config is validated first.
    pub fn new(config: PermissionConfig) -> Result<Self> {
        config.validate()?;
        let requirements = RequirementRegistry::from_requirements(config.effective_requirements());
        info!(
            actions = requirements.len(),
            threshold = config.threshold,
            mode = config.overlap_mode.as_str(),
            "Permission engine ready"
        );

        Ok(Self {
            audit: DecisionAuditLog::with_max_entries(config.audit_capacity),
            requirements,
            identities: IdentityRegistry::new(),
            space: Arc::new(RwLock::new(CategorySpace::default())),
            config,
        })
    }

    pub fn config(&self) -> &PermissionConfig {
        &self.config
    }

    pub fn requirements(&self) -> &RequirementRegistry {
        &self.requirements
    }

    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    pub fn audit(&self) -> &DecisionAuditLog {
        &self.audit
    }

    /// Project future checks onto the taxonomy's category order.
    pub async fn set_space_from_snapshot(&self, snapshot: &TaxonomySnapshot) {
        let space = CategorySpace::from_snapshot(snapshot);
        debug!(
            categories = space.len(),
            taxonomy_version = snapshot.version,
            "Updated permission category space"
        );
        *self.space.write().await = space;
    }

    pub async fn space(&self) -> CategorySpace {
        self.space.read().await.clone()
    }

    /// Recompute a subject's identity from a grade.
    pub fn refresh_identity(&self, subject: &str, record: &GradeRecord) -> IdentityVector {
        self.identities.refresh_from_grade(subject, record)
    }

    /// Check an identity against a registered action and log the decision.
    pub async fn check(
        &self,
        identity: &IdentityVector,
        action_name: &str,
    ) -> Result<PermissionDecision> {
        let requirement = self
            .requirements
            .get(action_name)
            .ok_or_else(|| PermissionError::UnknownAction(action_name.to_string()))?;

        let decision = {
            let space = self.space.read().await;
            check_permission_in(
                &space,
                identity,
                requirement,
                self.config.threshold,
                self.config.overlap_mode,
            )
        };

        if decision.allowed {
            info!(
                subject = %decision.subject,
                action = %decision.action_name,
                overlap = decision.overlap,
                sovereignty = decision.sovereignty,
                "Permission granted"
            );
        } else {
            warn!(
                subject = %decision.subject,
                action = %decision.action_name,
                overlap = decision.overlap,
                threshold = decision.threshold,
                sovereignty = decision.sovereignty,
                min_sovereignty = decision.min_sovereignty,
                failed = ?decision.failed_categories,
                "Permission denied"
            );
        }

        self.audit.log(&decision).await;
        Ok(decision)
    }

    /// Check a registered subject against a registered action.
    pub async fn authorize(&self, subject: &str, action_name: &str) -> Result<PermissionDecision> {
        let identity = self
            .identities
            .get(subject)
            .ok_or_else(|| PermissionError::UnknownSubject(subject.to_string()))?;
        self.check(&identity, action_name).await
    }
}
