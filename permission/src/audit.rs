//! Audit trail for permission decisions.
//!
//! Every decision the engine returns is logged here, newest first, up to a
//! fixed capacity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::DEFAULT_AUDIT_CAPACITY;
use crate::decision::PermissionDecision;

/// An entry in the audit log.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// Unique entry ID
    pub entry_id: String,
    pub decision: PermissionDecision,
    pub logged_at: DateTime<Utc>,
}

/// Bounded log of permission decisions.
pub struct DecisionAuditLog {
    /// Log entries (newest first)
    entries: Arc<RwLock<VecDeque<AuditEntry>>>,
    max_entries: usize,
}

impl DecisionAuditLog {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_AUDIT_CAPACITY)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            max_entries,
        }
    }

    /// Log a decision and return its entry ID.
    pub async fn log(&self, decision: &PermissionDecision) -> String {
        let entry = AuditEntry {
            entry_id: uuid::Uuid::new_v4().to_string(),
            decision: decision.clone(),
            logged_at: Utc::now(),
        };
        let entry_id = entry.entry_id.clone();

        let mut entries = self.entries.write().await;
        entries.push_front(entry);

        // Prune if over limit
        while entries.len() > self.max_entries {
            entries.pop_back();
        }

        entry_id
    }

    pub async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries.iter().take(limit).cloned().collect()
    }

    pub async fn by_subject(&self, subject: &str, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| e.decision.subject == subject)
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn by_action(&self, action_name: &str, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| e.decision.action_name == action_name)
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn stats(&self) -> AuditStats {
        let entries = self.entries.read().await;

        let total = entries.len();
        let allowed = entries.iter().filter(|e| e.decision.allowed).count();
        let overlap_failures = entries
            .iter()
            .filter(|e| !e.decision.overlap_passed())
            .count();
        let sovereignty_failures = entries
            .iter()
            .filter(|e| !e.decision.sovereignty_passed())
            .count();

        let avg_overlap = if total > 0 {
            entries.iter().map(|e| e.decision.overlap).sum::<f64>() / total as f64
        } else {
            0.0
        };

        AuditStats {
            total_decisions: total,
            allowed,
            denied: total - allowed,
            overlap_failures,
            sovereignty_failures,
            avg_overlap,
        }
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for DecisionAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics from the audit log.
#[derive(Debug, Clone, Serialize)]
pub struct AuditStats {
    pub total_decisions: usize,
    pub allowed: usize,
    pub denied: usize,
    /// Denied at least partly on overlap
    pub overlap_failures: usize,
    /// Denied at least partly on sovereignty
    pub sovereignty_failures: usize,
    pub avg_overlap: f64,
}
