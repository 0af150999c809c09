//! Versioned taxonomy store.
//!
//! Holds every category record ever registered plus the ordered active set.
//! Matrix builds read an immutable [`TaxonomySnapshot`]; rebalance swaps the
//! active set inside a single write section, so a reader sees either the
//! whole old set or the whole new one.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::types::{
    Category, CategoryRecord, CategoryRef, CategoryStatus, ChangeKind, RebalanceEntry, StableId,
};
use crate::validation::{validate_categories, ValidationError};

/// Error types for taxonomy store operations.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    /// Category set failed ordering or structure validation
    #[error("Taxonomy validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Rebalance tried to reuse an existing stable id
    #[error("Stable id {0} already exists; rebalance must create new records")]
    StableIdReused(String),

    /// Rebalance with no categories
    #[error("Rebalance requires at least one category")]
    EmptyRebalance,

    /// Rebalance without justification
    #[error("Rebalance requires a reason")]
    MissingReason,
}

pub type Result<T> = std::result::Result<T, TaxonomyError>;

/// Immutable view of the active category set at one version.
#[derive(Debug, Clone)]
pub struct TaxonomySnapshot {
    pub version: u64,
    pub categories: Arc<Vec<Category>>,
    /// SHA-256 over the ordered (stable id, code) pairs
    pub fingerprint: String,
    pub taken_at: DateTime<Utc>,
}

impl TaxonomySnapshot {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Axis labels in active order.
    pub fn axis(&self) -> Vec<CategoryRef> {
        self.categories.iter().map(Category::to_ref).collect()
    }

    /// Category names in active order.
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// Position of a category on the axis.
    pub fn index_of(&self, stable_id: &StableId) -> Option<usize> {
        self.categories.iter().position(|c| &c.stable_id == stable_id)
    }
}

/// Outcome of a successful rebalance.
#[derive(Debug, Clone)]
pub struct RebalanceResult {
    pub previous_version: u64,
    pub version: u64,
    pub entries: Vec<RebalanceEntry>,
}

impl RebalanceResult {
    pub fn count(&self, change: ChangeKind) -> usize {
        self.entries.iter().filter(|e| e.change == change).count()
    }
}

struct TaxonomyState {
    version: u64,
    /// Active set in ShortLex order
    active: Vec<StableId>,
    records: HashMap<StableId, CategoryRecord>,
    /// Old stable id -> the record that replaced it
    successors: HashMap<StableId, StableId>,
    history: Vec<RebalanceEntry>,
}

impl TaxonomyState {
    fn active_categories(&self) -> Vec<Category> {
        self.active
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| r.category.clone()))
            .collect()
    }
}

/// Injectable store for the category taxonomy.
pub struct TaxonomyStore {
    state: Arc<RwLock<TaxonomyState>>,
}

impl TaxonomyStore {
    /// Create an empty store at version 0.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(TaxonomyState {
                version: 0,
                active: Vec::new(),
                records: HashMap::new(),
                successors: HashMap::new(),
                history: Vec::new(),
            })),
        }
    }

    /// Add categories to the active set.
    ///
    /// The combined set (current active set followed by `categories`) must
    /// pass validation as a whole.
    pub async fn register(&self, categories: Vec<Category>) -> Result<TaxonomySnapshot> {
        let mut state = self.state.write().await;

        for category in &categories {
            if state.records.contains_key(&category.stable_id) {
                return Err(TaxonomyError::StableIdReused(category.stable_id.to_string()));
            }
        }

        let mut combined = state.active_categories();
        combined.extend(categories.iter().cloned());
        if let Err(e) = validate_categories(&combined) {
            warn!(error = %e, "Rejected taxonomy registration");
            return Err(e.into());
        }

        state.version += 1;
        let version = state.version;
        let now = Utc::now();
        for category in categories {
            let id = category.stable_id.clone();
            state.active.push(id.clone());
            state.records.insert(
                id,
                CategoryRecord {
                    category,
                    status: CategoryStatus::Active,
                    activated_in: version,
                    retired_in: None,
                    registered_at: now,
                    retired_at: None,
                },
            );
        }

        info!(
            version,
            active = state.active.len(),
            "Registered taxonomy categories"
        );
        Ok(Self::snapshot_of(&state))
    }

    /// Replace the active set with `new_categories`.
    ///
    /// Old records are retired, not deleted. Carried-over categories are
    /// matched by name and linked as successors.
    pub async fn rebalance(
        &self,
        new_categories: Vec<Category>,
        reason: &str,
    ) -> Result<RebalanceResult> {
        if new_categories.is_empty() {
            return Err(TaxonomyError::EmptyRebalance);
        }
        if reason.trim().is_empty() {
            return Err(TaxonomyError::MissingReason);
        }
        validate_categories(&new_categories)?;

        let mut state = self.state.write().await;

        for category in &new_categories {
            if state.records.contains_key(&category.stable_id) {
                return Err(TaxonomyError::StableIdReused(category.stable_id.to_string()));
            }
        }

        let previous_version = state.version;
        let version = previous_version + 1;
        let now = Utc::now();

        let old_active = state.active_categories();
        let old_by_name: HashMap<&str, &Category> =
            old_active.iter().map(|c| (c.name.as_str(), c)).collect();

        let mut entries = Vec::new();
        let mut successors = Vec::new();

        for category in &new_categories {
            match old_by_name.get(category.name.as_str()) {
                Some(old) => {
                    successors.push((old.stable_id.clone(), category.stable_id.clone()));
                    if old.code != category.code {
                        entries.push(RebalanceEntry {
                            stable_id_old: Some(old.stable_id.clone()),
                            stable_id_new: Some(category.stable_id.clone()),
                            old_code: Some(old.code.clone()),
                            new_code: Some(category.code.clone()),
                            change: ChangeKind::Recoded,
                            reason: reason.to_string(),
                            version,
                            timestamp: now,
                        });
                    }
                }
                None => entries.push(RebalanceEntry {
                    stable_id_old: None,
                    stable_id_new: Some(category.stable_id.clone()),
                    old_code: None,
                    new_code: Some(category.code.clone()),
                    change: ChangeKind::Added,
                    reason: reason.to_string(),
                    version,
                    timestamp: now,
                }),
            }
        }

        for old in &old_active {
            if !new_categories.iter().any(|c| c.name == old.name) {
                entries.push(RebalanceEntry {
                    stable_id_old: Some(old.stable_id.clone()),
                    stable_id_new: None,
                    old_code: Some(old.code.clone()),
                    new_code: None,
                    change: ChangeKind::Retired,
                    reason: reason.to_string(),
                    version,
                    timestamp: now,
                });
            }
        }

        // Nothing above mutates state, so a failure earlier leaves the old set active.
        for id in std::mem::take(&mut state.active) {
            if let Some(record) = state.records.get_mut(&id) {
                record.status = CategoryStatus::Inactive;
                record.retired_in = Some(version);
                record.retired_at = Some(now);
            }
        }
        for category in new_categories {
            let id = category.stable_id.clone();
            state.active.push(id.clone());
            state.records.insert(
                id,
                CategoryRecord {
                    category,
                    status: CategoryStatus::Active,
                    activated_in: version,
                    retired_in: None,
                    registered_at: now,
                    retired_at: None,
                },
            );
        }
        for (old, new) in successors {
            state.successors.insert(old, new);
        }
        state.history.extend(entries.iter().cloned());
        state.version = version;

        info!(
            previous_version,
            version,
            changes = entries.len(),
            reason = %reason,
            "Rebalanced taxonomy"
        );

        Ok(RebalanceResult {
            previous_version,
            version,
            entries,
        })
    }

    /// Consistent view of the active set.
    pub async fn snapshot(&self) -> TaxonomySnapshot {
        let state = self.state.read().await;
        Self::snapshot_of(&state)
    }

    /// Look up any record, active or retired.
    pub async fn resolve(&self, stable_id: &StableId) -> Option<CategoryRecord> {
        let state = self.state.read().await;
        state.records.get(stable_id).cloned()
    }

    /// Follow successor links to the record that is active today.
    pub async fn successor(&self, stable_id: &StableId) -> Option<CategoryRecord> {
        let state = self.state.read().await;
        let mut current = stable_id;
        // Successor chains are acyclic: every hop targets a record created later.
        while let Some(next) = state.successors.get(current) {
            current = next;
        }
        let record = state.records.get(current)?;
        debug!(from = %stable_id, to = %current, "Resolved successor");
        record.is_active().then(|| record.clone())
    }

    /// All rebalance entries, oldest first.
    pub async fn history(&self) -> Vec<RebalanceEntry> {
        let state = self.state.read().await;
        state.history.clone()
    }

    /// All retired records.
    pub async fn inactive(&self) -> Vec<CategoryRecord> {
        let state = self.state.read().await;
        let mut records: Vec<_> = state
            .records
            .values()
            .filter(|r| !r.is_active())
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.retired_in
                .cmp(&b.retired_in)
                .then_with(|| crate::types::shortlex_cmp(&a.category.code, &b.category.code))
        });
        records
    }

    pub async fn version(&self) -> u64 {
        self.state.read().await.version
    }

    fn snapshot_of(state: &TaxonomyState) -> TaxonomySnapshot {
        let categories = state.active_categories();
        TaxonomySnapshot {
            version: state.version,
            fingerprint: fingerprint(&categories),
            categories: Arc::new(categories),
            taken_at: Utc::now(),
        }
    }
}

impl Default for TaxonomyStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the fingerprint of an ordered category set.
pub fn fingerprint(categories: &[Category]) -> String {
    let mut hasher = Sha256::new();
    for category in categories {
        hasher.update(category.stable_id.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(category.code.as_bytes());
        hasher.update(b";");
    }
    hex::encode(hasher.finalize())
}
