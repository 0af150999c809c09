//! One measurement run: snapshot, build, grade.

use tracing::{info, warn};

use taxonomy::{CorpusScorer, TaxonomySnapshot, TaxonomyStore};

use crate::config::TrustDebtConfig;
use crate::corpus::CorpusDocument;
use crate::grading::{GradeRecord, GradingEngine};
use crate::matrix::{MatrixBuilder, PresenceMatrix, TrustDebtMatrix};
use crate::types::{Result, Role, TrustDebtError};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub snapshot: TaxonomySnapshot,
    pub intent: PresenceMatrix,
    pub reality: PresenceMatrix,
    pub matrix: TrustDebtMatrix,
    pub record: GradeRecord,
}

/// Taxonomy read → matrix build → grade.
pub struct Pipeline {
    builder: MatrixBuilder,
    grading: GradingEngine,
}

impl Pipeline {
    pub fn new(config: TrustDebtConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            builder: MatrixBuilder::new(config.matrix),
            grading: GradingEngine::new(config.grading),
        })
    }

    pub fn builder(&self) -> &MatrixBuilder {
        &self.builder
    }

    pub fn grading(&self) -> &GradingEngine {
        &self.grading
    }

    /// Run against the store's active set.
    ///
    /// The snapshot is taken once at the start; a concurrent rebalance does
    /// not affect this run.
    pub async fn run(
        &self,
        store: &TaxonomyStore,
        documents: &[CorpusDocument],
        scorer: &dyn CorpusScorer,
    ) -> Result<PipelineOutcome> {
        let snapshot = store.snapshot().await;
        self.run_on_snapshot(snapshot, documents, scorer)
    }

    /// Run against an already-taken snapshot.
    pub fn run_on_snapshot(
        &self,
        snapshot: TaxonomySnapshot,
        documents: &[CorpusDocument],
        scorer: &dyn CorpusScorer,
    ) -> Result<PipelineOutcome> {
        if snapshot.is_empty() {
            return Err(TrustDebtError::ConfigError(
                "taxonomy has no active categories".to_string(),
            ));
        }

        let categories = snapshot.categories.as_slice();
        let intent =
            self.builder
                .build_presence_matrix(Role::Intent, categories, documents, scorer)?;
        let reality =
            self.builder
                .build_presence_matrix(Role::Reality, categories, documents, scorer)?;

        if intent.document_count == 0 {
            warn!("No intent documents; every documented relationship reads as missing");
        }
        if reality.document_count == 0 {
            warn!("No reality documents; every implemented relationship reads as missing");
        }

        let matrix = self
            .builder
            .build_trust_debt_matrix(&intent, &reality)?
            .with_taxonomy_fingerprint(snapshot.fingerprint.clone());
        let record = self.grading.grade(&matrix)?.with_taxonomy(&snapshot);

        info!(
            taxonomy_version = snapshot.version,
            categories = snapshot.len(),
            grade = %record.grade,
            total_units = record.total_units,
            "Trust Debt run complete"
        );

        Ok(PipelineOutcome {
            snapshot,
            intent,
            reality,
            matrix,
            record,
        })
    }
}
