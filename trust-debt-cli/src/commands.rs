//! Subcommand implementations.
//!
//! Each command returns a serializable report; `main` prints it as JSON.

use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use permission::{PermissionDecision, PermissionEngine, PermissionError, PermissionRequirement};
use taxonomy::{
    validate_orthogonality, Category, KeywordScorer, KeywordTable, OrthogonalityReport,
    TaxonomyStore,
};
use trust_debt::{
    CategoryHealth, CorpusDocument, Grade, GradeHistory, GradeRecord, Pipeline, PipelineOutcome,
    TimelinePoint, Trend,
};

use crate::args::Args;
use crate::settings::Settings;

/// Result of `grade`.
#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub record_id: String,
    pub grade: Grade,
    pub total_units: f64,
    pub upper_sum: f64,
    pub lower_sum: f64,
    pub diagonal_sum: f64,
    pub taxonomy_version: u64,
    pub taxonomy_fingerprint: Option<String>,
    pub intent_documents: usize,
    pub reality_documents: usize,
    pub category_health: Vec<CategoryHealth>,
    pub trend: Trend,
}

/// Result of `check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub record_id: String,
    /// Whether the grade was read from history rather than measured now
    pub from_history: bool,
    pub grade: Grade,
    pub total_units: f64,
    pub decision: PermissionDecision,
}

/// Result of `history`.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryReport {
    pub records: usize,
    pub timeline: Vec<TimelinePoint>,
    pub trend: Trend,
}

/// Read an ordered category list.
pub fn load_taxonomy(path: &Path) -> anyhow::Result<Vec<Category>> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("reading taxonomy {}", path.display()))?;
    let categories: Vec<Category> = serde_yaml::from_str(&yaml)
        .with_context(|| format!("parsing taxonomy {}", path.display()))?;
    Ok(categories)
}

/// Build the keyword scorer; an absent table falls back to category names.
pub fn load_scorer(path: Option<&Path>) -> anyhow::Result<KeywordScorer> {
    let table = match path {
        Some(path) => {
            let yaml = std::fs::read_to_string(path)
                .with_context(|| format!("reading keywords {}", path.display()))?;
            KeywordTable::from_yaml(&yaml)
                .with_context(|| format!("parsing keywords {}", path.display()))?
        }
        None => KeywordTable::default(),
    };
    Ok(KeywordScorer::new(table))
}

fn load_corpus(path: &Path) -> anyhow::Result<Vec<CorpusDocument>> {
    CorpusDocument::load_jsonl(path).with_context(|| format!("reading corpus {}", path.display()))
}

fn open_history(path: Option<&Path>) -> anyhow::Result<GradeHistory> {
    match path {
        Some(path) => GradeHistory::with_sink(path)
            .with_context(|| format!("opening history {}", path.display())),
        None => Ok(GradeHistory::new()),
    }
}

async fn register_taxonomy(args: &Args) -> anyhow::Result<TaxonomyStore> {
    let store = TaxonomyStore::new();
    store
        .register(load_taxonomy(&args.taxonomy)?)
        .await
        .context("registering taxonomy")?;
    Ok(store)
}

/// Run one measurement against the active taxonomy. Nothing is recorded.
async fn measure(
    args: &Args,
    settings: &Settings,
    store: &TaxonomyStore,
) -> anyhow::Result<PipelineOutcome> {
    let documents = load_corpus(&args.corpus)?;
    let scorer = load_scorer(args.keywords.as_deref())?;
    let pipeline = Pipeline::new(settings.trust_debt.clone())?;
    Ok(pipeline.run(store, &documents, &scorer).await?)
}

/// Latest recorded grade taken under the given taxonomy fingerprint.
fn latest_recorded(path: Option<&Path>, fingerprint: &str) -> anyhow::Result<Option<GradeRecord>> {
    let Some(path) = path.filter(|p| p.exists()) else {
        return Ok(None);
    };
    let records = GradeHistory::load_jsonl(path)
        .with_context(|| format!("reading history {}", path.display()))?;
    let latest = records.into_iter().last();
    Ok(latest.filter(|r| r.taxonomy_fingerprint.as_deref() == Some(fingerprint)))
}

pub async fn grade(args: &Args, settings: &Settings) -> anyhow::Result<GradeReport> {
    let store = register_taxonomy(args).await?;
    let outcome = measure(args, settings, &store).await?;
    let history = open_history(args.history.as_deref())?;
    history.append(outcome.record.clone()).await?;
    let record = outcome.record;

    info!(
        grade = %record.grade,
        total_units = record.total_units,
        categories = record.category_health.len(),
        "Graded corpus"
    );

    Ok(GradeReport {
        record_id: record.id,
        grade: record.grade,
        total_units: record.total_units,
        upper_sum: record.upper_sum,
        lower_sum: record.lower_sum,
        diagonal_sum: record.diagonal_sum,
        taxonomy_version: record.taxonomy_version,
        taxonomy_fingerprint: record.taxonomy_fingerprint,
        intent_documents: outcome.intent.document_count,
        reality_documents: outcome.reality.document_count,
        category_health: record.category_health,
        trend: history.trend().await,
    })
}

/// Authorize `subject` for `action` against the latest recorded grade.
///
/// Measures afresh when history is absent or was taken under another taxonomy.
/// Never writes history.
pub async fn check(
    args: &Args,
    settings: &Settings,
    subject: &str,
    action: &str,
) -> anyhow::Result<CheckReport> {
    let engine = PermissionEngine::new(settings.permission.clone())?;
    if engine.requirements().get(action).is_none() {
        return Err(PermissionError::UnknownAction(action.to_string()).into());
    }

    let store = register_taxonomy(args).await?;
    let snapshot = store.snapshot().await;
    let (record, from_history) =
        match latest_recorded(args.history.as_deref(), &snapshot.fingerprint)? {
            Some(record) => (record, true),
            None => (measure(args, settings, &store).await?.record, false),
        };
    debug!(record_id = %record.id, from_history, "Grade selected for check");

    engine.set_space_from_snapshot(&snapshot).await;
    engine.refresh_identity(subject, &record);
    let decision = engine.authorize(subject, action).await?;

    Ok(CheckReport {
        record_id: record.id,
        from_history,
        grade: record.grade,
        total_units: record.total_units,
        decision,
    })
}

pub fn orthogonality(args: &Args, settings: &Settings) -> anyhow::Result<OrthogonalityReport> {
    let categories = load_taxonomy(&args.taxonomy)?;
    taxonomy::validate_categories(&categories).context("validating taxonomy")?;

    let documents = load_corpus(&args.corpus)?;
    let sample: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
    let scorer = load_scorer(args.keywords.as_deref())?;

    Ok(validate_orthogonality(
        &categories,
        &sample,
        &scorer,
        settings.trust_debt.taxonomy.correlation_ceiling,
    ))
}

pub async fn history(path: &Path) -> anyhow::Result<HistoryReport> {
    let history = open_history(Some(path))?;
    Ok(HistoryReport {
        records: history.len().await,
        timeline: history.timeline().await,
        trend: history.trend().await,
    })
}

pub fn actions(settings: &Settings) -> Vec<PermissionRequirement> {
    let mut requirements = settings.permission.effective_requirements();
    requirements.sort_by(|a, b| a.action_name.cmp(&b.action_name));
    requirements
}
