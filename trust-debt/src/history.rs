//! Append-only grade history.
//!
//! Records are never edited or removed. An optional JSONL sink mirrors every
//! append to disk so the timeline survives across runs.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::grading::{Grade, GradeRecord};
use crate::types::Result;

/// Direction of the last two grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Debt went down
    Improving,
    /// Debt went up
    Degrading,
    /// Debt unchanged
    Stable,
    /// Fewer than two records
    Insufficient,
}

/// Trend between the two most recent records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    /// Latest minus previous total units
    pub delta_units: f64,
    pub previous_grade: Option<Grade>,
    pub latest_grade: Option<Grade>,
}

/// Point on the grade timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub computed_at: chrono::DateTime<chrono::Utc>,
    pub total_units: f64,
    pub grade: Grade,
    pub taxonomy_version: u64,
}

struct HistoryInner {
    records: Vec<GradeRecord>,
    sink: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

/// Append-only sequence of grade records.
#[derive(Clone)]
pub struct GradeHistory {
    inner: Arc<RwLock<HistoryInner>>,
}

impl GradeHistory {
    /// In-memory history.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HistoryInner {
                records: Vec::new(),
                sink: None,
                path: None,
            })),
        }
    }

    /// History backed by a JSONL file; existing records are loaded first.
    pub fn with_sink(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            Self::load_jsonl(&path)?
        } else {
            Vec::new()
        };
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        info!(
            path = %path.display(),
            records = records.len(),
            "Grade history opened"
        );
        Ok(Self {
            inner: Arc::new(RwLock::new(HistoryInner {
                records,
                sink: Some(BufWriter::new(file)),
                path: Some(path),
            })),
        })
    }

    /// Read records from a JSONL file.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Vec<GradeRecord>> {
        let file = File::open(path.as_ref())?;
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    /// Append a record. The sink is written first so memory never runs ahead of disk.
    pub async fn append(&self, record: GradeRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(writer) = inner.sink.as_mut() {
            let line = serde_json::to_string(&record)?;
            writeln!(writer, "{line}")?;
            writer.flush()?;
        }
        debug!(
            record_id = %record.id,
            grade = %record.grade,
            total_units = record.total_units,
            "Appended grade record"
        );
        inner.records.push(record);
        Ok(())
    }

    pub async fn latest(&self) -> Option<GradeRecord> {
        self.inner.read().await.records.last().cloned()
    }

    /// All records, oldest first.
    pub async fn records(&self) -> Vec<GradeRecord> {
        self.inner.read().await.records.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }

    pub async fn path(&self) -> Option<PathBuf> {
        self.inner.read().await.path.clone()
    }

    pub async fn timeline(&self) -> Vec<TimelinePoint> {
        let inner = self.inner.read().await;
        inner
            .records
            .iter()
            .map(|r| TimelinePoint {
                computed_at: r.computed_at,
                total_units: r.total_units,
                grade: r.grade,
                taxonomy_version: r.taxonomy_version,
            })
            .collect()
    }

    pub async fn trend(&self) -> Trend {
        let inner = self.inner.read().await;
        let n = inner.records.len();
        if n < 2 {
            return Trend {
                direction: TrendDirection::Insufficient,
                delta_units: 0.0,
                previous_grade: None,
                latest_grade: inner.records.last().map(|r| r.grade),
            };
        }

        let previous = &inner.records[n - 2];
        let latest = &inner.records[n - 1];
        let delta_units = latest.total_units - previous.total_units;
        let direction = if delta_units < 0.0 {
            TrendDirection::Improving
        } else if delta_units > 0.0 {
            TrendDirection::Degrading
        } else {
            TrendDirection::Stable
        };

        Trend {
            direction,
            delta_units,
            previous_grade: Some(previous.grade),
            latest_grade: Some(latest.grade),
        }
    }
}

impl Default for GradeHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(total_units: f64, grade: Grade) -> GradeRecord {
        GradeRecord {
            id: uuid::Uuid::new_v4().to_string(),
            total_units,
            grade,
            upper_sum: total_units,
            lower_sum: 0.0,
            diagonal_sum: 0.0,
            category_health: vec![],
            taxonomy_version: 1,
            taxonomy_fingerprint: None,
            computed_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_trend() {
        let history = GradeHistory::new();
        assert_eq!(history.trend().await.direction, TrendDirection::Insufficient);

        history.append(record(2000.0, Grade::C)).await.unwrap();
        history.append(record(800.0, Grade::B)).await.unwrap();

        let trend = history.trend().await;
        assert_eq!(trend.direction, TrendDirection::Improving);
        assert_eq!(trend.delta_units, -1200.0);
        assert_eq!(trend.latest_grade, Some(Grade::B));

        history.append(record(900.0, Grade::B)).await.unwrap();
        assert_eq!(history.trend().await.direction, TrendDirection::Degrading);
        assert_eq!(history.len().await, 3);
        assert_eq!(history.timeline().await[0].total_units, 2000.0);
    }

    #[tokio::test]
    async fn test_jsonl_sink_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grades.jsonl");

        {
            let history = GradeHistory::with_sink(&path).unwrap();
            history.append(record(100.0, Grade::A)).await.unwrap();
            history.append(record(1600.0, Grade::C)).await.unwrap();
        }

        let reopened = GradeHistory::with_sink(&path).unwrap();
        assert_eq!(reopened.len().await, 2);
        reopened.append(record(50.0, Grade::A)).await.unwrap();

        let on_disk = GradeHistory::load_jsonl(&path).unwrap();
        assert_eq!(on_disk.len(), 3);
        assert_eq!(on_disk[1].grade, Grade::C);
        assert_eq!(reopened.latest().await.unwrap().total_units, 50.0);
    }
}
