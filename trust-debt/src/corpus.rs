//! Corpus documents.
//!
//! Documents are read once per build. Loading from disk is a convenience
//! for the CLI; acquisition itself (git logs, docs trees) happens upstream.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::types::{Result, Role};

/// A document contributing to one side of the measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusDocument {
    /// Stable source identifier (path, commit hash); fixes fold order
    pub source_id: String,
    pub role: Role,
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub text: String,
}

fn default_weight() -> f64 {
    1.0
}

impl CorpusDocument {
    pub fn new(source_id: impl Into<String>, role: Role, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            role,
            weight: default_weight(),
            text: text.into(),
        }
    }

    pub fn intent(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(source_id, Role::Intent, text)
    }

    pub fn reality(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(source_id, Role::Reality, text)
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Read one document per line. Blank lines are skipped.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Vec<CorpusDocument>> {
        let file = std::fs::File::open(path.as_ref())?;
        let mut documents = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            documents.push(serde_json::from_str(&line)?);
        }
        debug!(
            path = %path.as_ref().display(),
            documents = documents.len(),
            "Loaded corpus"
        );
        Ok(documents)
    }
}

/// Documents of `role` in deterministic fold order: by source id, then input position.
pub fn ordered_for_role(documents: &[CorpusDocument], role: Role) -> Vec<&CorpusDocument> {
    let mut selected: Vec<(usize, &CorpusDocument)> = documents
        .iter()
        .enumerate()
        .filter(|(_, d)| d.role == role)
        .collect();
    selected.sort_by(|(ia, a), (ib, b)| a.source_id.cmp(&b.source_id).then(ia.cmp(ib)));
    selected.into_iter().map(|(_, d)| d).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ordered_for_role() {
        let docs = vec![
            CorpusDocument::reality("c2", "b"),
            CorpusDocument::intent("z", "x"),
            CorpusDocument::reality("c1", "a"),
            CorpusDocument::reality("c1", "dup"),
        ];
        let ordered = ordered_for_role(&docs, Role::Reality);
        let texts: Vec<_> = ordered.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "dup", "b"]);
        assert_eq!(ordered_for_role(&docs, Role::Intent).len(), 1);
    }

    #[test]
    fn test_load_jsonl() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"source_id":"README.md","role":"intent","text":"secure auth"}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"source_id":"abc123","role":"reality","weight":2.0,"text":"fix token"}}"#
        )
        .unwrap();

        let docs = CorpusDocument::load_jsonl(file.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].weight, 1.0);
        assert_eq!(docs[1].role, Role::Reality);
        assert_eq!(docs[1].weight, 2.0);
    }
}
