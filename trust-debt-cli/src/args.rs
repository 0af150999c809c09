//! Command line arguments.
//!
//! Every input path can also come from the environment (or a `.env` file).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trust Debt - measure the gap between what a project says and what it does
#[derive(Parser, Debug, Clone)]
#[command(name = "trust-debt")]
#[command(about = "Grade intent/reality drift and gate actions on the result")]
pub struct Args {
    /// YAML settings file (trust_debt and permission sections)
    #[arg(long, env = "TRUST_DEBT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ordered category list (YAML)
    #[arg(long, env = "TRUST_DEBT_TAXONOMY", default_value = "taxonomy.yaml")]
    pub taxonomy: PathBuf,

    /// Keyword table for the scorer (YAML map of category name to words)
    /// Without it, categories are matched on the words of their own name
    #[arg(long, env = "TRUST_DEBT_KEYWORDS")]
    pub keywords: Option<PathBuf>,

    /// Corpus documents (JSONL, one document per line)
    #[arg(long, env = "TRUST_DEBT_CORPUS", default_value = "corpus.jsonl")]
    pub corpus: PathBuf,

    /// Grade history file (JSONL); appended to by grade and check
    #[arg(long, env = "TRUST_DEBT_HISTORY")]
    pub history: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build the matrix, grade it and record the result
    Grade,

    /// Grade, then decide whether a subject may perform an action
    Check {
        /// Subject the identity vector is derived for
        #[arg(short, long)]
        subject: String,
        /// Action name from the requirement registry
        #[arg(short, long)]
        action: String,
    },

    /// Report pairwise category correlation over the corpus
    Orthogonality,

    /// Show the grade timeline and trend
    History,

    /// List registered actions and their requirements
    Actions,
}

impl Args {
    /// Validate argument combinations.
    pub fn validate(&self) -> Result<(), String> {
        if matches!(self.command, Command::History) && self.history.is_none() {
            return Err("TRUST_DEBT_HISTORY is required for the history command".to_string());
        }
        if let Command::Check { subject, action } = &self.command {
            if subject.trim().is_empty() || action.trim().is_empty() {
                return Err("check needs a non-empty --subject and --action".to_string());
            }
        }
        Ok(())
    }

    /// Default tracing filter for our crates.
    pub fn log_filter(&self) -> String {
        format!(
            "trust_debt={level},trust_debt_cli={level},taxonomy={level},permission={level},warn",
            level = self.log_level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let args = Args::try_parse_from([
            "trust-debt",
            "--taxonomy",
            "cats.yaml",
            "check",
            "--subject",
            "agent-7",
            "--action",
            "git_push",
        ])
        .unwrap();
        assert_eq!(args.taxonomy, PathBuf::from("cats.yaml"));
        assert!(matches!(
            args.command,
            Command::Check { ref subject, ref action } if subject == "agent-7" && action == "git_push"
        ));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_history_needs_path() {
        let mut args = Args::try_parse_from(["trust-debt", "history"]).unwrap();
        // TRUST_DEBT_HISTORY may be set in the environment
        args.history = None;
        let err = args.validate().unwrap_err();
        assert!(err.contains("history"), "{err}");

        args.history = Some(PathBuf::from("history.jsonl"));
        assert!(args.validate().is_ok());

        args.history = None;
        args.command = Command::Grade;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_filter() {
        let args = Args::try_parse_from(["trust-debt", "--log-level", "debug", "grade"]).unwrap();
        assert!(args.log_filter().starts_with("trust_debt=debug"));
    }
}
