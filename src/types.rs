//! Outcome types shared by the batch engine, the CLI output and `--json`.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// One job that did not convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub source: PathBuf,
    /// Error text reported by the converter.
    pub cause: String,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processing {} failed: {}",
            self.source.display(),
            self.cause
        )
    }
}

/// Result of processing exactly one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Converted { source: PathBuf, output: PathBuf },
    Failed(ItemFailure),
}

/// Aggregate of one batch. Order within each list is not meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub succeeded: Vec<PathBuf>,
    pub failures: Vec<ItemFailure>,
}

impl BatchResult {
    /// Fold outcomes into a result.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = ConversionOutcome>) -> Self {
        let mut result = Self::default();
        for outcome in outcomes {
            match outcome {
                ConversionOutcome::Converted { output, .. } => result.succeeded.push(output),
                ConversionOutcome::Failed(failure) => result.failures.push(failure),
            }
        }
        result
    }

    /// Number of jobs accounted for.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What a directory pass reports back.
///
/// Per-item failures are listed here rather than returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectorySummary {
    /// Eligible files handed to the converter.
    pub attempted: usize,
    /// Files that converted.
    pub succeeded: usize,
    pub failures: Vec<ItemFailure>,
}

impl DirectorySummary {
    /// Count of files the pass processed, successful or not.
    pub fn processed(&self) -> usize {
        self.attempted
    }
}
