//! Run Result
//!
//! Outcome types for one invocation of the runner.

use std::path::PathBuf;

use crate::error::ForgeError;

/// How one operation ended
#[derive(Debug)]
pub enum OperationStatus {
    /// Finished; lists every file written
    Succeeded { files: Vec<PathBuf> },
    /// The pipeline returned an error
    Failed(ForgeError),
    /// Not started because a dependency did not succeed
    Skipped(ForgeError),
}

impl OperationStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationStatus::Succeeded { .. })
    }

    /// Files written, empty unless succeeded
    pub fn files(&self) -> &[PathBuf] {
        match self {
            OperationStatus::Succeeded { files } => files,
            _ => &[],
        }
    }
}

/// Outcomes of every operation run, in completion order per batch
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<(String, OperationStatus)>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self, name: &str) -> Option<&OperationStatus> {
        self.outcomes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, status)| status)
    }

    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, OperationStatus::Succeeded { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OperationStatus::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OperationStatus::Skipped(_)))
    }

    fn count(&self, pred: impl Fn(&OperationStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, s)| pred(s)).count()
    }

    /// True when nothing failed or was skipped
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|(_, s)| s.is_success())
    }

    /// All files written by the run
    pub fn written(&self) -> impl Iterator<Item = &PathBuf> {
        self.outcomes.iter().flat_map(|(_, s)| s.files())
    }
}
