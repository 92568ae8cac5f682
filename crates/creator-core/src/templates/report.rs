//! Action records accumulated over one invocation

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    Overwritten,
    Skipped,
    DirectoryCreated,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Created => "created",
            Action::Overwritten => "overwritten",
            Action::Skipped => "skipped",
            Action::DirectoryCreated => "directory created",
        };
        write!(f, "{}", label)
    }
}

/// What happened to one destination path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub path: PathBuf,
    pub action: Action,
    /// Bytes written; absent for skipped files and directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub created: usize,
    pub overwritten: usize,
    pub skipped: usize,
}

/// Ordered log of actions taken during one invocation
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    records: Vec<ActionRecord>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: &Path, action: Action, bytes: Option<u64>) {
        tracing::debug!(path = %path.display(), %action, "action");
        self.records.push(ActionRecord {
            path: path.to_path_buf(),
            action,
            bytes,
        });
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ActionRecord> {
        self.records
    }

    pub fn summary(&self) -> Summary {
        summarize(&self.records)
    }
}

/// File counts by action; directories are not counted
pub fn summarize(records: &[ActionRecord]) -> Summary {
    records
        .iter()
        .fold(Summary::default(), |mut summary, record| {
            match record.action {
                Action::Created => summary.created += 1,
                Action::Overwritten => summary.overwritten += 1,
                Action::Skipped => summary.skipped += 1,
                Action::DirectoryCreated => {}
            }
            summary
        })
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} overwritten, {} skipped",
            self.created, self.overwritten, self.skipped
        )
    }
}
