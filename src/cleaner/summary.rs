use serde::Serialize;
use std::path::PathBuf;

use crate::cleaner::executor::{DeleteOutcome, DeleteStatus};

/// Summary of a cleaning run.
#[derive(Debug, Default, Serialize)]
pub struct CleanSummary {
    /// Number of deleted directories.
    pub success_count: usize,
    /// Number of failed deletions.
    pub failed_count: usize,
    /// Total bytes freed.
    pub total_freed: u64,
    /// Failed paths with their messages.
    pub errors: Vec<(PathBuf, String)>,
}

impl CleanSummary {
    pub fn is_clean(&self) -> bool {
        self.failed_count == 0
    }
}

/// Get summary statistics from outcomes.
pub fn summarize(outcomes: &[DeleteOutcome]) -> CleanSummary {
    let mut summary = CleanSummary::default();

    for outcome in outcomes {
        match &outcome.status {
            DeleteStatus::Success { freed } => {
                summary.success_count += 1;
                summary.total_freed += freed;
            }
            DeleteStatus::Failed { error } => {
                summary.failed_count += 1;
                summary.errors.push((outcome.path.clone(), error.clone()));
            }
            DeleteStatus::Pending | DeleteStatus::Deleting => {}
        }
    }

    summary
}
