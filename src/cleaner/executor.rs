//! Sequential deletion of build directories.

use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::cleaner::scanner::BuildDirectory;
use crate::error::SweeperError;
use crate::storage::folder_size_walk;

/// State of one deletion as reported to the status callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeleteStatus {
    /// Selected and waiting.
    Pending,
    /// Being deleted now.
    Deleting,
    /// Deleted; `freed` bytes were released.
    Success { freed: u64 },
    /// Could not be deleted.
    Failed { error: String },
}

impl DeleteStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, DeleteStatus::Success { .. } | DeleteStatus::Failed { .. })
    }
}

/// Final status of one directory.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub path: PathBuf,
    pub module_name: String,
    pub status: DeleteStatus,
}

/// Options for the cleaner.
#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// If true, don't actually delete anything.
    pub dry_run: bool,
    /// Pause between two deletions.
    pub delay: Duration,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            delay: Duration::from_millis(150),
        }
    }
}

/// Deletes selected build directories one after the other.
pub struct BuildDirCleaner {
    options: CleanOptions,
}

impl BuildDirCleaner {
    /// Create a new cleaner with the given options.
    pub fn new(options: CleanOptions) -> Self {
        Self { options }
    }

    /// Delete every directory in `dirs`.
    ///
    /// `on_status` first receives `Pending` for every directory, then
    /// `Deleting` and a final status for each one in order. A failure does
    /// not stop the remaining deletions.
    pub fn delete_all<F>(&self, dirs: &[BuildDirectory], mut on_status: F) -> Vec<DeleteOutcome>
    where
        F: FnMut(&BuildDirectory, &DeleteStatus),
    {
        for dir in dirs {
            on_status(dir, &DeleteStatus::Pending);
        }

        let mut outcomes = Vec::with_capacity(dirs.len());
        for (i, dir) in dirs.iter().enumerate() {
            if i > 0 && !self.options.delay.is_zero() {
                thread::sleep(self.options.delay);
            }

            on_status(dir, &DeleteStatus::Deleting);
            let status = self.delete(dir);
            on_status(dir, &status);

            outcomes.push(DeleteOutcome {
                path: dir.path.clone(),
                module_name: dir.module_name.clone(),
                status,
            });
        }
        outcomes
    }

    /// Delete a single directory.
    pub fn delete(&self, dir: &BuildDirectory) -> DeleteStatus {
        if !dir.path.exists() {
            return DeleteStatus::Success { freed: 0 };
        }

        let size = folder_size_walk(&dir.path);
        if self.options.dry_run {
            tracing::info!(path = %dir.path.display(), "Dry run: would delete");
            return DeleteStatus::Success { freed: size };
        }

        match fs::remove_dir_all(&dir.path) {
            Ok(()) => {
                tracing::info!(path = %dir.path.display(), freed = size, "Deleted build directory");
                DeleteStatus::Success { freed: size }
            }
            Err(e) => {
                let error = SweeperError::from_io(&dir.path, e);
                tracing::warn!("{}", error);
                DeleteStatus::Failed {
                    error: error.user_message(),
                }
            }
        }
    }
}
