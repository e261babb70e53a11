//! Clean-build: discovery and deletion of Gradle `build` directories.
//!
//! This module provides:
//! - Discovery of module build output below a root, grouped per project
//! - Sequential deletion with per-item status reporting
//! - Summaries of a deletion run

pub mod executor;
pub mod scanner;
pub mod summary;

pub use executor::{BuildDirCleaner, CleanOptions, DeleteOutcome, DeleteStatus};
pub use scanner::{group_by_project, BuildDirScanner, BuildDirectory, BuildProject, ScanOptions};
pub use summary::{summarize, CleanSummary};
