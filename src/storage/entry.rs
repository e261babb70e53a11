use serde::Serialize;
use std::path::{Path, PathBuf};

/// A named item with a byte size, optionally broken down into children.
/// This is the core data structure of every storage report.
#[derive(Debug, Clone, Serialize)]
pub struct SizedItem {
    /// Display name (usually the last path component)
    pub name: String,

    /// Location on disk
    pub path: PathBuf,

    /// Size in bytes; for items with children this is the children total
    pub size: u64,

    /// Breakdown of this item (empty when not expanded)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SizedItem>,

    /// Error message if the size could not be computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SizedItem {
    /// Create a leaf with a known size.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
            children: Vec::new(),
            error: None,
        }
    }

    /// Create a leaf named after the last component of `path`.
    pub fn from_path(path: &Path, size: u64) -> Self {
        Self::new(file_name(path), path, size)
    }

    /// Create a group whose size is the sum of `children`.
    pub fn group(name: impl Into<String>, path: impl Into<PathBuf>, children: Vec<SizedItem>) -> Self {
        let mut item = Self::new(name, path, 0);
        item.children = children;
        item.recalculate_total();
        item.sort_by_size();
        item
    }

    /// Create an entry that could not be measured.
    pub fn new_error(path: &Path, error: impl Into<String>) -> Self {
        let mut item = Self::from_path(path, 0);
        item.error = Some(error.into());
        item
    }

    /// Recompute `size` from the children, if any.
    pub fn recalculate_total(&mut self) {
        if !self.children.is_empty() {
            self.size = self.children.iter().map(|c| c.size).sum();
        }
    }

    /// Sort children by size, largest first, then by name.
    pub fn sort_by_size(&mut self) {
        self.children
            .sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&SizedItem> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Last path component as a string, or the whole path when there is none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
