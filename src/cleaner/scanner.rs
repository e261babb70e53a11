//! Scanner for Gradle `build` output directories.

use rayon::prelude::*;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

use crate::project::{gradle_path, SettingsFileInfo};
use crate::storage::{file_name, folder_size_walk};

const BUILD_SCRIPTS: &[&str] = &["build.gradle", "build.gradle.kts"];
const SETTINGS_SCRIPTS: &[&str] = &["settings.gradle", "settings.gradle.kts"];

/// Options for scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum directory depth to scan.
    pub max_depth: usize,
    /// Directory names that are never entered.
    pub exclude_patterns: Vec<String>,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: 6,
            exclude_patterns: vec![".git".to_string(), "node_modules".to_string()],
            follow_symlinks: false,
        }
    }
}

/// A `build` directory next to a Gradle script.
#[derive(Debug, Clone, Serialize)]
pub struct BuildDirectory {
    pub path: PathBuf,
    /// Directory of the module owning this output
    pub module_path: PathBuf,
    /// Gradle path of the module relative to its project, e.g. `:app`
    pub module_name: String,
    pub project_root: PathBuf,
    pub size: u64,
}

/// Build directories of one Gradle project.
#[derive(Debug, Clone, Serialize)]
pub struct BuildProject {
    pub name: String,
    pub root: PathBuf,
    pub dirs: Vec<BuildDirectory>,
    pub total_size: u64,
}

fn has_any(dir: &Path, names: &[&str]) -> bool {
    names.iter().any(|n| dir.join(n).is_file())
}

/// Nearest directory at or above `module` holding a settings script.
fn project_root_of(module: &Path) -> PathBuf {
    module
        .ancestors()
        .find(|dir| has_any(dir, SETTINGS_SCRIPTS))
        .unwrap_or(module)
        .to_path_buf()
}

fn project_name(root: &Path) -> String {
    SETTINGS_SCRIPTS
        .iter()
        .map(|n| root.join(n))
        .find_map(|p| fs::read_to_string(p).ok())
        .and_then(|text| SettingsFileInfo::parse(&text).root_project_name)
        .unwrap_or_else(|| file_name(root))
}

/// Scanner for Gradle build output in a directory tree.
pub struct BuildDirScanner {
    options: ScanOptions,
}

impl BuildDirScanner {
    /// Create a new scanner with the given options.
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Find every Gradle `build` directory under `root`, with sizes.
    pub fn scan(&self, root: &Path) -> Vec<BuildDirectory> {
        let mut found: Vec<PathBuf> = Vec::new();

        let mut walker = WalkDir::new(root)
            .max_depth(self.options.max_depth)
            .follow_links(self.options.follow_symlinks)
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() || entry.depth() == 0 {
                continue;
            }

            if self.is_excluded(entry.file_name()) {
                walker.skip_current_dir();
                continue;
            }

            if entry.file_name() == "build" {
                let module = entry.path().parent().unwrap_or(root);
                if has_any(module, BUILD_SCRIPTS) || has_any(module, SETTINGS_SCRIPTS) {
                    found.push(entry.path().to_path_buf());
                    walker.skip_current_dir();
                }
            }
        }

        let mut dirs: Vec<BuildDirectory> = found
            .par_iter()
            .map(|path| {
                let module_path = path.parent().unwrap_or(root).to_path_buf();
                let project_root = project_root_of(&module_path);
                BuildDirectory {
                    module_name: gradle_path(&project_root, &module_path),
                    size: folder_size_walk(path),
                    path: path.clone(),
                    module_path,
                    project_root,
                }
            })
            .collect();

        dirs.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        tracing::debug!(root = %root.display(), count = dirs.len(), "Found build directories");
        dirs
    }

    /// Scan and group the results by project.
    pub fn scan_projects(&self, root: &Path) -> Vec<BuildProject> {
        group_by_project(self.scan(root))
    }

    fn is_excluded(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        name.starts_with('.')
            || self
                .options
                .exclude_patterns
                .iter()
                .any(|p| name == p.as_str())
    }

    /// Keep projects whose sources were not modified in the last `min_age_days`.
    pub fn filter_by_age(projects: Vec<BuildProject>, min_age_days: u64) -> Vec<BuildProject> {
        let cutoff = SystemTime::now() - Duration::from_secs(min_age_days * 24 * 60 * 60);

        projects
            .into_iter()
            .filter(|p| Self::last_modified(&p.root) < cutoff)
            .collect()
    }

    /// Latest modification time of the project, ignoring build output.
    fn last_modified(root: &Path) -> SystemTime {
        WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                e.depth() == 0 || !(name == "build" || name == ".gradle" || name == ".git")
            })
            .flatten()
            .filter_map(|e| e.metadata().ok())
            .filter_map(|m| m.modified().ok())
            .max()
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }
}

/// Group build directories by project root, largest project first.
pub fn group_by_project(dirs: Vec<BuildDirectory>) -> Vec<BuildProject> {
    let mut projects: Vec<BuildProject> = Vec::new();
    for dir in dirs {
        match projects.iter_mut().find(|p| p.root == dir.project_root) {
            Some(project) => {
                project.total_size += dir.size;
                project.dirs.push(dir);
            }
            None => projects.push(BuildProject {
                name: project_name(&dir.project_root),
                root: dir.project_root.clone(),
                total_size: dir.size,
                dirs: vec![dir],
            }),
        }
    }

    for project in &mut projects {
        project
            .dirs
            .sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    }
    projects.sort_by(|a, b| b.total_size.cmp(&a.total_size).then_with(|| a.root.cmp(&b.root)));
    projects
}
