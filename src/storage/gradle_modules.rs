//! Index of the Gradle module cache (`caches/modules-2/files-2.1`).
//!
//! The cache is laid out as `<group>/<artifact>/<version>/<sha1>/<file>`.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::size::folder_size_walk;
use super::{file_name, list_subdirs};

/// Location of the module cache inside a Gradle user home.
pub fn modules_cache_dir(gradle_home: &Path) -> PathBuf {
    gradle_home
        .join("caches")
        .join("modules-2")
        .join("files-2.1")
}

/// One cached version of an artifact.
#[derive(Debug, Clone, Serialize)]
pub struct GradleVersionInfo {
    pub version: String,
    pub path: PathBuf,
    pub size: u64,
}

/// All cached versions of one `group:artifact`.
#[derive(Debug, Clone, Serialize)]
pub struct GradleLibraryInfo {
    pub group: String,
    pub artifact: String,
    pub versions: Vec<GradleVersionInfo>,
    pub size: u64,
}

impl GradleLibraryInfo {
    pub fn id(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    pub fn version_names(&self) -> Vec<String> {
        self.versions.iter().map(|v| v.version.clone()).collect()
    }
}

/// Directory-derived index of `{group -> artifact -> versions}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GradleModulesInfo {
    pub root: PathBuf,
    pub libraries: Vec<GradleLibraryInfo>,
    pub total_size: u64,
    #[serde(skip)]
    index: HashMap<(String, String), usize>,
}

impl GradleModulesInfo {
    /// An index with no libraries; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index the module cache of a Gradle user home.
    pub fn scan(gradle_home: &Path, measure_sizes: bool) -> Self {
        Self::scan_dir(&modules_cache_dir(gradle_home), measure_sizes)
    }

    /// Index a `files-2.1` directory. Sizes are only computed when
    /// `measure_sizes` is set; otherwise they are zero.
    pub fn scan_dir(files_dir: &Path, measure_sizes: bool) -> Self {
        if !files_dir.is_dir() {
            tracing::debug!(path = %files_dir.display(), "No Gradle module cache");
            return Self {
                root: files_dir.to_path_buf(),
                ..Self::default()
            };
        }

        let artifact_dirs: Vec<(String, PathBuf)> = list_subdirs(files_dir)
            .into_iter()
            .flat_map(|group_dir| {
                let group = file_name(&group_dir);
                list_subdirs(&group_dir)
                    .into_iter()
                    .map(move |artifact_dir| (group.clone(), artifact_dir))
            })
            .collect();

        let mut libraries: Vec<GradleLibraryInfo> = artifact_dirs
            .par_iter()
            .map(|(group, artifact_dir)| {
                let versions: Vec<GradleVersionInfo> = list_subdirs(artifact_dir)
                    .into_iter()
                    .map(|version_dir| GradleVersionInfo {
                        version: file_name(&version_dir),
                        size: if measure_sizes {
                            folder_size_walk(&version_dir)
                        } else {
                            0
                        },
                        path: version_dir,
                    })
                    .collect();
                GradleLibraryInfo {
                    group: group.clone(),
                    artifact: file_name(artifact_dir),
                    size: versions.iter().map(|v| v.size).sum(),
                    versions,
                }
            })
            .filter(|lib| !lib.versions.is_empty())
            .collect();

        libraries.sort_by(|a, b| a.group.cmp(&b.group).then_with(|| a.artifact.cmp(&b.artifact)));
        tracing::debug!(count = libraries.len(), "Indexed Gradle module cache");

        Self::from_libraries(files_dir.to_path_buf(), libraries)
    }

    /// Build an index from already collected libraries.
    pub fn from_libraries(root: PathBuf, libraries: Vec<GradleLibraryInfo>) -> Self {
        let index = libraries
            .iter()
            .enumerate()
            .map(|(i, lib)| ((lib.group.clone(), lib.artifact.clone()), i))
            .collect();
        Self {
            root,
            total_size: libraries.iter().map(|l| l.size).sum(),
            libraries,
            index,
        }
    }

    pub fn library(&self, group: &str, artifact: &str) -> Option<&GradleLibraryInfo> {
        self.index
            .get(&(group.to_string(), artifact.to_string()))
            .map(|i| &self.libraries[*i])
    }

    /// Cached versions of `group:artifact`, empty when absent.
    pub fn versions_of(&self, group: &str, artifact: &str) -> Vec<String> {
        self.library(group, artifact)
            .map(|lib| lib.version_names())
            .unwrap_or_default()
    }

    /// Cached versions of a plugin, looked up via its marker artifact.
    pub fn plugin_versions(&self, plugin_id: &str) -> Vec<String> {
        self.versions_of(plugin_id, &format!("{}.gradle.plugin", plugin_id))
    }

    pub fn library_count(&self) -> usize {
        self.libraries.len()
    }

    pub fn version_count(&self) -> usize {
        self.libraries.iter().map(|l| l.versions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Libraries whose `group:artifact` contains `needle` (case-insensitive).
    pub fn filter(&self, needle: &str) -> Vec<&GradleLibraryInfo> {
        let needle = needle.to_lowercase();
        self.libraries
            .iter()
            .filter(|lib| lib.id().to_lowercase().contains(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::write_bytes;
    use super::*;
    use tempfile::TempDir;

    fn create_cache() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let files = modules_cache_dir(tmp.path());
        write_bytes(
            &files.join("androidx.core/core-ktx/1.12.0/abc123/core-ktx-1.12.0.aar"),
            1000,
        );
        write_bytes(
            &files.join("androidx.core/core-ktx/1.13.1/def456/core-ktx-1.13.1.aar"),
            1200,
        );
        write_bytes(
            &files.join("com.squareup.okhttp3/okhttp/4.12.0/aaa/okhttp-4.12.0.jar"),
            500,
        );
        write_bytes(
            &files.join(
                "com.android.application/com.android.application.gradle.plugin/8.2.0/bbb/x.pom",
            ),
            10,
        );
        tmp
    }

    #[test]
    fn test_scan_indexes_groups_and_versions() {
        let tmp = create_cache();
        let info = GradleModulesInfo::scan(tmp.path(), true);

        assert_eq!(info.library_count(), 3);
        assert_eq!(info.version_count(), 4);
        assert_eq!(
            info.versions_of("androidx.core", "core-ktx"),
            vec!["1.12.0".to_string(), "1.13.1".to_string()]
        );
        assert_eq!(info.library("androidx.core", "core-ktx").unwrap().size, 2200);
        assert_eq!(info.total_size, 2710);
    }

    #[test]
    fn test_scan_without_sizes() {
        let tmp = create_cache();
        let info = GradleModulesInfo::scan(tmp.path(), false);

        assert_eq!(info.library_count(), 3);
        assert_eq!(info.total_size, 0);
    }

    #[test]
    fn test_libraries_are_sorted() {
        let tmp = create_cache();
        let info = GradleModulesInfo::scan(tmp.path(), false);
        let ids: Vec<String> = info.libraries.iter().map(|l| l.id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_plugin_marker_lookup() {
        let tmp = create_cache();
        let info = GradleModulesInfo::scan(tmp.path(), false);
        assert_eq!(info.plugin_versions("com.android.application"), vec!["8.2.0"]);
        assert!(info.plugin_versions("org.jetbrains.kotlin.android").is_empty());
    }

    #[test]
    fn test_missing_cache_is_empty() {
        let tmp = TempDir::new().unwrap();
        let info = GradleModulesInfo::scan(tmp.path(), true);
        assert!(info.is_empty());
        assert!(info.versions_of("a", "b").is_empty());
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let tmp = create_cache();
        let info = GradleModulesInfo::scan(tmp.path(), false);
        let found = info.filter("OKHTTP");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].artifact, "okhttp");
    }
}
