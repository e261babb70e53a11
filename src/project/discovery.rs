//! Finds the Gradle files of a project.

use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["build", ".gradle", ".git", ".idea", "node_modules"];

/// What a discovered file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectFileKind {
    BuildScript,
    Settings,
    Properties,
    Wrapper,
    VersionCatalog,
}

impl ProjectFileKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectFileKind::BuildScript => "build script",
            ProjectFileKind::Settings => "settings",
            ProjectFileKind::Properties => "properties",
            ProjectFileKind::Wrapper => "wrapper",
            ProjectFileKind::VersionCatalog => "version catalog",
        }
    }
}

/// A Gradle file found in the project tree.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectFile {
    pub kind: ProjectFileKind,
    pub path: PathBuf,
    /// Path relative to the project root, `/`-separated
    pub relative_path: String,
    pub size: u64,
}

/// Options for walking a project.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub max_depth: usize,
    pub exclude_dirs: Vec<String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_depth: 8,
            exclude_dirs: Vec::new(),
        }
    }
}

/// Classify a file by name and location, `None` for non-Gradle files.
pub fn classify(relative: &Path) -> Option<ProjectFileKind> {
    let name = relative.file_name()?.to_str()?;
    let parent = relative.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str());

    match name {
        "build.gradle" | "build.gradle.kts" => Some(ProjectFileKind::BuildScript),
        "settings.gradle" | "settings.gradle.kts" => Some(ProjectFileKind::Settings),
        "gradle.properties" => Some(ProjectFileKind::Properties),
        "gradle-wrapper.properties" if relative.ends_with("gradle/wrapper/gradle-wrapper.properties") => {
            Some(ProjectFileKind::Wrapper)
        }
        _ if name.ends_with(".versions.toml") && parent == Some("gradle") => {
            Some(ProjectFileKind::VersionCatalog)
        }
        _ => None,
    }
}

/// Walk `root` and collect every Gradle file, sorted by relative path.
pub fn discover_files(root: &Path, options: &DiscoveryOptions) -> Vec<ProjectFile> {
    let walker = WalkDir::new(root)
        .max_depth(options.max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e, options));

    let mut files: Vec<ProjectFile> = walker
        .flatten()
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let relative = e.path().strip_prefix(root).ok()?.to_path_buf();
            let kind = classify(&relative)?;
            Some(ProjectFile {
                kind,
                relative_path: to_slash(&relative),
                size: e.metadata().map(|m| m.len()).unwrap_or(0),
                path: e.into_path(),
            })
        })
        .collect();

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    tracing::debug!(root = %root.display(), count = files.len(), "Discovered project files");
    files
}

fn is_skipped(entry: &DirEntry, options: &DiscoveryOptions) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || SKIPPED_DIRS.contains(&name.as_ref())
        || options.exclude_dirs.iter().any(|d| d == name.as_ref())
}

/// Gradle project path of a module directory: `app` -> `:app`,
/// `feature/login` -> `:feature:login`, the root itself -> `:`.
pub fn gradle_path(root: &Path, module_dir: &Path) -> String {
    let relative = module_dir.strip_prefix(root).unwrap_or(module_dir);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    format!(":{}", segments.join(":"))
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(Path::new("app/build.gradle.kts")), Some(ProjectFileKind::BuildScript));
        assert_eq!(classify(Path::new("settings.gradle")), Some(ProjectFileKind::Settings));
        assert_eq!(
            classify(Path::new("gradle/wrapper/gradle-wrapper.properties")),
            Some(ProjectFileKind::Wrapper)
        );
        assert_eq!(
            classify(Path::new("gradle/libs.versions.toml")),
            Some(ProjectFileKind::VersionCatalog)
        );
        assert_eq!(classify(Path::new("config/libs.versions.toml")), None);
        assert_eq!(classify(Path::new("app/src/Main.kt")), None);
    }

    #[test]
    fn test_discover_skips_build_and_hidden_dirs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "settings.gradle.kts", "rootProject.name = \"demo\"");
        touch(root, "build.gradle.kts", "");
        touch(root, "gradle.properties", "a=b");
        touch(root, "gradle/libs.versions.toml", "[versions]");
        touch(root, "gradle/wrapper/gradle-wrapper.properties", "distributionUrl=x");
        touch(root, "app/build.gradle.kts", "");
        touch(root, "app/build/generated/build.gradle", "");
        touch(root, ".gradle/8.5/build.gradle", "");
        touch(root, ".hidden/build.gradle", "");
        touch(root, "node_modules/pkg/build.gradle", "");

        let files = discover_files(root, &DiscoveryOptions::default());
        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();

        assert_eq!(
            paths,
            vec![
                "app/build.gradle.kts",
                "build.gradle.kts",
                "gradle.properties",
                "gradle/libs.versions.toml",
                "gradle/wrapper/gradle-wrapper.properties",
                "settings.gradle.kts",
            ]
        );
        assert_eq!(files[2].size, 3);
    }

    #[test]
    fn test_discover_honors_excludes_and_depth() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "legacy/build.gradle", "");
        touch(root, "a/b/c/build.gradle", "");

        let options = DiscoveryOptions {
            max_depth: 2,
            exclude_dirs: vec!["legacy".to_string()],
        };
        assert!(discover_files(root, &options).is_empty());
    }

    #[test]
    fn test_default_config_discovers_build_src() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "settings.gradle.kts", "");
        touch(root, "buildSrc/build.gradle.kts", "plugins { `kotlin-dsl` }");

        let project = crate::config::ProjectConfig::default();
        let options = DiscoveryOptions {
            max_depth: project.max_depth,
            exclude_dirs: project.exclude_dirs,
        };
        let files = discover_files(root, &options);
        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["buildSrc/build.gradle.kts", "settings.gradle.kts"]);
    }

    #[test]
    fn test_gradle_path() {
        let root = Path::new("/work/app");
        assert_eq!(gradle_path(root, Path::new("/work/app")), ":");
        assert_eq!(gradle_path(root, Path::new("/work/app/app")), ":app");
        assert_eq!(
            gradle_path(root, Path::new("/work/app/feature/login")),
            ":feature:login"
        );
    }
}
