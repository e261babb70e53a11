use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::{file_name, list_subdirs, SizedItem, StorageOptions};
use crate::paths::{JdkSearchRoot, JdkSource};

/// Parse a JDK `release` file (`KEY="value"` lines).
pub fn parse_release(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| {
            let v = v.trim();
            let v = v
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(v);
            (k.trim().to_string(), v.to_string())
        })
        .filter(|(k, _)| !k.is_empty() && !k.starts_with('#'))
        .collect()
}

/// The Java home inside `dir`, if `dir` is a JDK installation.
fn jdk_home(dir: &Path) -> Option<PathBuf> {
    let mac_home = dir.join("Contents").join("Home");
    [dir.to_path_buf(), mac_home]
        .into_iter()
        .find(|home| {
            let bin = home.join("bin");
            bin.join("java").is_file() || bin.join("java.exe").is_file()
        })
}

/// A JDK found on disk.
#[derive(Debug, Clone, Serialize)]
pub struct JdkInstallation {
    pub name: String,
    /// Directory holding `bin/java`
    pub home: PathBuf,
    /// Directory that was found and measured
    pub path: PathBuf,
    pub version: Option<String>,
    pub vendor: Option<String>,
    pub source: JdkSource,
    pub size: u64,
    pub is_java_home: bool,
}

struct Candidate {
    path: PathBuf,
    home: PathBuf,
    source: JdkSource,
}

/// Storage used by JDK installations.
#[derive(Debug, Clone, Serialize)]
pub struct JdkInfo {
    pub installations: Vec<JdkInstallation>,
    pub total_size: u64,
}

impl JdkInfo {
    pub fn scan(java_home: Option<&Path>, roots: &[JdkSearchRoot], options: &StorageOptions) -> Self {
        let java_home_key = java_home.and_then(jdk_home).map(|h| canonical(&h));

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut push = |path: PathBuf, source: JdkSource| {
            if let Some(home) = jdk_home(&path) {
                if seen.insert(canonical(&home)) {
                    candidates.push(Candidate { path, home, source });
                }
            }
        };

        if let Some(java_home) = java_home {
            push(java_home.to_path_buf(), JdkSource::JavaHome);
        }
        for root in roots {
            for dir in list_subdirs(&root.path) {
                push(dir, root.source);
            }
        }

        let mut installations: Vec<JdkInstallation> = candidates
            .par_iter()
            .map(|c| {
                let release = fs::read_to_string(c.home.join("release"))
                    .map(|text| parse_release(&text))
                    .unwrap_or_default();
                JdkInstallation {
                    name: file_name(&c.path),
                    home: c.home.clone(),
                    path: c.path.clone(),
                    version: release.get("JAVA_VERSION").cloned(),
                    vendor: release.get("IMPLEMENTOR").cloned(),
                    source: c.source,
                    size: options.size_of(&c.path),
                    is_java_home: java_home_key.as_ref() == Some(&canonical(&c.home)),
                }
            })
            .collect();
        installations.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));

        let total_size = installations.iter().map(|i| i.size).sum();
        tracing::debug!(count = installations.len(), total_size, "Scanned JDKs");

        Self {
            installations,
            total_size,
        }
    }

    pub fn java_home(&self) -> Option<&JdkInstallation> {
        self.installations.iter().find(|i| i.is_java_home)
    }

    pub fn to_item(&self) -> SizedItem {
        let children = self
            .installations
            .iter()
            .map(|i| {
                let label = match &i.version {
                    Some(v) => format!("{} ({}, {})", i.name, v, i.source),
                    None => format!("{} ({})", i.name, i.source),
                };
                SizedItem::new(label, i.path.clone(), i.size)
            })
            .collect();
        SizedItem::group("JDKs", PathBuf::new(), children)
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
