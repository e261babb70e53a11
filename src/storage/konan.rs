use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{expand, file_name, list_dir, measure, measure_paths, SizedItem, StorageOptions};

const PREBUILT_PREFIX: &str = "kotlin-native-prebuilt-";

/// A Kotlin/Native compiler distribution.
#[derive(Debug, Clone, Serialize)]
pub struct KonanToolchain {
    pub name: String,
    pub version: Option<String>,
    pub path: PathBuf,
    pub size: u64,
}

/// Version part of a toolchain directory name: the first `-` separated
/// segment starting with a digit, together with everything after it.
fn toolchain_version(name: &str) -> Option<String> {
    let segments: Vec<&str> = name.split('-').collect();
    let start = segments
        .iter()
        .position(|s| s.chars().next().map_or(false, |c| c.is_ascii_digit()))?;
    Some(segments[start..].join("-"))
}

/// Storage used by `~/.konan`.
#[derive(Debug, Clone, Serialize)]
pub struct KonanInfo {
    pub root: Option<PathBuf>,
    pub exists: bool,
    pub toolchains: Vec<KonanToolchain>,
    /// Children of `dependencies` (LLVM, sysroots, ...)
    pub dependencies: Vec<SizedItem>,
    /// Everything else at the top level
    pub other: Vec<SizedItem>,
    pub total_size: u64,
}

impl KonanInfo {
    pub fn scan(root: Option<&Path>, options: &StorageOptions) -> Self {
        let exists = root.map_or(false, |r| r.is_dir());
        let entries = match root {
            Some(root) if exists => list_dir(root),
            _ => Vec::new(),
        };

        let (prebuilt, rest): (Vec<PathBuf>, Vec<PathBuf>) = entries
            .into_iter()
            .partition(|p| p.is_dir() && file_name(p).starts_with(PREBUILT_PREFIX));

        let mut toolchains: Vec<KonanToolchain> = measure_paths(&prebuilt, options)
            .into_iter()
            .map(|item| KonanToolchain {
                version: toolchain_version(&item.name),
                name: item.name,
                path: item.path,
                size: item.size,
            })
            .collect();
        toolchains.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));

        let mut dependencies = Vec::new();
        let mut other = Vec::new();
        for path in rest {
            if path.is_dir() && file_name(&path) == "dependencies" {
                let item = expand("dependencies", &path, options);
                if item.error.is_some() {
                    other.push(item);
                } else {
                    dependencies = item.children;
                }
            } else {
                other.push(measure(&path, options));
            }
        }
        other.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));

        let total_size = toolchains.iter().map(|t| t.size).sum::<u64>()
            + dependencies.iter().map(|d| d.size).sum::<u64>()
            + other.iter().map(|o| o.size).sum::<u64>();
        tracing::debug!(toolchains = toolchains.len(), total_size, "Scanned Kotlin/Native");

        Self {
            root: root.map(Path::to_path_buf),
            exists,
            toolchains,
            dependencies,
            other,
            total_size,
        }
    }

    pub fn dependencies_size(&self) -> u64 {
        self.dependencies.iter().map(|d| d.size).sum()
    }

    pub fn to_item(&self) -> SizedItem {
        let root = self.root.clone().unwrap_or_default();
        let mut children: Vec<SizedItem> = self
            .toolchains
            .iter()
            .map(|t| SizedItem::new(t.name.clone(), t.path.clone(), t.size))
            .collect();
        if !self.dependencies.is_empty() {
            children.push(SizedItem::group(
                "dependencies",
                root.join("dependencies"),
                self.dependencies.clone(),
            ));
        }
        children.extend(self.other.iter().cloned());
        SizedItem::group("Kotlin/Native", root, children)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{exact, write_bytes};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_toolchain_version() {
        assert_eq!(
            toolchain_version("kotlin-native-prebuilt-macos-aarch64-1.9.22").as_deref(),
            Some("1.9.22")
        );
        assert_eq!(
            toolchain_version("kotlin-native-prebuilt-linux-x86_64-2.0.0-RC1").as_deref(),
            Some("2.0.0-RC1")
        );
        assert_eq!(toolchain_version("kotlin-native-prebuilt-linux"), None);
    }

    #[test]
    fn test_scan_splits_toolchains_dependencies_and_other() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write_bytes(&root.join("kotlin-native-prebuilt-linux-x86_64-1.9.22/bin/konanc"), 400);
        write_bytes(&root.join("kotlin-native-prebuilt-linux-x86_64-2.0.0/bin/konanc"), 500);
        write_bytes(&root.join("dependencies/llvm-16.0.0/lib/libLLVM.so"), 900);
        write_bytes(&root.join("dependencies/x86_64-unknown-linux-gnu-gcc/lib.a"), 100);
        write_bytes(&root.join("cache/stdlib.klib"), 30);

        let info = KonanInfo::scan(Some(root), &exact());
        assert_eq!(info.toolchains.len(), 2);
        assert_eq!(info.toolchains[0].version.as_deref(), Some("2.0.0"));
        assert_eq!(info.dependencies.len(), 2);
        assert_eq!(info.dependencies_size(), 1000);
        assert_eq!(info.other.len(), 1);
        assert_eq!(info.total_size, 1930);
        assert_eq!(info.to_item().size, 1930);
    }

    #[test]
    fn test_missing_root() {
        let info = KonanInfo::scan(None, &exact());
        assert!(!info.exists);
        assert_eq!(info.total_size, 0);
    }
}
