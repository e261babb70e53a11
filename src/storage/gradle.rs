use serde::Serialize;
use std::path::{Path, PathBuf};

use super::gradle_modules::GradleModulesInfo;
use super::{expand, file_name, list_dir, measure, SizedItem, StorageOptions};

/// Folders of the Gradle user home that are broken down one level.
const EXPANDED: &[&str] = &["caches", "daemon", "jdks", "native"];

/// Counts taken from the module cache index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModulesSummary {
    pub libraries: usize,
    pub versions: usize,
}

/// Storage used by the Gradle user home and the Gradle installation.
#[derive(Debug, Clone, Serialize)]
pub struct GradleInfo {
    pub home: Option<PathBuf>,
    pub exists: bool,
    /// Top-level children of the user home
    pub items: Vec<SizedItem>,
    /// Wrapper distributions (`wrapper/dists/*`)
    pub wrapper_distributions: Vec<SizedItem>,
    /// The installation `GRADLE_HOME` points to, if any
    pub installation: Option<SizedItem>,
    pub modules: ModulesSummary,
    pub total_size: u64,
}

impl GradleInfo {
    pub fn scan(home: Option<&Path>, installation: Option<&Path>, options: &StorageOptions) -> Self {
        let exists = home.map_or(false, |h| h.is_dir());

        let items: Vec<SizedItem> = match home {
            Some(home) if exists => list_dir(home)
                .into_iter()
                .map(|child| scan_child(&child, options))
                .collect(),
            _ => Vec::new(),
        };

        let wrapper_distributions = items
            .iter()
            .find(|i| i.name == "wrapper")
            .map(|w| w.children.clone())
            .unwrap_or_default();

        let installation = installation
            .filter(|p| p.is_dir())
            .filter(|p| home.map_or(true, |h| !p.starts_with(h)))
            .map(|p| {
                let mut item = measure(p, options);
                item.name = format!("installation ({})", file_name(p));
                item
            });

        let modules = match home {
            Some(home) if exists => {
                let index = GradleModulesInfo::scan(home, false);
                ModulesSummary {
                    libraries: index.library_count(),
                    versions: index.version_count(),
                }
            }
            _ => ModulesSummary::default(),
        };

        let total_size = items.iter().map(|i| i.size).sum::<u64>()
            + installation.as_ref().map_or(0, |i| i.size);

        tracing::debug!(total_size, "Scanned Gradle home");

        let mut info = Self {
            home: home.map(Path::to_path_buf),
            exists,
            items,
            wrapper_distributions,
            installation,
            modules,
            total_size,
        };
        info.items
            .sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));
        info
    }

    pub fn item(&self, name: &str) -> Option<&SizedItem> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn to_item(&self) -> SizedItem {
        let path = self.home.clone().unwrap_or_default();
        let mut children = self.items.clone();
        if let Some(installation) = &self.installation {
            children.push(installation.clone());
        }
        SizedItem::group("Gradle", path, children)
    }
}

fn scan_child(child: &Path, options: &StorageOptions) -> SizedItem {
    let name = file_name(child);
    if !child.is_dir() {
        return measure(child, options);
    }
    if name == "wrapper" {
        return scan_wrapper(child, options);
    }
    if EXPANDED.contains(&name.as_str()) {
        return expand(&name, child, options);
    }
    measure(child, options)
}

/// `wrapper` is broken down by distribution rather than by its own children.
fn scan_wrapper(wrapper: &Path, options: &StorageOptions) -> SizedItem {
    let mut children = Vec::new();
    for child in list_dir(wrapper) {
        if child.is_dir() && file_name(&child) == "dists" {
            children.extend(list_dir(&child).iter().map(|d| measure(d, options)));
        } else {
            children.push(measure(&child, options));
        }
    }
    SizedItem::group("wrapper", wrapper, children)
}

#[cfg(test)]
mod tests {
    use super::super::gradle_modules::modules_cache_dir;
    use super::super::test_support::{exact, write_bytes};
    use super::*;
    use tempfile::TempDir;

    fn create_home() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path();
        write_bytes(
            &modules_cache_dir(home).join("com.google.code.gson/gson/2.10.1/abc/gson.jar"),
            300,
        );
        write_bytes(&home.join("caches/transforms-4/t/out.bin"), 200);
        write_bytes(&home.join("wrapper/dists/gradle-8.5-bin/x/gradle.zip"), 1000);
        write_bytes(&home.join("wrapper/dists/gradle-8.7-all/y/gradle.zip"), 2000);
        write_bytes(&home.join("daemon/8.5/daemon.log"), 50);
        write_bytes(&home.join("gradle.properties"), 5);
        tmp
    }

    #[test]
    fn test_scan_measures_top_level_children() {
        let tmp = create_home();
        let info = GradleInfo::scan(Some(tmp.path()), None, &exact());

        assert!(info.exists);
        assert_eq!(info.total_size, 3555);
        assert_eq!(info.item("caches").unwrap().size, 500);
        assert_eq!(info.item("caches").unwrap().children.len(), 2);
        assert_eq!(info.item("gradle.properties").unwrap().size, 5);
        assert_eq!(info.items[0].name, "wrapper");
    }

    #[test]
    fn test_wrapper_is_expanded_by_distribution() {
        let tmp = create_home();
        let info = GradleInfo::scan(Some(tmp.path()), None, &exact());

        let names: Vec<&str> = info
            .wrapper_distributions
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["gradle-8.7-all", "gradle-8.5-bin"]);
    }

    #[test]
    fn test_modules_summary() {
        let tmp = create_home();
        let info = GradleInfo::scan(Some(tmp.path()), None, &exact());
        assert_eq!(info.modules.libraries, 1);
        assert_eq!(info.modules.versions, 1);
    }

    #[test]
    fn test_installation_is_added_to_total() {
        let tmp = create_home();
        let install = TempDir::new().unwrap();
        write_bytes(&install.path().join("lib/gradle-core.jar"), 45);

        let info = GradleInfo::scan(Some(tmp.path()), Some(install.path()), &exact());
        assert_eq!(info.installation.as_ref().unwrap().size, 45);
        assert_eq!(info.total_size, 3600);
        assert_eq!(info.to_item().size, 3600);
    }

    #[test]
    fn test_missing_home() {
        let info = GradleInfo::scan(Some(Path::new("/nonexistent/gradle/77")), None, &exact());
        assert!(!info.exists);
        assert_eq!(info.total_size, 0);
        assert!(info.items.is_empty());

        let none = GradleInfo::scan(None, None, &exact());
        assert!(none.home.is_none());
    }
}
