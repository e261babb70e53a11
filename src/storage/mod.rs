//! Storage scanners for the Android/Gradle tool directories of a machine.
//!
//! Each scanner enumerates one well-known directory and measures its
//! children. Scanners run as sibling rayon tasks and are joined into a
//! single [`StorageReport`]; a folder that cannot be measured counts as zero.

mod android_sdk;
mod avd;
mod entry;
mod formatter;
mod gradle;
mod gradle_modules;
mod ide;
mod jdk;
mod konan;
mod size;

pub use android_sdk::AndroidSdkInfo;
pub use avd::{parse_ini, AndroidAvdInfo, AvdInfo};
pub use entry::{file_name, SizedItem};
pub use formatter::{format_tree, FormatOptions};
pub use gradle::{GradleInfo, ModulesSummary};
pub use gradle_modules::{
    modules_cache_dir, GradleLibraryInfo, GradleModulesInfo, GradleVersionInfo,
};
pub use ide::{IdeDataInfo, IdeRootUsage};
pub use jdk::{parse_release, JdkInfo, JdkInstallation};
pub use konan::{KonanInfo, KonanToolchain};
pub use size::{folder_size, folder_size_walk, folder_size_with, format_size, parse_size};

use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::mpsc::Sender;

use crate::paths::ToolPaths;

/// Options shared by all storage scanners.
#[derive(Debug, Clone)]
pub struct StorageOptions {
    /// Use `du` for folder sizes where available
    pub use_du: bool,
    /// Number of parallel threads (0 = auto)
    pub threads: usize,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            use_du: cfg!(unix),
            threads: 0,
        }
    }
}

impl StorageOptions {
    pub fn size_of(&self, path: &Path) -> u64 {
        folder_size_with(path, self.use_du)
    }
}

/// The storage areas that can be scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Gradle,
    Sdk,
    Avd,
    Konan,
    Ide,
    Jdk,
}

impl StorageKind {
    pub const ALL: [StorageKind; 6] = [
        StorageKind::Gradle,
        StorageKind::Sdk,
        StorageKind::Avd,
        StorageKind::Konan,
        StorageKind::Ide,
        StorageKind::Jdk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Gradle => "gradle",
            StorageKind::Sdk => "sdk",
            StorageKind::Avd => "avd",
            StorageKind::Konan => "konan",
            StorageKind::Ide => "ide",
            StorageKind::Jdk => "jdk",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StorageKind::Gradle => "Gradle",
            StorageKind::Sdk => "Android SDK",
            StorageKind::Avd => "Android Virtual Devices",
            StorageKind::Konan => "Kotlin/Native",
            StorageKind::Ide => "IDE data",
            StorageKind::Jdk => "JDKs",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gradle" => Ok(StorageKind::Gradle),
            "sdk" | "android" | "android-sdk" => Ok(StorageKind::Sdk),
            "avd" | "emulator" => Ok(StorageKind::Avd),
            "konan" | "kotlin-native" => Ok(StorageKind::Konan),
            "ide" => Ok(StorageKind::Ide),
            "jdk" | "java" => Ok(StorageKind::Jdk),
            other => Err(format!(
                "Unknown storage kind '{}'. Valid kinds: gradle, sdk, avd, konan, ide, jdk",
                other
            )),
        }
    }
}

/// Result of one scanner.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageSection {
    Gradle(GradleInfo),
    Sdk(AndroidSdkInfo),
    Avd(AndroidAvdInfo),
    Konan(KonanInfo),
    Ide(IdeDataInfo),
    Jdk(JdkInfo),
}

impl StorageSection {
    pub fn kind(&self) -> StorageKind {
        match self {
            StorageSection::Gradle(_) => StorageKind::Gradle,
            StorageSection::Sdk(_) => StorageKind::Sdk,
            StorageSection::Avd(_) => StorageKind::Avd,
            StorageSection::Konan(_) => StorageKind::Konan,
            StorageSection::Ide(_) => StorageKind::Ide,
            StorageSection::Jdk(_) => StorageKind::Jdk,
        }
    }

    pub fn total_size(&self) -> u64 {
        match self {
            StorageSection::Gradle(info) => info.total_size,
            StorageSection::Sdk(info) => info.total_size,
            StorageSection::Avd(info) => info.total_size,
            StorageSection::Konan(info) => info.total_size,
            StorageSection::Ide(info) => info.total_size,
            StorageSection::Jdk(info) => info.total_size,
        }
    }

    /// Render the section as a sized tree.
    pub fn to_item(&self) -> SizedItem {
        match self {
            StorageSection::Gradle(info) => info.to_item(),
            StorageSection::Sdk(info) => info.to_item(),
            StorageSection::Avd(info) => info.to_item(),
            StorageSection::Konan(info) => info.to_item(),
            StorageSection::Ide(info) => info.to_item(),
            StorageSection::Jdk(info) => info.to_item(),
        }
    }
}

/// Aggregated result of a storage scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageReport {
    pub sections: Vec<StorageSection>,
}

impl StorageReport {
    pub fn total_size(&self) -> u64 {
        self.sections.iter().map(|s| s.total_size()).sum()
    }

    pub fn section(&self, kind: StorageKind) -> Option<&StorageSection> {
        self.sections.iter().find(|s| s.kind() == kind)
    }

    pub fn gradle(&self) -> Option<&GradleInfo> {
        match self.section(StorageKind::Gradle) {
            Some(StorageSection::Gradle(info)) => Some(info),
            _ => None,
        }
    }

    pub fn jdk(&self) -> Option<&JdkInfo> {
        match self.section(StorageKind::Jdk) {
            Some(StorageSection::Jdk(info)) => Some(info),
            _ => None,
        }
    }
}

/// Update sent during a progressive storage scan.
#[derive(Debug, Clone)]
pub enum StorageUpdate {
    /// A scanner has been launched.
    Started { kind: StorageKind },
    /// A scanner finished; `size` is its total.
    Finished { kind: StorageKind, size: u64 },
    /// All scanners joined.
    Complete { report: StorageReport },
}

/// Run a single scanner.
pub fn scan_section(kind: StorageKind, paths: &ToolPaths, options: &StorageOptions) -> StorageSection {
    tracing::debug!(kind = kind.as_str(), "Scanning storage section");
    match kind {
        StorageKind::Gradle => StorageSection::Gradle(GradleInfo::scan(
            paths.gradle_home.as_deref(),
            paths.gradle_installation.as_deref(),
            options,
        )),
        StorageKind::Sdk => {
            StorageSection::Sdk(AndroidSdkInfo::scan(paths.android_sdk.as_deref(), options))
        }
        StorageKind::Avd => StorageSection::Avd(AndroidAvdInfo::scan(paths.avd_home.as_deref(), options)),
        StorageKind::Konan => {
            StorageSection::Konan(KonanInfo::scan(paths.konan_home.as_deref(), options))
        }
        StorageKind::Ide => StorageSection::Ide(IdeDataInfo::scan(&paths.ide_roots, options)),
        StorageKind::Jdk => StorageSection::Jdk(JdkInfo::scan(
            paths.java_home.as_deref(),
            &paths.jdk_roots,
            options,
        )),
    }
}

/// Scan the selected areas in parallel and join the results.
///
/// Sections come back in the order of `kinds`, whatever order the
/// scanners finished in.
pub fn scan_storage(paths: &ToolPaths, kinds: &[StorageKind], options: &StorageOptions) -> StorageReport {
    let run = || {
        kinds
            .par_iter()
            .map(|kind| scan_section(*kind, paths, options))
            .collect::<Vec<_>>()
    };
    StorageReport {
        sections: install(options.threads, run),
    }
}

/// Scan the selected areas in parallel, reporting progress over `tx`.
pub fn scan_storage_progressive(
    paths: &ToolPaths,
    kinds: &[StorageKind],
    options: &StorageOptions,
    tx: Sender<StorageUpdate>,
) {
    for kind in kinds {
        let _ = tx.send(StorageUpdate::Started { kind: *kind });
    }

    let run = || {
        kinds
            .par_iter()
            .map_with(tx.clone(), |tx, kind| {
                let section = scan_section(*kind, paths, options);
                let _ = tx.send(StorageUpdate::Finished {
                    kind: *kind,
                    size: section.total_size(),
                });
                section
            })
            .collect::<Vec<_>>()
    };

    let report = StorageReport {
        sections: install(options.threads, run),
    };
    let _ = tx.send(StorageUpdate::Complete { report });
}

fn install<T, F>(threads: usize, run: F) -> T
where
    F: FnOnce() -> T + Send,
    T: Send,
{
    if threads == 0 {
        return run();
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            tracing::warn!("Could not build thread pool ({}), using the global pool", e);
            run()
        }
    }
}

/// Sorted direct children of `dir`; an unreadable directory has none.
pub(crate) fn list_dir(dir: &Path) -> Vec<PathBuf> {
    let mut children: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => {
            tracing::debug!(path = %dir.display(), "Cannot read directory: {}", e);
            Vec::new()
        }
    };
    children.sort();
    children
}

/// Sorted direct child directories of `dir`.
pub(crate) fn list_subdirs(dir: &Path) -> Vec<PathBuf> {
    list_dir(dir).into_iter().filter(|p| p.is_dir()).collect()
}

/// Measure `paths` in parallel, one leaf item each.
pub(crate) fn measure_paths(paths: &[PathBuf], options: &StorageOptions) -> Vec<SizedItem> {
    paths
        .par_iter()
        .map(|p| measure(p, options))
        .collect()
}

/// Measure a single path, turning an unreadable directory into an error item.
pub(crate) fn measure(path: &Path, options: &StorageOptions) -> SizedItem {
    if path.is_dir() {
        if let Err(e) = fs::read_dir(path) {
            return SizedItem::new_error(path, e.to_string());
        }
    }
    SizedItem::from_path(path, options.size_of(path))
}

/// A group made of the measured children of `dir`.
pub(crate) fn expand(name: &str, dir: &Path, options: &StorageOptions) -> SizedItem {
    match fs::read_dir(dir) {
        Ok(_) => SizedItem::group(name, dir, measure_paths(&list_dir(dir), options)),
        Err(e) => {
            let mut item = SizedItem::new_error(dir, e.to_string());
            item.name = name.to_string();
            item
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::StorageOptions;
    use std::fs;
    use std::path::Path;

    /// Options with exact byte counts regardless of the filesystem.
    pub fn exact() -> StorageOptions {
        StorageOptions {
            use_du: false,
            threads: 2,
        }
    }

    pub fn write_bytes(path: &Path, len: usize) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![b'x'; len]).unwrap();
    }
}
