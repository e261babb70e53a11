use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{file_name, list_subdirs, measure_paths, SizedItem, StorageOptions};
use crate::paths::{IdeDataKind, IdeRoot};

/// Product folders under the Google data roots that belong to Android Studio.
const ANDROID_STUDIO_PREFIX: &str = "AndroidStudio";

/// Usage of one IDE data root such as `~/.cache/Google`.
#[derive(Debug, Clone, Serialize)]
pub struct IdeRootUsage {
    pub root: IdeRoot,
    pub exists: bool,
    /// Sized product folders, e.g. `AndroidStudio2024.1`
    pub items: Vec<SizedItem>,
    pub size: u64,
}

impl IdeRootUsage {
    fn scan(root: &IdeRoot, options: &StorageOptions) -> Self {
        let exists = root.path.is_dir();
        let products: Vec<PathBuf> = if exists {
            list_subdirs(&root.path)
                .into_iter()
                .filter(|p| keep_product(root, &file_name(p)))
                .collect()
        } else {
            Vec::new()
        };

        let mut items = measure_paths(&products, options);
        items.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));
        let size = items.iter().map(|i| i.size).sum();

        Self {
            root: root.clone(),
            exists,
            items,
            size,
        }
    }

    fn label(&self) -> String {
        format!("{} {}", self.root.vendor, self.root.kind)
    }
}

fn keep_product(root: &IdeRoot, name: &str) -> bool {
    root.kind == IdeDataKind::Custom
        || root.vendor != "Google"
        || name.starts_with(ANDROID_STUDIO_PREFIX)
}

/// Storage used by IDE caches, configuration, data and logs.
#[derive(Debug, Clone, Serialize)]
pub struct IdeDataInfo {
    pub roots: Vec<IdeRootUsage>,
    pub total_size: u64,
}

impl IdeDataInfo {
    pub fn scan(roots: &[IdeRoot], options: &StorageOptions) -> Self {
        let roots: Vec<IdeRootUsage> = roots
            .iter()
            .map(|root| IdeRootUsage::scan(root, options))
            .collect();
        let total_size = roots.iter().map(|r| r.size).sum();
        tracing::debug!(roots = roots.len(), total_size, "Scanned IDE data");
        Self { roots, total_size }
    }

    /// Total size per product folder name across every root, largest first.
    pub fn by_product(&self) -> Vec<(String, u64)> {
        let mut totals: BTreeMap<String, u64> = BTreeMap::new();
        for item in self.roots.iter().flat_map(|r| r.items.iter()) {
            *totals.entry(item.name.clone()).or_default() += item.size;
        }
        let mut products: Vec<(String, u64)> = totals.into_iter().collect();
        products.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        products
    }

    pub fn to_item(&self) -> SizedItem {
        let children = self
            .roots
            .iter()
            .filter(|r| r.exists)
            .map(|r| SizedItem::group(r.label(), r.root.path.clone(), r.items.clone()))
            .collect();
        SizedItem::group("IDE data", PathBuf::new(), children)
    }
}
