use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{expand, file_name, list_dir, list_subdirs, measure, measure_paths, SizedItem, StorageOptions};

/// SDK folders broken down by version.
const VERSIONED: &[&str] = &["platforms", "build-tools", "ndk", "cmake", "sources"];

/// Storage used by the Android SDK.
#[derive(Debug, Clone, Serialize)]
pub struct AndroidSdkInfo {
    pub root: Option<PathBuf>,
    pub exists: bool,
    pub components: Vec<SizedItem>,
    pub total_size: u64,
}

impl AndroidSdkInfo {
    pub fn scan(root: Option<&Path>, options: &StorageOptions) -> Self {
        let exists = root.map_or(false, |r| r.is_dir());
        let mut components: Vec<SizedItem> = match root {
            Some(root) if exists => list_dir(root)
                .into_iter()
                .map(|child| scan_component(&child, options))
                .collect(),
            _ => Vec::new(),
        };
        components.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));

        let total_size = components.iter().map(|c| c.size).sum();
        tracing::debug!(total_size, "Scanned Android SDK");

        Self {
            root: root.map(Path::to_path_buf),
            exists,
            components,
            total_size,
        }
    }

    pub fn component(&self, name: &str) -> Option<&SizedItem> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Version names found under a versioned component, e.g. `platforms`.
    pub fn versions(&self, component: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .component(component)
            .map(|c| c.children.iter().map(|v| v.name.clone()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn platforms(&self) -> Vec<String> {
        self.versions("platforms")
    }

    pub fn build_tools(&self) -> Vec<String> {
        self.versions("build-tools")
    }

    pub fn ndk_versions(&self) -> Vec<String> {
        self.versions("ndk")
    }

    pub fn system_images(&self) -> Vec<String> {
        self.versions("system-images")
    }

    pub fn to_item(&self) -> SizedItem {
        SizedItem::group(
            "Android SDK",
            self.root.clone().unwrap_or_default(),
            self.components.clone(),
        )
    }
}

fn scan_component(path: &Path, options: &StorageOptions) -> SizedItem {
    let name = file_name(path);
    if !path.is_dir() {
        return measure(path, options);
    }
    if name == "system-images" {
        return scan_system_images(path, options);
    }
    if VERSIONED.contains(&name.as_str()) {
        return expand(&name, path, options);
    }
    measure(path, options)
}

/// `system-images/<api>/<tag>/<abi>` flattened to one item per image.
fn scan_system_images(dir: &Path, options: &StorageOptions) -> SizedItem {
    let mut images = Vec::new();
    for api in list_subdirs(dir) {
        for tag in list_subdirs(&api) {
            for abi in list_subdirs(&tag) {
                images.push(abi);
            }
        }
    }

    let children = measure_paths(&images, options)
        .into_iter()
        .map(|mut item| {
            item.name = image_name(dir, &item.path);
            item
        })
        .collect();
    SizedItem::group("system-images", dir, children)
}

fn image_name(base: &Path, image: &Path) -> String {
    image
        .strip_prefix(base)
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_else(|_| file_name(image))
}
