use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{file_name, list_dir, SizedItem, StorageOptions};

/// Parse an emulator `.ini` file into `key -> value`.
///
/// Lines without `=` and `#`/`;` comments are ignored; keys and values are
/// trimmed. A repeated key keeps its last value.
pub fn parse_ini(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

fn read_ini(path: &Path) -> BTreeMap<String, String> {
    match fs::read_to_string(path) {
        Ok(text) => parse_ini(&text),
        Err(_) => BTreeMap::new(),
    }
}

/// One Android Virtual Device.
#[derive(Debug, Clone, Serialize)]
pub struct AvdInfo {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub device: Option<String>,
    pub api_level: Option<String>,
    pub abi: Option<String>,
    pub target: Option<String>,
    pub snapshots_size: u64,
}

impl AvdInfo {
    fn scan(name: String, dir: &Path, ini: &BTreeMap<String, String>, options: &StorageOptions) -> Self {
        let config = read_ini(&dir.join("config.ini"));
        let api_level = config
            .get("image.androidVersion.api")
            .cloned()
            .or_else(|| target_api(config.get("target").or_else(|| ini.get("target"))));
        Self {
            name,
            path: dir.to_path_buf(),
            size: options.size_of(dir),
            device: config.get("hw.device.name").cloned(),
            api_level,
            abi: config.get("abi.type").cloned(),
            target: config.get("target").or_else(|| ini.get("target")).cloned(),
            snapshots_size: options.size_of(&dir.join("snapshots")),
        }
    }
}

/// `android-34` -> `34`.
fn target_api(target: Option<&String>) -> Option<String> {
    target
        .and_then(|t| t.strip_prefix("android-"))
        .map(str::to_string)
}

/// Storage used by the emulator's virtual devices.
#[derive(Debug, Clone, Serialize)]
pub struct AndroidAvdInfo {
    pub root: Option<PathBuf>,
    pub exists: bool,
    pub avds: Vec<AvdInfo>,
    pub total_size: u64,
}

impl AndroidAvdInfo {
    pub fn scan(root: Option<&Path>, options: &StorageOptions) -> Self {
        let exists = root.map_or(false, |r| r.is_dir());
        let candidates = match root {
            Some(root) if exists => find_avds(root),
            _ => Vec::new(),
        };

        let mut avds: Vec<AvdInfo> = candidates
            .par_iter()
            .map(|(name, dir, ini)| AvdInfo::scan(name.clone(), dir, ini, options))
            .collect();
        avds.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));

        let total_size = avds.iter().map(|a| a.size).sum();
        tracing::debug!(count = avds.len(), total_size, "Scanned AVDs");

        Self {
            root: root.map(Path::to_path_buf),
            exists,
            avds,
            total_size,
        }
    }

    pub fn avd(&self, name: &str) -> Option<&AvdInfo> {
        self.avds.iter().find(|a| a.name == name)
    }

    pub fn to_item(&self) -> SizedItem {
        let children = self
            .avds
            .iter()
            .map(|a| SizedItem::new(a.name.clone(), a.path.clone(), a.size))
            .collect();
        SizedItem::group(
            "Android Virtual Devices",
            self.root.clone().unwrap_or_default(),
            children,
        )
    }
}

/// `<name>.avd` directories in `root`, plus directories named by the
/// `path=` entry of a `<name>.ini` file.
fn find_avds(root: &Path) -> Vec<(String, PathBuf, BTreeMap<String, String>)> {
    let entries = list_dir(root);
    let mut found: Vec<(String, PathBuf, BTreeMap<String, String>)> = Vec::new();

    for entry in &entries {
        let name = file_name(entry);
        if let Some(stem) = name.strip_suffix(".ini") {
            let ini = read_ini(entry);
            let dir = ini
                .get("path")
                .map(PathBuf::from)
                .filter(|p| p.is_dir())
                .unwrap_or_else(|| root.join(format!("{}.avd", stem)));
            if dir.is_dir() {
                found.push((stem.to_string(), dir, ini));
            }
        }
    }

    for entry in &entries {
        let name = file_name(entry);
        if let Some(stem) = name.strip_suffix(".avd") {
            let known = found.iter().any(|(n, d, _)| n == stem || d == entry);
            if entry.is_dir() && !known {
                found.push((stem.to_string(), entry.clone(), BTreeMap::new()));
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{exact, write_bytes};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_ini() {
        let ini = parse_ini(
            "# comment\nhw.device.name = pixel_7\nabi.type=x86_64\n\nnot a pair\n; other\nabi.type=arm64-v8a\n",
        );
        assert_eq!(ini.get("hw.device.name").map(String::as_str), Some("pixel_7"));
        assert_eq!(ini.get("abi.type").map(String::as_str), Some("arm64-v8a"));
        assert_eq!(ini.len(), 2);
    }

    #[test]
    fn test_parse_ini_value_with_equals() {
        let ini = parse_ini("path=/a/b=c\n");
        assert_eq!(ini.get("path").map(String::as_str), Some("/a/b=c"));
    }

    #[test]
    fn test_scan_reads_metadata() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let avd_dir = root.join("Pixel_7_API_34.avd");
        write_bytes(&avd_dir.join("userdata-qemu.img"), 700);
        write_bytes(&avd_dir.join("snapshots/default_boot/ram.bin"), 300);
        fs::write(
            avd_dir.join("config.ini"),
            "hw.device.name=pixel_7\nabi.type=x86_64\nimage.androidVersion.api=34\n",
        )
        .unwrap();
        fs::write(
            root.join("Pixel_7_API_34.ini"),
            format!("avd.ini.encoding=UTF-8\npath={}\ntarget=android-34\n", avd_dir.display()),
        )
        .unwrap();

        let info = AndroidAvdInfo::scan(Some(root), &exact());
        assert_eq!(info.avds.len(), 1);

        let avd = info.avd("Pixel_7_API_34").unwrap();
        assert_eq!(avd.device.as_deref(), Some("pixel_7"));
        assert_eq!(avd.abi.as_deref(), Some("x86_64"));
        assert_eq!(avd.api_level.as_deref(), Some("34"));
        assert_eq!(avd.target.as_deref(), Some("android-34"));
        assert_eq!(avd.snapshots_size, 300);
        assert!(avd.size >= 1000);
        assert_eq!(info.total_size, avd.size);
    }

    #[test]
    fn test_avd_dir_without_ini_is_found() {
        let tmp = TempDir::new().unwrap();
        write_bytes(&tmp.path().join("Old.avd/sdcard.img"), 64);

        let info = AndroidAvdInfo::scan(Some(tmp.path()), &exact());
        assert_eq!(info.avds.len(), 1);
        assert_eq!(info.avds[0].name, "Old");
        assert_eq!(info.avds[0].size, 64);
        assert!(info.avds[0].device.is_none());
    }

    #[test]
    fn test_api_level_from_target() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("Tablet.avd");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.ini"), "target=android-30\n").unwrap();

        let info = AndroidAvdInfo::scan(Some(tmp.path()), &exact());
        assert_eq!(info.avds[0].api_level.as_deref(), Some("30"));
    }

    #[test]
    fn test_missing_root() {
        let info = AndroidAvdInfo::scan(Some(Path::new("/nonexistent/avd/1")), &exact());
        assert!(!info.exists);
        assert!(info.avds.is_empty());
        assert_eq!(info.total_size, 0);
    }
}
