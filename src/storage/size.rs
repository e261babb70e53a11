use std::path::Path;
use std::process::Command;
use walkdir::WalkDir;

/// Recursive size of `path` in bytes.
///
/// Uses `du -sk` on Unix and falls back to a file walk when `du` is
/// unavailable or fails. Unreadable entries count as zero.
pub fn folder_size(path: &Path) -> u64 {
    folder_size_with(path, cfg!(unix))
}

/// Like [`folder_size`], with explicit control over the `du` shortcut.
pub fn folder_size_with(path: &Path, use_du: bool) -> u64 {
    if !path.exists() {
        return 0;
    }
    if path.is_file() {
        return path.metadata().map(|m| m.len()).unwrap_or(0);
    }
    if use_du {
        if let Some(size) = du_size(path) {
            return size;
        }
        tracing::debug!(path = %path.display(), "du unavailable, walking directory");
    }
    folder_size_walk(path)
}

/// Sum of regular file lengths below `path`.
pub fn folder_size_walk(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

fn du_size(path: &Path) -> Option<u64> {
    if !cfg!(unix) {
        return None;
    }
    let output = Command::new("du").arg("-sk").arg(path).output().ok()?;
    if !output.status.success() {
        return None;
    }
    parse_du_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the first column of `du -sk` output as KiB.
fn parse_du_output(stdout: &str) -> Option<u64> {
    stdout
        .split_whitespace()
        .next()?
        .parse::<u64>()
        .ok()
        .map(|kib| kib * 1024)
}

/// Format size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} B", bytes)
    } else if size >= 100.0 {
        format!("{:.0} {}", size, UNITS[unit_idx])
    } else if size >= 10.0 {
        format!("{:.1} {}", size, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Parse a size string like "1GB" into bytes
pub fn parse_size(s: &str) -> Option<u64> {
    let s = s.trim().to_uppercase();

    let (num_str, unit) = if let Some(n) = s.strip_suffix("TB") {
        (n, 1024u64.pow(4))
    } else if let Some(n) = s.strip_suffix("GB") {
        (n, 1024u64.pow(3))
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024u64.pow(2))
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024u64)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1u64)
    } else {
        (s.as_str(), 1u64)
    };

    num_str
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| *n >= 0.0)
        .map(|n| (n * unit as f64) as u64)
}
