//! Catalog command implementation

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::cli::CatalogArgs;
use crate::commands::print_json;
use crate::error::SweeperError;
use crate::project::VersionCatalog;

/// Run the catalog command
pub fn run(args: CatalogArgs) -> Result<()> {
    let path = catalog_path(&args.path)?;
    tracing::info!(path = %path.display(), "Reading version catalog");
    let catalog = VersionCatalog::load(&path).map_err(SweeperError::from)?;

    if args.json {
        return print_json(&catalog);
    }

    println!("{}", path.display());

    if !catalog.versions.is_empty() {
        println!("\n[versions]");
        for v in &catalog.versions {
            println!("  {:<36} {}", v.name, v.version);
        }
    }

    if !catalog.libraries.is_empty() {
        println!("\n[libraries]");
        for lib in &catalog.libraries {
            let version = match (&lib.version, &lib.version_ref) {
                (Some(v), Some(r)) => format!("{} (ref {})", v, r),
                (Some(v), None) => v.clone(),
                (None, Some(r)) => format!("? (unknown ref {})", r),
                (None, None) => "-".to_string(),
            };
            println!("  {:<36} {:<52} {}", lib.name, lib.id, version);
        }
    }

    if !catalog.plugins.is_empty() {
        println!("\n[plugins]");
        for plugin in &catalog.plugins {
            println!(
                "  {:<36} {:<52} {}",
                plugin.name,
                plugin.id,
                plugin.version.as_deref().unwrap_or("-")
            );
        }
    }

    if !catalog.bundles.is_empty() {
        println!("\n[bundles]");
        for bundle in &catalog.bundles {
            println!("  {:<36} {}", bundle.name, bundle.artifacts.join(", "));
        }
    }

    if catalog.is_empty() {
        println!("\nThe catalog is empty.");
    }
    Ok(())
}

/// A catalog file, or `gradle/libs.versions.toml` below a directory.
fn catalog_path(path: &Path) -> Result<PathBuf, SweeperError> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    let candidate = path.join("gradle").join("libs.versions.toml");
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(SweeperError::PathNotFound(candidate))
    }
}
