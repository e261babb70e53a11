//! Cache command implementation

use anyhow::Result;

use crate::cli::CacheArgs;
use crate::commands::{plural, print_json};
use crate::config::Config;
use crate::error::SweeperError;
use crate::paths::ToolPaths;
use crate::storage::{format_size, modules_cache_dir, GradleLibraryInfo, GradleModulesInfo};

/// Run the cache command
pub fn run(args: CacheArgs, config: &Config) -> Result<()> {
    let paths = ToolPaths::resolve(&config.paths);
    let home = paths
        .gradle_home
        .ok_or_else(|| SweeperError::Other("Gradle user home not found".to_string()))?;

    tracing::info!(path = %modules_cache_dir(&home).display(), "Indexing module cache");
    let index = GradleModulesInfo::scan(&home, args.sizes);

    let libraries: Vec<&GradleLibraryInfo> = match &args.filter {
        Some(needle) => index.filter(needle),
        None => index.libraries.iter().collect(),
    };

    if args.json {
        return print_json(&libraries);
    }

    if index.is_empty() {
        println!("No cached modules in {}", index.root.display());
        return Ok(());
    }

    for lib in &libraries {
        if args.sizes {
            println!(
                "{:<64} {:>10}  {}",
                lib.id(),
                format_size(lib.size),
                lib.version_names().join(", ")
            );
        } else {
            println!("{:<64} {}", lib.id(), lib.version_names().join(", "));
        }
    }

    let versions: usize = libraries.iter().map(|l| l.versions.len()).sum();
    print!(
        "\n{} librar{}, {} version{}",
        libraries.len(),
        if libraries.len() == 1 { "y" } else { "ies" },
        versions,
        plural(versions)
    );
    if args.sizes {
        let size: u64 = libraries.iter().map(|l| l.size).sum();
        print!(", {}", format_size(size));
    }
    println!();
    Ok(())
}
