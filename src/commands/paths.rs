//! Paths command implementation

use anyhow::Result;
use std::path::Path;

use crate::cli::PathsArgs;
use crate::commands::print_json;
use crate::config::Config;
use crate::paths::ToolPaths;

/// Run the paths command
pub fn run(args: PathsArgs, config: &Config) -> Result<()> {
    let paths = ToolPaths::resolve(&config.paths);

    if args.json {
        return print_json(&paths);
    }

    let tools: [(&str, Option<&Path>); 6] = [
        ("Android SDK", paths.android_sdk.as_deref()),
        ("Gradle user home", paths.gradle_home.as_deref()),
        ("Gradle installation", paths.gradle_installation.as_deref()),
        ("AVD home", paths.avd_home.as_deref()),
        ("Kotlin/Native", paths.konan_home.as_deref()),
        ("JAVA_HOME", paths.java_home.as_deref()),
    ];
    for (label, path) in tools {
        println!("{:<22} {}", label, describe(path));
    }

    println!("\nJDK search roots");
    for root in &paths.jdk_roots {
        println!("  {:<20} {}", root.source.to_string(), describe(Some(&root.path)));
    }

    println!("\nIDE data roots");
    for root in &paths.ide_roots {
        let label = format!("{} {}", root.vendor, root.kind);
        println!("  {:<20} {}", label, describe(Some(&root.path)));
    }

    if let Some(config_path) = Config::default_path() {
        println!("\nConfiguration file: {}", describe(Some(&config_path)));
    }
    Ok(())
}

fn describe(path: Option<&Path>) -> String {
    match path {
        Some(p) if p.exists() => p.display().to_string(),
        Some(p) => format!("{} (missing)", p.display()),
        None => "not set".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_describe() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(describe(Some(tmp.path())), tmp.path().display().to_string());
        assert!(describe(Some(&tmp.path().join("nope"))).ends_with("(missing)"));
        assert_eq!(describe(None), "not set");
    }
}
