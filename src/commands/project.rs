//! Project command implementation

use anyhow::Result;

use crate::cli::ProjectArgs;
use crate::commands::{plural, print_json};
use crate::config::Config;
use crate::paths::ToolPaths;
use crate::project::{analyze_project, Dependency, DiscoveryOptions, Plugin, ProjectInfo};
use crate::storage::{format_size, GradleModulesInfo};

/// Run the project command
pub fn run(args: ProjectArgs, config: &Config) -> Result<()> {
    let root = args.path.canonicalize().unwrap_or_else(|_| args.path.clone());
    let options = DiscoveryOptions {
        max_depth: args.max_depth.unwrap_or(config.project.max_depth),
        exclude_dirs: config.project.exclude_dirs.clone(),
    };

    let modules_index = if args.offline {
        GradleModulesInfo::empty()
    } else {
        load_modules_index(&ToolPaths::resolve(&config.paths))
    };

    let info = analyze_project(&root, &modules_index, &options)?;

    if args.json {
        return print_json(&info);
    }

    print_overview(&info);
    if let Some(error) = &info.catalog_error {
        eprintln!("Warning: {}", error);
    }

    if args.files {
        print_files(&info);
    }

    if args.missing {
        print_missing(&info, modules_index.is_empty());
        return Ok(());
    }

    for module in &info.modules {
        println!(
            "\n{} ({} line{})",
            module.name,
            module.lines,
            plural(module.lines)
        );
        for plugin in &module.plugins {
            println!("  plugin  {}", plugin_line(plugin));
        }
        for dep in &module.dependencies {
            println!("  {}", dependency_line(dep));
        }
        for edge in &module.project_dependencies {
            println!("  {:<22} project {}", edge.configuration, edge.target);
        }
    }

    let missing = info.missing_dependencies().len() + info.missing_plugins().len();
    if missing > 0 && !modules_index.is_empty() {
        println!(
            "\n{} declaration{} not in the local Gradle cache (use --missing to list)",
            missing,
            plural(missing)
        );
    }
    Ok(())
}

fn load_modules_index(paths: &ToolPaths) -> GradleModulesInfo {
    match &paths.gradle_home {
        Some(home) => GradleModulesInfo::scan(home, false),
        None => {
            tracing::warn!("Gradle user home not found, skipping cache lookups");
            GradleModulesInfo::empty()
        }
    }
}

fn print_overview(info: &ProjectInfo) {
    let o = &info.overview;
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    println!("Project:   {}", o.name);
    println!("Root:      {}", o.root.display());
    println!("Gradle:    {}", or_dash(&o.gradle_version));
    println!("AGP:       {}", or_dash(&o.agp_version));
    println!("Kotlin:    {}", or_dash(&o.kotlin_version));
    println!(
        "SDK:       compile {}, min {}, target {}",
        or_dash(&o.compile_sdk),
        or_dash(&o.min_sdk),
        or_dash(&o.target_sdk)
    );
    println!(
        "Modules:   {}   Dependencies: {}   Plugins: {}",
        o.module_count, o.dependency_count, o.plugin_count
    );
    if let Some(catalog) = &info.version_catalog {
        println!(
            "Catalog:   {} versions, {} libraries, {} plugins, {} bundles",
            catalog.versions.len(),
            catalog.libraries.len(),
            catalog.plugins.len(),
            catalog.bundles.len()
        );
    }
}

fn print_files(info: &ProjectInfo) {
    println!("\n  {:<16} {:<56} {:>10}", "KIND", "FILE", "SIZE");
    println!("  {}", "─".repeat(84));
    for file in &info.files {
        println!(
            "  {:<16} {:<56} {:>10}",
            file.kind.label(),
            file.relative_path,
            format_size(file.size)
        );
    }
}

fn print_missing(info: &ProjectInfo, no_cache: bool) {
    if no_cache {
        println!("\nThe local Gradle cache is empty or was not read.");
        return;
    }

    let deps = info.missing_dependencies();
    let plugins = info.missing_plugins();
    if deps.is_empty() && plugins.is_empty() {
        println!("\nAll declared versions are in the local Gradle cache.");
        return;
    }

    for dep in deps {
        println!("  {}", dependency_line(dep));
    }
    for plugin in plugins {
        println!("  plugin  {}", plugin_line(plugin));
    }
}

fn status(declared: Option<&str>, available: &[String], synced: bool) -> String {
    match declared {
        _ if synced => "[cached]".to_string(),
        Some(_) if available.is_empty() => "[missing]".to_string(),
        Some(_) => format!("[cached: {}]", available.join(", ")),
        None => String::new(),
    }
}

fn dependency_line(dep: &Dependency) -> String {
    if !dep.is_resolved() {
        return format!("{:<22} {} [unresolved]", dep.configuration, dep.artifact);
    }
    format!(
        "{:<22} {} {}",
        dep.configuration,
        dep.notation(),
        status(dep.version.as_deref(), &dep.available_versions, dep.is_version_synced)
    )
    .trim_end()
    .to_string()
}

fn plugin_line(plugin: &Plugin) -> String {
    let id = match &plugin.version {
        Some(v) => format!("{} {}", plugin.id, v),
        None => plugin.id.clone(),
    };
    format!(
        "{} {}",
        id,
        status(plugin.version.as_deref(), &plugin.available_versions, plugin.is_version_synced)
    )
    .trim_end()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::DependencyStyle;

    fn dep(version: Option<&str>, available: &[&str], synced: bool) -> Dependency {
        Dependency {
            group: "androidx.core".to_string(),
            artifact: "core-ktx".to_string(),
            version: version.map(str::to_string),
            module: ":app".to_string(),
            configuration: "implementation".to_string(),
            style: DependencyStyle::Direct,
            source_alias: None,
            available_versions: available.iter().map(|s| s.to_string()).collect(),
            is_version_synced: synced,
        }
    }

    #[test]
    fn test_dependency_line_status() {
        assert!(dependency_line(&dep(Some("1.12.0"), &["1.12.0"], true)).ends_with("[cached]"));
        assert!(dependency_line(&dep(Some("1.13.0"), &[], false)).ends_with("[missing]"));
        assert!(dependency_line(&dep(Some("1.13.0"), &["1.12.0"], false))
            .ends_with("[cached: 1.12.0]"));
        assert!(dependency_line(&dep(None, &[], false)).ends_with("androidx.core:core-ktx"));
    }

    #[test]
    fn test_unresolved_alias_line() {
        let mut d = dep(None, &[], false);
        d.group = String::new();
        d.artifact = "composeBom".to_string();
        assert!(dependency_line(&d).ends_with("composeBom [unresolved]"));
    }
}
