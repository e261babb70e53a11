//! Clean command implementation.

use anyhow::Result;
use dialoguer::MultiSelect;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::cleaner::{
    summarize, BuildDirCleaner, BuildDirScanner, BuildDirectory, BuildProject, CleanOptions,
    DeleteStatus, ScanOptions,
};
use crate::cli::CleanArgs;
use crate::commands::{plural, truncate_left};
use crate::config::Config;

/// Run the clean command.
pub fn run(args: CleanArgs, config: &Config) -> Result<()> {
    // Resolve to absolute path
    let path = args
        .path
        .canonicalize()
        .unwrap_or_else(|_| args.path.clone());

    let mut exclude_patterns = config.clean.exclude_patterns.clone();
    exclude_patterns.extend(args.exclude.iter().cloned());

    let scan_options = ScanOptions {
        max_depth: args.max_depth.unwrap_or(config.clean.max_depth),
        exclude_patterns,
        follow_symlinks: false,
    };
    let scanner = BuildDirScanner::new(scan_options);

    println!("Scanning for Gradle build directories in {}...", path.display());
    let mut projects = scanner.scan_projects(&path);

    // Apply age filter if specified
    if let Some(age_days) = args.age {
        let before_count = projects.len();
        projects = BuildDirScanner::filter_by_age(projects, age_days as u64);
        if before_count > 0 && projects.is_empty() {
            println!(
                "Found {} project{}, but none older than {} days.",
                before_count,
                plural(before_count),
                age_days
            );
            return Ok(());
        }
    }

    if projects.is_empty() {
        println!("No Gradle build directories found.");
        return Ok(());
    }

    print_projects_table(&projects);

    let dirs: Vec<BuildDirectory> = projects.into_iter().flat_map(|p| p.dirs).collect();
    let total_size: u64 = dirs.iter().map(|d| d.size).sum();
    println!(
        "\nTotal: {} in {} director{}",
        format_size(total_size, BINARY),
        dirs.len(),
        if dirs.len() == 1 { "y" } else { "ies" }
    );

    if args.size_only {
        return Ok(());
    }

    let selected = if args.interactive {
        match select_dirs(&dirs)? {
            Some(selected) if !selected.is_empty() => selected,
            _ => {
                println!("Nothing selected.");
                return Ok(());
            }
        }
    } else {
        dirs
    };

    // Confirmation
    if !args.force && !args.dry_run {
        let size: u64 = selected.iter().map(|d| d.size).sum();
        print!(
            "\nDelete {} director{} ({})? [y/N] ",
            selected.len(),
            if selected.len() == 1 { "y" } else { "ies" },
            format_size(size, BINARY)
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let clean_options = CleanOptions {
        dry_run: args.dry_run,
        delay: Duration::from_millis(args.delay.unwrap_or(config.clean.delete_delay_ms)),
    };
    let cleaner = BuildDirCleaner::new(clean_options);

    if args.dry_run {
        println!("\n[DRY RUN] Would delete:");
    } else {
        println!("\nDeleting...");
    }

    let progress = ProgressBar::new(selected.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?,
    );

    let outcomes = cleaner.delete_all(&selected, |dir, status| {
        if status.is_finished() {
            progress.inc(1);
        }
        match status {
            DeleteStatus::Deleting => progress.set_message(dir.path.display().to_string()),
            DeleteStatus::Success { freed } if args.dry_run => progress.println(format!(
                "  {} ({})",
                dir.path.display(),
                format_size(*freed, BINARY)
            )),
            DeleteStatus::Failed { error } => progress.println(format!("  Failed: {}", error)),
            _ => {}
        }
    });
    progress.finish_and_clear();

    let summary = summarize(&outcomes);

    // Print results
    println!("\nResults:");
    println!(
        "  Deleted: {} director{}",
        summary.success_count,
        if summary.success_count == 1 { "y" } else { "ies" }
    );
    if summary.failed_count > 0 {
        println!(
            "  Failed:  {} director{}",
            summary.failed_count,
            if summary.failed_count == 1 { "y" } else { "ies" }
        );
    }
    println!("  Freed:   {}", format_size(summary.total_freed, BINARY));

    for (path, error) in &summary.errors {
        eprintln!("  Error deleting {}: {}", path.display(), error);
    }

    if !summary.is_clean() {
        std::process::exit(5); // Partial failure
    }

    Ok(())
}

fn select_dirs(dirs: &[BuildDirectory]) -> Result<Option<Vec<BuildDirectory>>> {
    let items: Vec<String> = dirs
        .iter()
        .map(|d| format!("{:>10}  {}", format_size(d.size, BINARY), d.path.display()))
        .collect();
    let defaults = vec![true; items.len()];

    let chosen = MultiSelect::new()
        .with_prompt("Select build directories to delete (space to toggle, enter to confirm)")
        .items(&items)
        .defaults(&defaults)
        .interact_opt()?;

    Ok(chosen.map(|indices| indices.into_iter().map(|i| dirs[i].clone()).collect()))
}

fn print_projects_table(projects: &[BuildProject]) {
    for project in projects {
        println!(
            "\n  {} ({}, {})",
            project.name,
            project.root.display(),
            format_size(project.total_size, BINARY)
        );
        println!("    {:<24} {:<44} {:>10}", "MODULE", "PATH", "SIZE");
        println!("    {}", "─".repeat(80));

        for dir in &project.dirs {
            let relative = dir
                .path
                .strip_prefix(&project.root)
                .unwrap_or(&dir.path)
                .display()
                .to_string();
            println!(
                "    {:<24} {:<44} {:>10}",
                dir.module_name,
                truncate_left(&relative, 44),
                format_size(dir.size, BINARY),
            );
        }
    }
}
