//! Storage command implementation

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::mpsc;
use std::thread;

use crate::cli::StorageArgs;
use crate::commands::print_json;
use crate::config::Config;
use crate::paths::ToolPaths;
use crate::storage::{
    format_size, format_tree, scan_storage_progressive, FormatOptions, StorageKind, StorageOptions,
    StorageReport, StorageUpdate,
};

/// Run the storage command
pub fn run(args: StorageArgs, config: &Config) -> Result<()> {
    let paths = ToolPaths::resolve(&config.paths);
    let kinds = args.only.clone().unwrap_or_else(|| StorageKind::ALL.to_vec());
    let options = StorageOptions {
        use_du: config.storage.use_du && !args.no_du,
        threads: args.jobs.unwrap_or(config.storage.parallel_threads),
    };

    tracing::info!(kinds = ?kinds, "Scanning storage");
    let report = scan_with_spinner(&paths, &kinds, &options, args.json)?;

    if args.json {
        return print_json(&report);
    }

    let format_options = FormatOptions::new()
        .with_max_depth(args.max_depth)
        .with_top_n(args.top)
        .with_counts(true);

    for section in &report.sections {
        println!("{}", section.kind());
        let item = section.to_item();
        if item.size == 0 && item.children.is_empty() {
            println!("  not found\n");
            continue;
        }
        println!("{}", format_tree(&item, &format_options));
    }

    println!("Total: {}", format_size(report.total_size()));
    Ok(())
}

fn scan_with_spinner(
    paths: &ToolPaths,
    kinds: &[StorageKind],
    options: &StorageOptions,
    hidden: bool,
) -> Result<StorageReport> {
    let progress = if hidden {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    };

    let (tx, rx) = mpsc::channel();
    let report = thread::scope(|scope| {
        scope.spawn(move || scan_storage_progressive(paths, kinds, options, tx));

        let mut pending: Vec<StorageKind> = Vec::new();
        let mut report = None;
        for update in rx {
            match update {
                StorageUpdate::Started { kind } => pending.push(kind),
                StorageUpdate::Finished { kind, size } => {
                    pending.retain(|k| *k != kind);
                    progress.println(format!("  {:<26} {:>10}", kind.display_name(), format_size(size)));
                }
                StorageUpdate::Complete { report: r } => report = Some(r),
            }
            let names: Vec<&str> = pending.iter().map(|k| k.as_str()).collect();
            progress.set_message(format!("Scanning {}", names.join(", ")));
        }
        report
    });
    progress.finish_and_clear();

    report.ok_or_else(|| anyhow::anyhow!("storage scan ended without a report"))
}
