use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::MAX_DELETE_DELAY_MS;
use crate::storage::StorageKind;

/// Droid Sweeper - disk usage and Gradle project analysis for Android developers
#[derive(Parser, Debug)]
#[command(name = "droid-sweeper")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH", env = "DROID_SWEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show disk usage of Gradle, the Android SDK, emulators, Kotlin/Native, IDEs and JDKs
    Storage(StorageArgs),

    /// Analyze the build files of a Gradle project
    Project(ProjectArgs),

    /// Show the contents of a version catalog
    Catalog(CatalogArgs),

    /// List libraries in the local Gradle module cache
    Cache(CacheArgs),

    /// Find and delete Gradle build directories
    Clean(CleanArgs),

    /// Show detected tool locations
    Paths(PathsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Args, Debug)]
pub struct StorageArgs {
    /// Areas to scan (comma-separated): gradle, sdk, avd, konan, ide, jdk
    #[arg(short, long, value_delimiter = ',', value_name = "KINDS")]
    pub only: Option<Vec<StorageKind>>,

    /// Maximum depth to display
    #[arg(short = 'd', long, default_value = "2", value_name = "N")]
    pub max_depth: usize,

    /// Show top N entries per item
    #[arg(short = 'n', long, default_value = "15", value_name = "N")]
    pub top: usize,

    /// Parallel scan threads
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Always walk directories instead of calling `du`
    #[arg(long)]
    pub no_du: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project root directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Maximum depth when looking for build files
    #[arg(short = 'd', long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Only list dependencies and plugins missing from the local Gradle cache
    #[arg(long)]
    pub missing: bool,

    /// List the discovered Gradle files
    #[arg(long)]
    pub files: bool,

    /// Do not read the local Gradle module cache
    #[arg(long)]
    pub offline: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Catalog file, or a project directory containing gradle/libs.versions.toml
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Only show libraries whose group or artifact contains this text
    pub filter: Option<String>,

    /// Measure the size of every cached version
    #[arg(short, long)]
    pub sizes: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Show what would be deleted without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Maximum recursion depth
    #[arg(short = 'd', long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Directory names to skip (can be specified multiple times)
    #[arg(short, long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Only clean projects not modified in N days
    #[arg(short, long, value_name = "DAYS")]
    pub age: Option<u32>,

    /// Pick the directories to delete from a list
    #[arg(short, long, conflicts_with = "force")]
    pub interactive: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub force: bool,

    /// Pause between deletions in milliseconds
    #[arg(
        long,
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(0..=MAX_DELETE_DELAY_MS)
    )]
    pub delay: Option<u64>,

    /// Only report sizes, don't clean
    #[arg(long)]
    pub size_only: bool,
}

#[derive(Args, Debug)]
pub struct PathsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_storage_with_kinds() {
        let cli = Cli::parse_from(["droid-sweeper", "storage", "--only", "gradle,sdk", "--json"]);
        match cli.command {
            Command::Storage(args) => {
                assert_eq!(args.only, Some(vec![StorageKind::Gradle, StorageKind::Sdk]));
                assert!(args.json);
                assert_eq!(args.max_depth, 2);
            }
            _ => panic!("Expected Storage command"),
        }
    }

    #[test]
    fn clean_delay_is_bounded() {
        let cli = Cli::parse_from(["droid-sweeper", "clean", "--delay", "10000"]);
        match cli.command {
            Command::Clean(args) => assert_eq!(args.delay, Some(10_000)),
            _ => panic!("Expected Clean command"),
        }

        let result = Cli::try_parse_from(["droid-sweeper", "clean", "--delay", "20000"]);
        assert!(result.is_err());
    }

    #[test]
    fn reject_unknown_storage_kind() {
        let result = Cli::try_parse_from(["droid-sweeper", "storage", "--only", "maven"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_project_command() {
        let cli = Cli::parse_from(["droid-sweeper", "project", "/work/app", "--missing"]);
        match cli.command {
            Command::Project(args) => {
                assert_eq!(args.path, PathBuf::from("/work/app"));
                assert!(args.missing);
                assert!(!args.offline);
            }
            _ => panic!("Expected Project command"),
        }
    }

    #[test]
    fn parse_clean_with_options() {
        let cli = Cli::parse_from([
            "droid-sweeper",
            "clean",
            "--dry-run",
            "--exclude",
            "vendor",
            "--exclude",
            "third_party",
            "--max-depth",
            "5",
            "--age",
            "30",
            "/projects",
        ]);
        match cli.command {
            Command::Clean(args) => {
                assert!(args.dry_run);
                assert_eq!(args.max_depth, Some(5));
                assert_eq!(args.age, Some(30));
                assert_eq!(args.exclude, vec!["vendor", "third_party"]);
                assert_eq!(args.path, PathBuf::from("/projects"));
            }
            _ => panic!("Expected Clean command"),
        }
    }

    #[test]
    fn interactive_conflicts_with_force() {
        let result = Cli::try_parse_from(["droid-sweeper", "clean", "-i", "-f"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_verbose_flag() {
        let cli = Cli::parse_from(["droid-sweeper", "-vvv", "paths"]);
        assert_eq!(cli.verbose, 3);
    }
}
