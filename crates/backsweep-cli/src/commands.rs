use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "backsweep")]
#[command(about = "Verify backups and clear local data directories", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full pipeline: validate backups, then delete local files
    /// with a valid backup under the configured policy
    Run {
        /// Plan deletions but do not delete anything
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt before deleting
        #[arg(long, short = 'y')]
        yes: bool,
        /// Write a CSV verdict report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Validate backups only, without planning or deleting
    Validate {
        /// Write a CSV verdict report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Display row counts from the verdict store
    CacheStats,
    /// Delete every row from the verdict store
    ClearCache,
    /// Print configuration values
    PrintConfig,
}
