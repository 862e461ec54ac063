//! CLI argument structures

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::transfer::SyncTarget;

/// Push and pull site files and databases between environments
#[derive(Parser, Debug)]
#[command(name = "sitesync")]
#[command(
    about = "sitesync - Push and pull site files and databases between environments",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Take backups but only print the commands that would change anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Configuration file (defaults to $SITESYNC_CONFIG, then ./sitesync.yml)
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy local files and database to a remote environment
    Push(TransferArgs),

    /// Copy a remote environment's files and database to local
    Pull(TransferArgs),

    /// Export an environment's database to a file
    #[command(name = "db:export")]
    DbExport {
        /// Environment to export (required)
        #[arg(short = 'e', long = "env", value_name = "ENV")]
        env: Option<String>,

        /// Rewrite domains for importing into this environment
        #[arg(long, value_name = "ENV")]
        replace: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct TransferArgs {
    /// Optional environment followed by targets, e.g. `staging themes uploads` or `tpud`
    #[arg(value_name = "ENV|TARGET")]
    pub words: Vec<String>,

    /// Environment to sync with
    #[arg(short = 'e', long = "env", value_name = "ENV")]
    pub env: Option<String>,

    /// Select every target
    #[arg(short = 'a', long)]
    pub all: bool,

    #[arg(short = 't', long)]
    pub themes: bool,

    #[arg(short = 'p', long)]
    pub plugins: bool,

    /// Must-use plugins; skipped with a warning when missing remotely
    #[arg(short = 'm', long = "mu-plugins")]
    pub mu_plugins: bool,

    #[arg(short = 'l', long)]
    pub languages: bool,

    /// Never deletes anything at the destination
    #[arg(short = 'u', long)]
    pub uploads: bool,

    #[arg(short = 'd', long, visible_alias = "db")]
    pub database: bool,
}

impl TransferArgs {
    /// Targets chosen through individual flags
    pub fn flagged_targets(&self) -> Vec<SyncTarget> {
        [
            (self.themes, SyncTarget::Themes),
            (self.plugins, SyncTarget::Plugins),
            (self.mu_plugins, SyncTarget::MuPlugins),
            (self.languages, SyncTarget::Languages),
            (self.uploads, SyncTarget::Uploads),
            (self.database, SyncTarget::Database),
        ]
        .into_iter()
        .filter_map(|(set, target)| set.then_some(target))
        .collect()
    }
}
