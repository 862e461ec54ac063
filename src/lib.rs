//! # sitesync
//!
//! Moves CMS file trees and databases between a local development site and
//! named remote environments, rewriting the site domain inside the database.
//!
//! ## Usage
//!
//! ```bash
//! sitesync push staging tpud
//! sitesync pull -e production --uploads --database
//! sitesync db:export -e staging --replace production
//! ```
//!
//! ## Modules
//!
//! - `config` - Configuration file model, loading and validation
//! - `registry` - Environment lookup and implicit environment resolution
//! - `domain` - Reduces base URLs to the host used for search-replace
//! - `subprocess` - Process runner, pipes, dry-run and mock runners
//! - `transfer` - Sync targets and the rsync file adapter
//! - `database` - Backup, export, import and search-replace pipeline
//! - `storage` - Dump file layout and the rotating operation log
//! - `interaction` - Confirmation prompts
//! - `orchestrator` - Per-target dispatch with permission checks
//! - `cli` - Argument parsing and command routing
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod interaction;
pub mod orchestrator;
pub mod registry;
pub mod storage;
pub mod subprocess;
pub mod transfer;

pub use database::Outcome;
pub use error::{Result, SyncError};
