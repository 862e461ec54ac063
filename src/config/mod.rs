//! Configuration file model
//!
//! The configuration is read once at startup into an immutable [`SyncConfig`]
//! that is then passed by reference to everything that needs it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::transfer::{Direction, SyncTarget};

pub mod loader;
pub mod validator;

pub use loader::ConfigLoader;
pub use validator::validate;

/// Name of the distinguished local development environment
pub const LOCAL_ENVIRONMENT: &str = "local";

/// Directory under the backup root that holds cross-environment exports
pub const EXPORTS_DIR: &str = "exports";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Multi-site installs run search-replace across the whole network
    #[serde(default)]
    pub multisite: bool,

    /// Default database-client invocation, split with shell-word rules
    #[serde(default = "default_db_client")]
    pub db_client: String,

    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default = "default_log_max_bytes")]
    pub log_max_bytes: u64,

    #[serde(default = "default_log_max_archives")]
    pub log_max_archives: usize,

    /// Root-relative directory holding themes, plugins, uploads, ...
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// Columns never touched by search-replace
    #[serde(default = "default_skip_columns")]
    pub skip_columns: Vec<String>,

    pub environments: BTreeMap<String, EnvironmentConfig>,

    /// Directory of the configuration file; relative paths resolve against it
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Host reference handed to the remote shell (absent for local)
    pub ssh: Option<String>,
    /// Site root: a remote filesystem path, or local path relative to the config
    pub root: Option<String>,
    /// Base URL of the site
    pub domain: Option<String>,
    /// Overrides the global database-client invocation
    pub db_client: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub permissions: BTreeMap<SyncTarget, TargetPermissions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPermissions {
    #[serde(default = "allowed")]
    pub push: bool,
    #[serde(default = "allowed")]
    pub pull: bool,
}

impl Default for TargetPermissions {
    fn default() -> Self {
        Self {
            push: true,
            pull: true,
        }
    }
}

impl TargetPermissions {
    pub fn allows(&self, direction: Direction) -> bool {
        match direction {
            Direction::Push => self.push,
            Direction::Pull => self.pull,
        }
    }
}

fn allowed() -> bool {
    true
}

fn default_db_client() -> String {
    "wp".to_string()
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/sitesync.log")
}

fn default_log_max_bytes() -> u64 {
    1024 * 1024
}

fn default_log_max_archives() -> usize {
    5
}

fn default_content_dir() -> String {
    "wp-content".to_string()
}

fn default_skip_columns() -> Vec<String> {
    vec!["guid".to_string()]
}

impl SyncConfig {
    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Absolute root of the per-environment backup tree
    pub fn backup_root(&self) -> PathBuf {
        self.resolve(&self.backup_dir)
    }

    /// Absolute path of the active operation log
    pub fn log_path(&self) -> PathBuf {
        self.resolve(&self.log_file)
    }

    /// Absolute root of the local site
    pub fn local_root(&self) -> PathBuf {
        let root = self
            .environments
            .get(LOCAL_ENVIRONMENT)
            .and_then(|env| env.root.as_deref())
            .unwrap_or(".");
        self.resolve(Path::new(root))
    }
}
