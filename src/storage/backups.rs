//! Directory convention for timestamped database dumps
//!
//! ```text
//! <backup-root>/<environment>/<category>-<YYYYmmdd-HHMM>.sql
//! <backup-root>/exports/<source>-to-<target>-<YYYYmmdd-HHMM>.sql
//! ```
//!
//! Dumps are write-once. A second dump in the same minute gets a `-2`, `-3`,
//! ... suffix instead of replacing the first.

use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::EXPORTS_DIR;
use crate::error::{common, Result};

pub const DUMP_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M";
const DUMP_EXTENSION: &str = "sql";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpCategory {
    /// Local database before a push overwrites a remote
    LocalBackup,
    /// Local database before a pull overwrites it
    BeforePull,
    /// Remote database captured at pull time
    RemoteBackup,
    /// Standalone export
    Export,
}

impl DumpCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DumpCategory::LocalBackup => "local-backup",
            DumpCategory::BeforePull => "before-pull",
            DumpCategory::RemoteBackup => "remote-backup",
            DumpCategory::Export => "export",
        }
    }
}

impl fmt::Display for DumpCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct BackupStore {
    root: PathBuf,
}

impl BackupStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn environment_dir(&self, environment: &str) -> PathBuf {
        self.root.join(environment)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join(EXPORTS_DIR)
    }

    /// Reserve a fresh path for a dump owned by `environment`
    pub async fn dump_path(&self, environment: &str, category: DumpCategory) -> Result<PathBuf> {
        self.dump_path_at(environment, category, Local::now().naive_local())
            .await
    }

    pub async fn dump_path_at(
        &self,
        environment: &str,
        category: DumpCategory,
        at: NaiveDateTime,
    ) -> Result<PathBuf> {
        let stem = format!("{}-{}", category, at.format(DUMP_TIMESTAMP_FORMAT));
        allocate(&self.environment_dir(environment), &stem).await
    }

    /// Reserve a fresh path for a one-way export rewritten for `target`
    pub async fn export_path(&self, source: &str, target: &str) -> Result<PathBuf> {
        self.export_path_at(source, target, Local::now().naive_local())
            .await
    }

    pub async fn export_path_at(
        &self,
        source: &str,
        target: &str,
        at: NaiveDateTime,
    ) -> Result<PathBuf> {
        let stem = format!(
            "{}-to-{}-{}",
            source,
            target,
            at.format(DUMP_TIMESTAMP_FORMAT)
        );
        allocate(&self.exports_dir(), &stem).await
    }
}

/// Create `dir` and return the first `<stem>[-n].sql` in it that does not exist
async fn allocate(dir: &Path, stem: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| common::storage_io_error(dir.to_path_buf(), "create backup directory", e))?;

    let mut candidate = dir.join(format!("{}.{}", stem, DUMP_EXTENSION));
    let mut n = 2;
    while fs::try_exists(&candidate).await.unwrap_or(false) {
        candidate = dir.join(format!("{}-{}.{}", stem, n, DUMP_EXTENSION));
        n += 1;
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 59)
            .unwrap()
    }

    #[tokio::test]
    async fn test_dump_path_layout() {
        let dir = TempDir::new().unwrap();
        let store = BackupStore::new(dir.path());

        let path = store
            .dump_path_at("local", DumpCategory::LocalBackup, at())
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("local/local-backup-20240309-1405.sql"));
        assert!(dir.path().join("local").is_dir());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_same_minute_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = BackupStore::new(dir.path());

        let first = store
            .dump_path_at("staging", DumpCategory::RemoteBackup, at())
            .await
            .unwrap();
        std::fs::write(&first, "dump").unwrap();
        let second = store
            .dump_path_at("staging", DumpCategory::RemoteBackup, at())
            .await
            .unwrap();
        std::fs::write(&second, "dump").unwrap();
        let third = store
            .dump_path_at("staging", DumpCategory::RemoteBackup, at())
            .await
            .unwrap();

        assert!(second.ends_with("remote-backup-20240309-1405-2.sql"));
        assert!(third.ends_with("remote-backup-20240309-1405-3.sql"));
    }

    #[tokio::test]
    async fn test_exports_live_outside_environment_dirs() {
        let dir = TempDir::new().unwrap();
        let store = BackupStore::new(dir.path());

        let path = store
            .export_path_at("staging", "production", at())
            .await
            .unwrap();

        assert_eq!(
            path,
            dir.path()
                .join("exports/staging-to-production-20240309-1405.sql")
        );
        assert!(!store.environment_dir("staging").exists());
    }
}
