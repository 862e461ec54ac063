//! Append-only operation log with size-based rotation

use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::{common, ErrorCode, Result, SyncError};

const ENTRY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Audit trail of every mutating step.
///
/// Before each append the active file is rotated once it reaches `max_bytes`:
/// it is renamed to `<stem>-<timestamp>.<ext>` next to itself and a fresh log
/// is started. At most `max_archives` archives are kept.
#[derive(Debug, Clone)]
pub struct OperationLog {
    path: PathBuf,
    max_bytes: u64,
    max_archives: usize,
}

impl OperationLog {
    pub fn new(path: impl Into<PathBuf>, max_bytes: u64, max_archives: usize) -> Self {
        Self {
            path: path.into(),
            max_bytes,
            max_archives,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.log_path(),
            config.log_max_bytes,
            config.log_max_archives,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                common::storage_io_error(parent.to_path_buf(), "create log directory", e)
            })?;
        }

        self.rotate_if_needed().await?;

        let line = format!(
            "[{}] {}\n",
            Local::now().format(ENTRY_TIMESTAMP_FORMAT),
            message
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| common::storage_io_error(self.path.clone(), "open operation log", e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| common::storage_io_error(self.path.clone(), "write operation log", e))?;
        file.flush()
            .await
            .map_err(|e| common::storage_io_error(self.path.clone(), "flush operation log", e))?;
        Ok(())
    }

    async fn rotate_if_needed(&self) -> Result<()> {
        let size = match fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(_) => return Ok(()),
        };
        if size < self.max_bytes {
            return Ok(());
        }

        let archive = self.archive_path().await;
        fs::rename(&self.path, &archive).await.map_err(|e| {
            SyncError::storage_with_code(
                ErrorCode::STORAGE_ROTATION_FAILED,
                "Failed to rotate operation log",
                Some(self.path.clone()),
            )
            .with_source(e)
        })?;
        info!("Rotated operation log to {}", archive.display());

        self.prune_archives().await
    }

    fn stem_and_extension(&self) -> (String, Option<String>) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "operations".to_string());
        let ext = self
            .path
            .extension()
            .map(|e| e.to_string_lossy().into_owned());
        (stem, ext)
    }

    fn sibling(&self, name: String) -> PathBuf {
        self.path.with_file_name(name)
    }

    async fn archive_path(&self) -> PathBuf {
        let (stem, ext) = self.stem_and_extension();
        let stamp = Local::now().format(ARCHIVE_TIMESTAMP_FORMAT).to_string();
        let name = |suffix: &str| match &ext {
            Some(ext) => format!("{}-{}{}.{}", stem, stamp, suffix, ext),
            None => format!("{}-{}{}", stem, stamp, suffix),
        };

        let mut candidate = self.sibling(name(""));
        let mut n = 2;
        while fs::try_exists(&candidate).await.unwrap_or(false) {
            candidate = self.sibling(name(&format!("-{}", n)));
            n += 1;
        }
        candidate
    }

    /// Existing archives, oldest first
    pub fn archives(&self) -> Vec<PathBuf> {
        let (stem, ext) = self.stem_and_extension();
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let file_pattern = match ext {
            Some(ext) => format!(
                "{}-*.{}",
                glob::Pattern::escape(&stem),
                glob::Pattern::escape(&ext)
            ),
            None => format!("{}-*", glob::Pattern::escape(&stem)),
        };
        let pattern = format!(
            "{}/{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            file_pattern
        );

        let mut archives: Vec<(SystemTime, PathBuf)> = match glob::glob(&pattern) {
            Ok(paths) => paths
                .filter_map(|entry| entry.ok())
                .filter(|path| path != &self.path)
                .map(|path| {
                    let modified = std::fs::metadata(&path)
                        .and_then(|m| m.modified())
                        .unwrap_or(SystemTime::UNIX_EPOCH);
                    (modified, path)
                })
                .collect(),
            Err(e) => {
                warn!("Invalid archive pattern {}: {}", pattern, e);
                Vec::new()
            }
        };
        archives.sort();
        archives.into_iter().map(|(_, path)| path).collect()
    }

    async fn prune_archives(&self) -> Result<()> {
        let archives = self.archives();
        if archives.len() <= self.max_archives {
            return Ok(());
        }

        let excess = archives.len() - self.max_archives;
        for old in archives.into_iter().take(excess) {
            debug!("Removing old operation log {}", old.display());
            fs::remove_file(&old).await.map_err(|e| {
                SyncError::storage_with_code(
                    ErrorCode::STORAGE_ROTATION_FAILED,
                    "Failed to remove old operation log",
                    Some(old.clone()),
                )
                .with_source(e)
            })?;
        }
        Ok(())
    }
}
