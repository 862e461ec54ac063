//! File-sync adapter around the external `rsync` binary

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Direction, SyncTarget};
use crate::error::{ErrorCode, Result, SyncError};
use crate::registry::{Environment, Location};
use crate::subprocess::{ProcessCommand, ProcessCommandBuilder, ProcessRunner};

pub const RSYNC_PROGRAM: &str = "rsync";

/// rsync's "partial transfer due to error" status, reported when the remote
/// source directory does not exist
const RSYNC_PARTIAL_TRANSFER: i32 = 23;

/// One bulk transfer of a directory between local and a remote environment
#[derive(Debug, Clone)]
pub struct FileSyncRequest {
    pub direction: Direction,
    pub target: SyncTarget,
    pub local_dir: PathBuf,
    /// Root-relative remote directory, e.g. `wp-content/themes`
    pub remote_dir: String,
    pub extra_excludes: Vec<String>,
    pub delete: bool,
}

impl FileSyncRequest {
    /// Request with the target's default directory layout and deletion policy
    pub fn for_target(
        direction: Direction,
        target: SyncTarget,
        local_root: &Path,
        content_dir: &str,
    ) -> Option<Self> {
        let dir = target.directory()?;
        Some(Self {
            direction,
            target,
            local_dir: local_root.join(content_dir).join(dir),
            remote_dir: format!("{}/{}", content_dir.trim_end_matches('/'), dir),
            extra_excludes: Vec::new(),
            delete: target.deletes_extraneous(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferReport {
    Transferred,
    /// Best-effort target whose remote directory is missing
    SkippedMissing,
}

pub struct FileSyncAdapter {
    runner: Arc<dyn ProcessRunner>,
    dry_run: bool,
}

impl FileSyncAdapter {
    pub fn new(runner: Arc<dyn ProcessRunner>, dry_run: bool) -> Self {
        Self { runner, dry_run }
    }

    pub async fn sync_files(
        &self,
        environment: &Environment,
        request: &FileSyncRequest,
    ) -> Result<TransferReport> {
        let remote_spec = remote_spec(environment, &request.remote_dir)?;
        self.prepare_local_dir(request).await?;

        let command = build_command(environment, request, &remote_spec);
        info!(
            "{} {} ({} {})",
            match request.direction {
                Direction::Push => "Pushing",
                Direction::Pull => "Pulling",
            },
            request.target,
            environment.name,
            if request.delete { "mirror" } else { "additive" }
        );
        debug!("{}", command.display());

        let display = command.display();
        let output = self.runner.run(command).await.map_err(|e| {
            SyncError::transfer_with_code(
                ErrorCode::TRANSFER_FAILED,
                format!("Could not start {}", RSYNC_PROGRAM),
                Some(request.target.to_string()),
            )
            .with_source(e)
        })?;

        match output.status.code() {
            Some(0) => Ok(TransferReport::Transferred),
            Some(RSYNC_PARTIAL_TRANSFER) if request.target.is_best_effort() => {
                warn!(
                    "{} does not exist on {}; skipping",
                    request.target, environment.name
                );
                Ok(TransferReport::SkippedMissing)
            }
            _ => Err(SyncError::transfer_with_code(
                ErrorCode::TRANSFER_FAILED,
                format!("{} failed for {}: {}", RSYNC_PROGRAM, request.target, display),
                Some(request.target.to_string()),
            )
            .with_exit_code(output.status.shell_code())),
        }
    }

    async fn prepare_local_dir(&self, request: &FileSyncRequest) -> Result<()> {
        let exists = tokio::fs::try_exists(&request.local_dir)
            .await
            .unwrap_or(false);
        if exists {
            return Ok(());
        }

        match request.direction {
            Direction::Push => Err(SyncError::transfer_with_code(
                ErrorCode::TRANSFER_LOCAL_PATH_MISSING,
                format!("Local directory {} does not exist", request.local_dir.display()),
                Some(request.target.to_string()),
            )),
            Direction::Pull if self.dry_run => {
                debug!("[dry-run] would create {}", request.local_dir.display());
                Ok(())
            }
            Direction::Pull => {
                debug!("Creating {}", request.local_dir.display());
                tokio::fs::create_dir_all(&request.local_dir)
                    .await
                    .map_err(|e| {
                        crate::error::common::storage_io_error(
                            request.local_dir.clone(),
                            "create local directory",
                            e,
                        )
                    })
            }
        }
    }
}

fn remote_spec(environment: &Environment, remote_dir: &str) -> Result<String> {
    match &environment.location {
        Location::Remote { shell, root } => Ok(format!(
            "{}:{}/{}/",
            shell.alias(),
            root.trim_end_matches('/'),
            remote_dir.trim_matches('/')
        )),
        Location::Local { .. } => Err(SyncError::resolution(
            ErrorCode::RESOLUTION_GENERIC,
            "File transfers need a remote environment",
        )),
    }
}

fn build_command(
    environment: &Environment,
    request: &FileSyncRequest,
    remote_spec: &str,
) -> ProcessCommand {
    let local_dir = request.local_dir.display().to_string();
    let local_spec = format!("{}/", local_dir.trim_end_matches('/'));
    let (source, destination) = match request.direction {
        Direction::Push => (local_spec, remote_spec.to_string()),
        Direction::Pull => (remote_spec.to_string(), local_spec),
    };

    let mut builder = ProcessCommandBuilder::new(RSYNC_PROGRAM)
        .args(["-az", "--human-readable"]);
    if request.delete {
        builder = builder.arg("--delete");
    }

    let mut excludes: Vec<&str> = Vec::new();
    for pattern in environment.excludes.iter().chain(&request.extra_excludes) {
        if !excludes.contains(&pattern.as_str()) {
            excludes.push(pattern);
        }
    }
    for pattern in excludes {
        builder = builder.args(["--exclude", pattern]);
    }

    builder.args([source, destination]).inherit_output().build()
}
