//! Database migration pipeline
//!
//! Every direction follows the same shape: confirm, back up whatever is about
//! to be overwritten, stream the source export straight into the destination
//! import, then run the structure-aware search-replace on the destination.
//! Backups are taken with the real runner even in dry-run mode; every
//! mutating step goes through the mutating runner, which only logs in dry-run.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use super::client::{DatabaseClient, SearchReplaceOptions};
use super::state::{Outcome, PipelineState};
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::interaction::Prompter;
use crate::registry::{Environment, EnvironmentRegistry};
use crate::storage::{BackupStore, DumpCategory, OperationLog};
use crate::subprocess::SubprocessManager;

/// What a finished database operation left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseReport {
    pub outcome: Outcome,
    /// Dump files written, in creation order
    pub artifacts: Vec<PathBuf>,
}

impl DatabaseReport {
    fn cancelled() -> Self {
        Self {
            outcome: Outcome::Cancelled,
            artifacts: Vec::new(),
        }
    }
}

pub struct DatabasePipeline<'a> {
    registry: &'a EnvironmentRegistry,
    subprocess: SubprocessManager,
    prompter: Arc<dyn Prompter>,
    backups: BackupStore,
    oplog: OperationLog,
    options: SearchReplaceOptions,
    state: PipelineState,
}

impl<'a> DatabasePipeline<'a> {
    pub fn new(
        config: &SyncConfig,
        registry: &'a EnvironmentRegistry,
        subprocess: SubprocessManager,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            registry,
            subprocess,
            prompter,
            backups: BackupStore::new(config.backup_root()),
            oplog: OperationLog::from_config(config),
            options: SearchReplaceOptions::from_config(config),
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid pipeline transition {} -> {}",
            self.state,
            next
        );
        debug!("Database pipeline: {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() && !self.state.is_terminal() {
            self.transition(PipelineState::Failed);
        }
        result
    }

    async fn record(&self, message: String) -> Result<()> {
        let message = if self.subprocess.is_dry_run() {
            format!("[dry-run] {}", message)
        } else {
            message
        };
        info!("{}", message);
        self.oplog.append(&message).await
    }

    fn export_state(source: &Environment) -> PipelineState {
        if source.is_local() {
            PipelineState::BackingUpLocal
        } else {
            PipelineState::BackingUpRemote
        }
    }

    fn client<'e>(&'e self, environment: &'e Environment) -> DatabaseClient<'e> {
        DatabaseClient::new(environment, &self.options)
    }

    /// Export `environment` into a fresh dump file with the reading runner
    async fn backup(
        &self,
        environment: &Environment,
        owner: &str,
        category: DumpCategory,
    ) -> Result<PathBuf> {
        let path = self.backups.dump_path(owner, category).await?;
        let command = self.client(environment).export_to(&path)?;
        self.subprocess.reader().run_checked(command).await?;
        self.record(format!(
            "{} of {} database written to {}",
            category,
            environment.name,
            path.display()
        ))
        .await?;
        Ok(path)
    }

    /// Replace the remote database with the local one
    pub async fn push(&mut self, remote: &Environment) -> Result<DatabaseReport> {
        let result = self.run_push(remote).await;
        self.fail(result)
    }

    async fn run_push(&mut self, remote: &Environment) -> Result<DatabaseReport> {
        let local = self.registry.local()?;
        let (from, to) = (local.host()?, remote.host()?);

        self.transition(PipelineState::Confirming);
        let question = format!(
            "This will overwrite the {} database with your local database. Continue?",
            remote.name
        );
        if !self.prompter.confirm(&question).await? {
            info!("Push of database to {} cancelled", remote.name);
            self.transition(PipelineState::Cancelled);
            return Ok(DatabaseReport::cancelled());
        }

        self.transition(PipelineState::BackingUpLocal);
        let backup = self
            .backup(local, &local.name, DumpCategory::LocalBackup)
            .await?;

        self.transition(PipelineState::Importing);
        let mutator = self.subprocess.mutator();
        let output = mutator
            .pipe(self.client(local).export()?, self.client(remote).import()?)
            .await?;
        debug!("Streamed {} bytes into {}", output.bytes, remote.name);

        self.transition(PipelineState::Transforming);
        mutator
            .run_checked(self.client(remote).search_replace(&from, &to)?)
            .await?;

        self.transition(PipelineState::Complete);
        self.record(format!(
            "push database to {} complete ({} -> {}); rollback point {}",
            remote.name,
            from,
            to,
            backup.display()
        ))
        .await?;

        Ok(DatabaseReport {
            outcome: Outcome::Completed,
            artifacts: vec![backup],
        })
    }

    /// Replace the local database with the remote one
    pub async fn pull(&mut self, remote: &Environment) -> Result<DatabaseReport> {
        let result = self.run_pull(remote).await;
        self.fail(result)
    }

    async fn run_pull(&mut self, remote: &Environment) -> Result<DatabaseReport> {
        let local = self.registry.local()?;
        let (from, to) = (remote.host()?, local.host()?);

        self.transition(PipelineState::Confirming);
        let question = format!(
            "This will overwrite your local database with the {} database. Continue?",
            remote.name
        );
        if !self.prompter.confirm(&question).await? {
            info!("Pull of database from {} cancelled", remote.name);
            self.transition(PipelineState::Cancelled);
            return Ok(DatabaseReport::cancelled());
        }

        self.transition(PipelineState::BackingUpLocal);
        let before_pull = self
            .backup(local, &local.name, DumpCategory::BeforePull)
            .await?;

        self.transition(PipelineState::BackingUpRemote);
        let remote_backup = self
            .backup(remote, &remote.name, DumpCategory::RemoteBackup)
            .await?;

        self.transition(PipelineState::Importing);
        let mutator = self.subprocess.mutator();
        let output = mutator
            .pipe(self.client(remote).export()?, self.client(local).import()?)
            .await?;
        debug!("Streamed {} bytes from {}", output.bytes, remote.name);

        self.transition(PipelineState::Transforming);
        mutator
            .run_checked(self.client(local).search_replace(&from, &to)?)
            .await?;

        self.transition(PipelineState::Complete);
        self.record(format!(
            "pull database from {} complete ({} -> {}); backups kept: {}, {}",
            remote.name,
            from,
            to,
            before_pull.display(),
            remote_backup.display()
        ))
        .await?;

        Ok(DatabaseReport {
            outcome: Outcome::Completed,
            artifacts: vec![before_pull, remote_backup],
        })
    }

    /// Export `source` to a file, optionally rewritten for `replace`.
    ///
    /// A rewritten export is one-way: it is only fit for importing into
    /// `replace`, so it lives under the exports directory instead of next to
    /// the source's own backups.
    pub async fn export(
        &mut self,
        source: &Environment,
        replace: Option<&Environment>,
    ) -> Result<DatabaseReport> {
        let result = self.run_export(source, replace).await;
        self.fail(result)
    }

    async fn run_export(
        &mut self,
        source: &Environment,
        replace: Option<&Environment>,
    ) -> Result<DatabaseReport> {
        let path = match replace {
            None => {
                self.transition(Self::export_state(source));
                self.backup(source, &source.name, DumpCategory::Export).await?
            }
            Some(target) => {
                if target.name == source.name {
                    return Err(SyncError::resolution(
                        crate::error::ErrorCode::RESOLUTION_GENERIC,
                        format!("Cannot export {} rewritten for itself", source.name),
                    ));
                }
                let (from, to) = (source.host()?, target.host()?);

                self.transition(Self::export_state(source));
                let path = self.backups.export_path(&source.name, &target.name).await?;
                let command = self
                    .client(source)
                    .search_replace_export_to(&from, &to, &path)?;
                self.subprocess.reader().run_checked(command).await?;
                self.record(format!(
                    "export of {} rewritten for {} ({} -> {}) written to {}; import only into {}",
                    source.name,
                    target.name,
                    from,
                    to,
                    path.display(),
                    target.name
                ))
                .await?;
                path
            }
        };

        self.transition(PipelineState::Complete);
        Ok(DatabaseReport {
            outcome: Outcome::Completed,
            artifacts: vec![path],
        })
    }
}
