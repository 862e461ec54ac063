//! Dispatch of a push, pull or export across the selected targets
//!
//! Targets run one at a time in their fixed order. A target the environment
//! does not permit in the requested direction is skipped with a warning.
//! Targets already transferred are not rolled back when a later one fails.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::database::{DatabasePipeline, Outcome};
use crate::error::{ErrorCode, Result, SyncError};
use crate::interaction::Prompter;
use crate::registry::{Environment, EnvironmentRegistry};
use crate::storage::OperationLog;
use crate::subprocess::SubprocessManager;
use crate::transfer::{Direction, FileSyncAdapter, FileSyncRequest, SyncTarget, TransferReport};

/// Environment whose pushes need the typed confirmation phrase
pub const PRODUCTION_ENVIRONMENT: &str = "production";

pub const PRODUCTION_PHRASE: &str = "push to production";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: Outcome,
    pub environment: String,
    pub completed: Vec<SyncTarget>,
    pub skipped: Vec<SyncTarget>,
    /// Dump files written during the run
    pub artifacts: Vec<PathBuf>,
}

impl RunSummary {
    fn new(environment: &str) -> Self {
        Self {
            outcome: Outcome::Completed,
            environment: environment.to_string(),
            completed: Vec::new(),
            skipped: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    fn cancelled(mut self) -> Self {
        self.outcome = Outcome::Cancelled;
        self
    }
}

pub struct Orchestrator<'a> {
    config: &'a SyncConfig,
    registry: &'a EnvironmentRegistry,
    subprocess: SubprocessManager,
    prompter: Arc<dyn Prompter>,
    oplog: OperationLog,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a SyncConfig,
        registry: &'a EnvironmentRegistry,
        subprocess: SubprocessManager,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            config,
            registry,
            subprocess,
            prompter,
            oplog: OperationLog::from_config(config),
        }
    }

    pub fn subprocess(&self) -> &SubprocessManager {
        &self.subprocess
    }

    async fn record(&self, message: String) -> Result<()> {
        let message = if self.subprocess.is_dry_run() {
            format!("[dry-run] {}", message)
        } else {
            message
        };
        self.oplog.append(&message).await
    }

    fn pipeline(&self) -> DatabasePipeline<'a> {
        DatabasePipeline::new(
            self.config,
            self.registry,
            self.subprocess.clone(),
            Arc::clone(&self.prompter),
        )
    }

    /// Push or pull `targets` against the named or implied environment
    pub async fn transfer(
        &self,
        direction: Direction,
        environment: Option<&str>,
        targets: &BTreeSet<SyncTarget>,
    ) -> Result<RunSummary> {
        if targets.is_empty() {
            return Err(SyncError::resolution(
                ErrorCode::RESOLUTION_NO_TARGETS,
                format!("Nothing to {}: select targets or pass --all", direction),
            ));
        }

        let env = self.registry.resolve(environment, false)?;
        if env.is_local() {
            return Err(SyncError::resolution(
                ErrorCode::RESOLUTION_GENERIC,
                format!("Cannot {} the local environment to itself", direction),
            ));
        }

        let mut summary = RunSummary::new(&env.name);

        if direction == Direction::Push && env.name == PRODUCTION_ENVIRONMENT {
            let message = format!(
                "You are about to push {} to PRODUCTION.",
                targets
                    .iter()
                    .map(SyncTarget::name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            if !self
                .prompter
                .confirm_phrase(&message, PRODUCTION_PHRASE)
                .await?
            {
                info!("Push to production cancelled");
                return Ok(summary.cancelled());
            }
        }

        for &target in targets {
            if !env.allows(target, direction) {
                warn!(
                    "Skipping {}: {} is not permitted for {}",
                    target, direction, env.name
                );
                self.record(format!(
                    "skipped {} {} for {} (not permitted)",
                    direction, target, env.name
                ))
                .await?;
                summary.skipped.push(target);
                continue;
            }

            if target.is_database() {
                let mut pipeline = self.pipeline();
                let report = match direction {
                    Direction::Push => pipeline.push(env).await?,
                    Direction::Pull => pipeline.pull(env).await?,
                };
                summary.artifacts.extend(report.artifacts);
                if report.outcome == Outcome::Cancelled {
                    return Ok(summary.cancelled());
                }
            } else {
                self.sync_files(direction, env, target).await?;
            }
            summary.completed.push(target);
        }

        Ok(summary)
    }

    async fn sync_files(
        &self,
        direction: Direction,
        env: &Environment,
        target: SyncTarget,
    ) -> Result<()> {
        let Some(request) = FileSyncRequest::for_target(
            direction,
            target,
            &self.config.local_root(),
            &self.config.content_dir,
        ) else {
            return Ok(());
        };

        let adapter =
            FileSyncAdapter::new(self.subprocess.mutator(), self.subprocess.is_dry_run());
        let report = adapter.sync_files(env, &request).await?;
        let note = match report {
            TransferReport::Transferred => "complete",
            TransferReport::SkippedMissing => "skipped, missing on remote",
        };
        self.record(format!(
            "{} {} {} {}: {}",
            direction,
            target,
            preposition(direction),
            env.name,
            note
        ))
        .await
    }

    /// Standalone export; the environment is never guessed
    pub async fn export(
        &self,
        environment: Option<&str>,
        replace: Option<&str>,
    ) -> Result<RunSummary> {
        let source = self.registry.resolve(environment, true)?;
        let target = replace.map(|name| self.registry.get(name)).transpose()?;

        let report = self.pipeline().export(source, target).await?;

        let mut summary = RunSummary::new(&source.name);
        summary.completed.push(SyncTarget::Database);
        summary.artifacts = report.artifacts;
        Ok(summary)
    }
}

fn preposition(direction: Direction) -> &'static str {
    match direction {
        Direction::Push => "to",
        Direction::Pull => "from",
    }
}
