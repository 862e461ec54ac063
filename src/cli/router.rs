//! Command routing and execution

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use super::args::{Cli, Commands, TransferArgs};
use super::selection::select;
use crate::config::{ConfigLoader, SyncConfig};
use crate::database::Outcome;
use crate::interaction::{Prompter, TerminalPrompter};
use crate::orchestrator::{Orchestrator, RunSummary};
use crate::registry::EnvironmentRegistry;
use crate::subprocess::SubprocessManager;
use crate::transfer::{Direction, SyncTarget};

/// Load the configuration and run the parsed command against real processes
pub async fn execute_command(cli: Cli) -> Result<Outcome> {
    let path = ConfigLoader::locate(cli.config.as_deref());
    let config = ConfigLoader::load(&path).await?;
    let subprocess = SubprocessManager::production().with_dry_run(cli.dry_run);

    run(&config, cli.command, subprocess, Arc::new(TerminalPrompter::new())).await
}

/// Run a command with an already loaded configuration
pub async fn run(
    config: &SyncConfig,
    command: Commands,
    subprocess: SubprocessManager,
    prompter: Arc<dyn Prompter>,
) -> Result<Outcome> {
    let registry = EnvironmentRegistry::from_config(config)?;
    let orchestrator = Orchestrator::new(config, &registry, subprocess, prompter);

    let summary = match command {
        Commands::Push(args) => transfer(&orchestrator, &registry, Direction::Push, &args).await?,
        Commands::Pull(args) => transfer(&orchestrator, &registry, Direction::Pull, &args).await?,
        Commands::DbExport { env, replace } => {
            orchestrator
                .export(env.as_deref(), replace.as_deref())
                .await?
        }
    };

    report(&summary, &orchestrator.subprocess().planned());
    Ok(summary.outcome)
}

async fn transfer(
    orchestrator: &Orchestrator<'_>,
    registry: &EnvironmentRegistry,
    direction: Direction,
    args: &TransferArgs,
) -> Result<RunSummary> {
    let selection = select(args, |name| registry.contains(name))?;
    debug!(
        "{} selection: environment {:?}, targets {:?}",
        direction, selection.environment, selection.targets
    );
    Ok(orchestrator
        .transfer(direction, selection.environment.as_deref(), &selection.targets)
        .await?)
}

fn join(targets: &[SyncTarget]) -> String {
    targets
        .iter()
        .map(SyncTarget::name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn report(summary: &RunSummary, planned: &[String]) {
    if summary.outcome == Outcome::Cancelled {
        println!("Cancelled; nothing was changed.");
        return;
    }

    if !summary.completed.is_empty() {
        println!("Done with {}: {}", summary.environment, join(&summary.completed));
    }
    if !summary.skipped.is_empty() {
        println!("Skipped (not permitted): {}", join(&summary.skipped));
    }
    for artifact in &summary.artifacts {
        println!("Dump written: {}", artifact.display());
    }
    if !planned.is_empty() {
        println!("Dry run, these commands were not executed:");
        for command in planned {
            println!("  {}", command);
        }
    }
}
