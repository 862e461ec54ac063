pub mod builder;
pub mod dry_run;
pub mod error;
pub mod mock;
mod pipe;
pub mod remote;
pub mod runner;

pub use builder::ProcessCommandBuilder;
pub use dry_run::DryRunRunner;
pub use error::ProcessError;
pub use mock::{MockCall, MockCommandConfig, MockProcessRunner};
pub use remote::{quote_words, RemoteShell};
pub use runner::{ExitStatus, PipeOutput, ProcessCommand, ProcessOutput, ProcessRunner};

use std::sync::Arc;

/// Hands out the runner for read-only work and the runner for mutating work.
///
/// In dry-run mode mutating commands go to a [`DryRunRunner`] that only logs
/// them, while exports keep running for real so backups still land on disk.
#[derive(Clone)]
pub struct SubprocessManager {
    runner: Arc<dyn ProcessRunner>,
    dry_run: Option<DryRunRunner>,
}

impl SubprocessManager {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            dry_run: None,
        }
    }

    pub fn production() -> Self {
        Self::new(Arc::new(runner::TokioProcessRunner))
    }

    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled.then(DryRunRunner::new);
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run.is_some()
    }

    /// Runner for commands that only read (exports into backup files)
    pub fn reader(&self) -> Arc<dyn ProcessRunner> {
        Arc::clone(&self.runner)
    }

    /// Runner for commands that change files or databases
    pub fn mutator(&self) -> Arc<dyn ProcessRunner> {
        match &self.dry_run {
            Some(dry_run) => Arc::new(dry_run.clone()),
            None => Arc::clone(&self.runner),
        }
    }

    /// Invocations suppressed by dry-run mode so far
    pub fn planned(&self) -> Vec<String> {
        self.dry_run
            .as_ref()
            .map(DryRunRunner::planned)
            .unwrap_or_default()
    }
}
