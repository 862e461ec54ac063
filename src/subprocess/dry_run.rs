use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::ProcessError;
use super::runner::{ExitStatus, PipeOutput, ProcessCommand, ProcessOutput, ProcessRunner};

/// Runner that reports what would be executed without executing anything
#[derive(Clone, Default)]
pub struct DryRunRunner {
    planned: Arc<Mutex<Vec<String>>>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations recorded so far, in order
    pub fn planned(&self) -> Vec<String> {
        self.planned
            .lock()
            .map(|planned| planned.clone())
            .unwrap_or_default()
    }

    fn record(&self, invocation: String) {
        tracing::info!("[dry-run] would run: {}", invocation);
        if let Ok(mut planned) = self.planned.lock() {
            planned.push(invocation);
        }
    }
}

#[async_trait]
impl ProcessRunner for DryRunRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        self.record(command.display());
        Ok(ProcessOutput {
            status: ExitStatus::Success,
            stdout: String::new(),
            stderr: String::new(),
            duration: Duration::ZERO,
        })
    }

    async fn pipe(
        &self,
        source: ProcessCommand,
        sink: ProcessCommand,
    ) -> Result<PipeOutput, ProcessError> {
        self.record(format!("{} | {}", source.display(), sink.display()));
        Ok(PipeOutput {
            bytes: 0,
            duration: Duration::ZERO,
        })
    }
}
