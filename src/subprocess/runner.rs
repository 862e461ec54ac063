use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use super::error::ProcessError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// When set, stdout is written to this file, which must not exist yet
    pub stdout_file: Option<PathBuf>,
    /// When set, stdout and stderr go straight to the operator's terminal
    pub inherit_output: bool,
}

impl ProcessCommand {
    /// Human-readable rendering used in logs and error messages
    pub fn display(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        let mut rendered = shell_words::join(words);
        if let Some(file) = &self.stdout_file {
            rendered.push_str(&format!(" > {}", file.display()));
        }
        rendered
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Result of a completed two-process pipe
#[derive(Debug, Clone)]
pub struct PipeOutput {
    pub bytes: u64,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            ExitStatus::Signal(_) => None,
        }
    }

    /// Exit code as a shell would report it (128 + signal for signals)
    pub fn shell_code(&self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Error(code) => *code,
            ExitStatus::Signal(signal) => 128 + signal,
        }
    }

    /// Translate a non-success status into an error naming the command
    pub fn check(&self, command: &str) -> Result<(), ProcessError> {
        match self {
            ExitStatus::Success => Ok(()),
            ExitStatus::Error(code) => Err(ProcessError::ExitCode {
                command: command.to_string(),
                code: *code,
            }),
            ExitStatus::Signal(signal) => Err(ProcessError::Signal {
                command: command.to_string(),
                signal: *signal,
            }),
        }
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run a command to completion
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError>;

    /// Run `source` and `sink` concurrently with `source`'s stdout connected to
    /// `sink`'s stdin. Succeeds only when both exit with status zero.
    async fn pipe(
        &self,
        source: ProcessCommand,
        sink: ProcessCommand,
    ) -> Result<PipeOutput, ProcessError>;

    /// Run a command and fail on a non-zero exit status
    async fn run_checked(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let display = command.display();
        let output = self.run(command).await?;
        if !output.status.success() && !output.stderr.is_empty() {
            tracing::error!("{}", output.stderr.trim_end());
        }
        output.status.check(&display)?;
        Ok(output)
    }
}

pub struct TokioProcessRunner;

impl TokioProcessRunner {
    /// Create the base command with arguments and working directory
    pub(crate) fn base_command(command: &ProcessCommand) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args);
        cmd.stdin(Stdio::null());
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Open the stdout redirect target, refusing to overwrite an existing file
    pub(crate) fn open_stdout_file(
        command: &ProcessCommand,
    ) -> Result<Option<Stdio>, ProcessError> {
        match &command.stdout_file {
            Some(path) => {
                let file = std::fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(path)?;
                Ok(Some(Stdio::from(file)))
            }
            None => Ok(None),
        }
    }

    /// Configure stdio for a standalone run
    fn configure_stdio(
        cmd: &mut tokio::process::Command,
        command: &ProcessCommand,
    ) -> Result<(), ProcessError> {
        if let Some(stdout) = Self::open_stdout_file(command)? {
            cmd.stdout(stdout);
            cmd.stderr(Stdio::inherit());
        } else if command.inherit_output {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        }
        Ok(())
    }

    /// Convert process exit status to our ExitStatus enum
    pub(crate) fn parse_exit_status(status: std::process::ExitStatus) -> ExitStatus {
        if status.success() {
            ExitStatus::Success
        } else if let Some(code) = status.code() {
            ExitStatus::Error(code)
        } else {
            Self::parse_signal_status(status)
        }
    }

    #[cfg(unix)]
    fn parse_signal_status(status: std::process::ExitStatus) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        match status.signal() {
            Some(signal) => ExitStatus::Signal(signal),
            None => ExitStatus::Error(1),
        }
    }

    #[cfg(not(unix))]
    fn parse_signal_status(_status: std::process::ExitStatus) -> ExitStatus {
        ExitStatus::Error(1)
    }

    /// Map spawn error to ProcessError
    pub(crate) fn map_spawn_error(error: std::io::Error, command: &ProcessCommand) -> ProcessError {
        tracing::error!(
            "Failed to spawn '{}': {:?} (kind: {:?})",
            command.program,
            error,
            error.kind()
        );
        if error.kind() == std::io::ErrorKind::NotFound {
            ProcessError::CommandNotFound(command.program.clone())
        } else {
            ProcessError::SpawnFailed {
                command: command.display(),
                source: error,
            }
        }
    }

    /// Log the process execution result
    fn log_result(result: &ProcessOutput, command: &ProcessCommand) {
        match &result.status {
            ExitStatus::Success => {
                tracing::debug!(
                    "Subprocess completed successfully in {:?}: {}",
                    result.duration,
                    command.display()
                );
            }
            ExitStatus::Error(code) => {
                tracing::debug!(
                    "Subprocess failed with exit code {} in {:?}: {}",
                    code,
                    result.duration,
                    command.display()
                );
                if !result.stderr.is_empty() {
                    tracing::trace!("Stderr: {}", result.stderr);
                }
            }
            ExitStatus::Signal(signal) => {
                tracing::warn!(
                    "Subprocess terminated by signal {} in {:?}: {}",
                    signal,
                    result.duration,
                    command.display()
                );
            }
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let start = Instant::now();
        tracing::debug!("Executing subprocess: {}", command.display());
        if let Some(dir) = &command.working_dir {
            tracing::trace!("Working directory: {:?}", dir);
        }

        let mut cmd = Self::base_command(&command);
        Self::configure_stdio(&mut cmd, &command)?;
        let child = cmd
            .spawn()
            .map_err(|e| Self::map_spawn_error(e, &command))?;

        let output = child.wait_with_output().await?;
        let result = ProcessOutput {
            status: Self::parse_exit_status(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration: start.elapsed(),
        };

        Self::log_result(&result, &command);
        Ok(result)
    }

    async fn pipe(
        &self,
        source: ProcessCommand,
        sink: ProcessCommand,
    ) -> Result<PipeOutput, ProcessError> {
        super::pipe::run_pipe(source, sink).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::ProcessCommandBuilder;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let cmd = ProcessCommandBuilder::new("sh")
            .args(["-c", "echo hello"])
            .build();
        let output = TokioProcessRunner.run(cmd).await.unwrap();

        assert!(output.status.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_checked_reports_exit_code() {
        let cmd = ProcessCommandBuilder::new("sh")
            .args(["-c", "exit 7"])
            .build();
        let err = TokioProcessRunner.run_checked(cmd).await.unwrap_err();

        match err {
            ProcessError::ExitCode { command, code } => {
                assert_eq!(code, 7);
                assert!(command.starts_with("sh -c"));
            }
            other => panic!("Expected ExitCode, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_nonexistent_program() {
        let cmd = ProcessCommandBuilder::new("nonexistent_command_12345").build();
        let err = TokioProcessRunner.run(cmd).await.unwrap_err();
        assert!(matches!(err, ProcessError::CommandNotFound(_)));
    }

    #[tokio::test]
    async fn test_stdout_redirect_writes_file_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dump.sql");
        let cmd = ProcessCommandBuilder::new("sh")
            .args(["-c", "echo 'INSERT INTO t VALUES (1);'"])
            .stdout_to_file(&path)
            .build();

        TokioProcessRunner.run_checked(cmd.clone()).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "INSERT INTO t VALUES (1);\n"
        );

        // A second run against the same path must not clobber the artifact
        assert!(TokioProcessRunner.run(cmd).await.is_err());
    }

    #[test]
    fn test_display_quotes_arguments() {
        let cmd = ProcessCommandBuilder::new("ssh")
            .args(["staging", "cd /srv && wp db export -"])
            .build();
        assert_eq!(cmd.display(), "ssh staging 'cd /srv && wp db export -'");
    }

    #[test]
    fn test_convert_exit_status() {
        use std::os::unix::process::ExitStatusExt;

        let status = std::process::ExitStatus::from_raw(0);
        assert_eq!(
            TokioProcessRunner::parse_exit_status(status),
            ExitStatus::Success
        );

        let status = std::process::ExitStatus::from_raw(256);
        assert_eq!(
            TokioProcessRunner::parse_exit_status(status),
            ExitStatus::Error(1)
        );
    }
}
