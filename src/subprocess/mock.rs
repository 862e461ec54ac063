use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::error::ProcessError;
use super::runner::{ExitStatus, PipeOutput, ProcessCommand, ProcessOutput, ProcessRunner};

/// A single recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Run(ProcessCommand),
    Pipe {
        source: ProcessCommand,
        sink: ProcessCommand,
    },
}

/// Recording stand-in for [`ProcessRunner`]
///
/// Commands are matched against expectations by program name and an optional
/// argument predicate. Unmatched commands fail with `MockExpectationNotMet`
/// unless the runner was built with [`MockProcessRunner::permissive`].
/// A matched command that redirects stdout gets its configured stdout written
/// into the target file, so artifacts exist on disk as they would for real.
#[derive(Clone)]
pub struct MockProcessRunner {
    expectations: Arc<Mutex<Vec<MockExpectation>>>,
    call_history: Arc<Mutex<Vec<MockCall>>>,
    permissive: bool,
}

struct MockExpectation {
    program: String,
    #[allow(clippy::type_complexity)]
    args_matcher: Option<Box<dyn Fn(&[String]) -> bool + Send + Sync>>,
    response: ProcessOutput,
    times_called: usize,
    expected_times: Option<usize>,
}

pub struct MockCommandConfig {
    runner: MockProcessRunner,
    expectation: MockExpectation,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn success_output(stdout: &str) -> ProcessOutput {
    ProcessOutput {
        status: ExitStatus::Success,
        stdout: stdout.to_string(),
        stderr: String::new(),
        duration: Duration::from_millis(10),
    }
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(Vec::new())),
            call_history: Arc::new(Mutex::new(Vec::new())),
            permissive: false,
        }
    }

    /// A runner that answers every unmatched command with success
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::new()
        }
    }

    pub fn expect_command(&self, program: &str) -> MockCommandConfig {
        MockCommandConfig {
            runner: self.clone(),
            expectation: MockExpectation {
                program: program.to_string(),
                args_matcher: None,
                response: success_output(""),
                times_called: 0,
                expected_times: None,
            },
        }
    }

    /// Number of standalone runs of `program` (pipes are not counted)
    pub fn verify_called(&self, program: &str, times: usize) -> bool {
        self.get_run_history()
            .iter()
            .filter(|cmd| cmd.program == program)
            .count()
            == times
    }

    pub fn get_call_history(&self) -> Vec<MockCall> {
        lock(&self.call_history).clone()
    }

    pub fn get_run_history(&self) -> Vec<ProcessCommand> {
        self.get_call_history()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Run(cmd) => Some(cmd),
                MockCall::Pipe { .. } => None,
            })
            .collect()
    }

    pub fn get_pipe_history(&self) -> Vec<(ProcessCommand, ProcessCommand)> {
        self.get_call_history()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Pipe { source, sink } => Some((source, sink)),
                MockCall::Run(_) => None,
            })
            .collect()
    }

    fn respond(&self, command: &ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let mut expectations = lock(&self.expectations);

        for expectation in expectations.iter_mut() {
            if expectation.program != command.program {
                continue;
            }

            if let Some(ref args_matcher) = expectation.args_matcher {
                if !(args_matcher)(&command.args) {
                    continue;
                }
            }

            expectation.times_called += 1;

            if let Some(expected) = expectation.expected_times {
                if expectation.times_called > expected {
                    return Err(ProcessError::MockExpectationNotMet(format!(
                        "Command '{}' called {} times, expected {}",
                        command.program, expectation.times_called, expected
                    )));
                }
            }

            return Ok(expectation.response.clone());
        }

        if self.permissive {
            return Ok(success_output(""));
        }

        Err(ProcessError::MockExpectationNotMet(format!(
            "No expectation found for command: {} {:?}",
            command.program, command.args
        )))
    }

    fn write_redirect(command: &ProcessCommand, stdout: &str) -> Result<(), ProcessError> {
        if let Some(path) = &command.stdout_file {
            use std::io::Write;
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)?;
            file.write_all(stdout.as_bytes())?;
        }
        Ok(())
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        lock(&self.call_history).push(MockCall::Run(command.clone()));

        let response = self.respond(&command)?;
        Self::write_redirect(&command, &response.stdout)?;
        Ok(response)
    }

    async fn pipe(
        &self,
        source: ProcessCommand,
        sink: ProcessCommand,
    ) -> Result<PipeOutput, ProcessError> {
        lock(&self.call_history).push(MockCall::Pipe {
            source: source.clone(),
            sink: sink.clone(),
        });

        let source_response = self.respond(&source)?;
        let sink_response = self.respond(&sink)?;
        Self::write_redirect(&sink, &source_response.stdout)?;

        if !source_response.status.success() {
            return Err(ProcessError::SourceFailed {
                command: source.display(),
                code: source_response.status.shell_code(),
            });
        }
        if !sink_response.status.success() {
            return Err(ProcessError::SinkFailed {
                command: sink.display(),
                code: sink_response.status.shell_code(),
            });
        }

        Ok(PipeOutput {
            bytes: source_response.stdout.len() as u64,
            duration: Duration::from_millis(10),
        })
    }
}

impl MockCommandConfig {
    pub fn with_args<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        self.expectation.args_matcher = Some(Box::new(matcher));
        self
    }

    pub fn returns_stdout(mut self, stdout: &str) -> Self {
        self.expectation.response.stdout = stdout.to_string();
        self
    }

    pub fn returns_exit_code(mut self, code: i32) -> Self {
        self.expectation.response.status = if code == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Error(code)
        };
        self
    }

    pub fn returns_success(mut self) -> Self {
        self.expectation.response.status = ExitStatus::Success;
        self
    }

    pub fn times(mut self, n: usize) -> Self {
        self.expectation.expected_times = Some(n);
        self
    }

    pub fn finish(self) {
        lock(&self.runner.expectations).push(self.expectation);
    }
}

impl Default for MockProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::ProcessCommandBuilder;

    #[tokio::test]
    async fn test_mock_matches_by_args() {
        let mock = MockProcessRunner::new();
        mock.expect_command("rsync")
            .with_args(|args| args.iter().any(|a| a == "--delete"))
            .returns_exit_code(23)
            .finish();
        mock.expect_command("rsync").returns_success().finish();

        let mirror = ProcessCommandBuilder::new("rsync").arg("--delete").build();
        let additive = ProcessCommandBuilder::new("rsync").arg("-az").build();

        assert_eq!(
            mock.run(mirror).await.unwrap().status,
            ExitStatus::Error(23)
        );
        assert!(mock.run(additive).await.unwrap().status.success());
        assert!(mock.verify_called("rsync", 2));
    }

    #[tokio::test]
    async fn test_strict_mock_rejects_unexpected_commands() {
        let mock = MockProcessRunner::new();
        let err = mock
            .run(ProcessCommandBuilder::new("wp").build())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::MockExpectationNotMet(_)));
    }

    #[tokio::test]
    async fn test_mock_pipe_reports_sink_failure() {
        let mock = MockProcessRunner::new();
        mock.expect_command("wp").returns_stdout("-- dump").finish();
        mock.expect_command("ssh").returns_exit_code(1).finish();

        let source = ProcessCommandBuilder::new("wp").build();
        let sink = ProcessCommandBuilder::new("ssh").build();
        let err = mock.pipe(source, sink).await.unwrap_err();

        assert!(matches!(err, ProcessError::SinkFailed { code: 1, .. }));
        assert_eq!(mock.get_pipe_history().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_writes_redirected_stdout() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("backup.sql");
        let mock = MockProcessRunner::new();
        mock.expect_command("wp").returns_stdout("CREATE TABLE t;").finish();

        let cmd = ProcessCommandBuilder::new("wp")
            .args(["db", "export", "-"])
            .stdout_to_file(&path)
            .build();
        mock.run_checked(cmd).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "CREATE TABLE t;");
    }
}
