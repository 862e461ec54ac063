//! Two-process streaming pipe
//!
//! Connects a producer's stdout to a consumer's stdin through a bounded copy
//! loop, so multi-gigabyte dumps never sit in memory. Both processes forward
//! stderr to the operator's terminal. The first non-zero exit observed, from
//! either side, becomes the failure; both children are always reaped.

use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;

use super::error::ProcessError;
use super::runner::{ExitStatus, PipeOutput, ProcessCommand, TokioProcessRunner};

pub(crate) async fn run_pipe(
    source: ProcessCommand,
    sink: ProcessCommand,
) -> Result<PipeOutput, ProcessError> {
    let start = Instant::now();
    let source_display = source.display();
    let sink_display = sink.display();
    tracing::debug!("Piping subprocesses: {} | {}", source_display, sink_display);

    let mut source_cmd = TokioProcessRunner::base_command(&source);
    source_cmd.stdout(Stdio::piped()).stderr(Stdio::inherit());
    let mut source_child = source_cmd
        .spawn()
        .map_err(|e| TokioProcessRunner::map_spawn_error(e, &source))?;

    let mut sink_cmd = TokioProcessRunner::base_command(&sink);
    sink_cmd.stdin(Stdio::piped()).stderr(Stdio::inherit());
    match TokioProcessRunner::open_stdout_file(&sink) {
        Ok(Some(stdout)) => {
            sink_cmd.stdout(stdout);
        }
        Ok(None) => {
            sink_cmd.stdout(Stdio::inherit());
        }
        Err(e) => {
            reap(&mut source_child).await;
            return Err(e);
        }
    }
    let mut sink_child = match sink_cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            reap(&mut source_child).await;
            return Err(TokioProcessRunner::map_spawn_error(e, &sink));
        }
    };

    let (mut reader, mut writer) = match (source_child.stdout.take(), sink_child.stdin.take()) {
        (Some(reader), Some(writer)) => (reader, writer),
        _ => {
            reap(&mut source_child).await;
            reap(&mut sink_child).await;
            return Err(ProcessError::Io(std::io::Error::other(
                "Failed to capture pipe endpoints",
            )));
        }
    };

    // Dropping the writer once the source reaches EOF closes the sink's stdin
    let copy = async move {
        let copied = tokio::io::copy(&mut reader, &mut writer).await;
        let _ = writer.shutdown().await;
        copied
    };
    tokio::pin!(copy);

    let mut copied: Option<std::io::Result<u64>> = None;
    let mut source_done = false;
    let mut sink_done = false;
    let mut failure: Option<ProcessError> = None;

    while copied.is_none() || !source_done || !sink_done {
        tokio::select! {
            result = &mut copy, if copied.is_none() => {
                copied = Some(result);
            }
            status = source_child.wait(), if !source_done => {
                source_done = true;
                let status = settle(status, &mut failure);
                if !status.success() && failure.is_none() {
                    tracing::error!("Pipe source failed with {:?}: {}", status, source_display);
                    failure = Some(ProcessError::SourceFailed {
                        command: source_display.clone(),
                        code: status.shell_code(),
                    });
                }
            }
            status = sink_child.wait(), if !sink_done => {
                sink_done = true;
                let status = settle(status, &mut failure);
                if !status.success() && failure.is_none() {
                    tracing::error!("Pipe sink failed with {:?}: {}", status, sink_display);
                    failure = Some(ProcessError::SinkFailed {
                        command: sink_display.clone(),
                        code: status.shell_code(),
                    });
                }
            }
        }
    }

    if let Some(err) = failure {
        return Err(err);
    }

    let bytes = match copied {
        Some(Ok(bytes)) => bytes,
        Some(Err(e)) => return Err(ProcessError::Io(e)),
        None => 0,
    };
    let duration = start.elapsed();
    tracing::debug!("Piped {} bytes in {:?}", bytes, duration);

    Ok(PipeOutput { bytes, duration })
}

/// Turn a wait result into a status, recording wait errors as the failure
fn settle(
    status: std::io::Result<std::process::ExitStatus>,
    failure: &mut Option<ProcessError>,
) -> ExitStatus {
    match status {
        Ok(status) => TokioProcessRunner::parse_exit_status(status),
        Err(e) => {
            if failure.is_none() {
                *failure = Some(ProcessError::Io(e));
            }
            ExitStatus::Error(-1)
        }
    }
}

/// Kill and wait for a child so it does not outlive the pipe
async fn reap(child: &mut tokio::process::Child) {
    let _ = child.kill().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::ProcessCommandBuilder;

    fn sh(script: &str) -> ProcessCommand {
        ProcessCommandBuilder::new("sh").args(["-c", script]).build()
    }

    #[tokio::test]
    async fn test_pipe_streams_source_into_sink() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        let sink = ProcessCommandBuilder::new("sh")
            .args(["-c", "tr a-z A-Z"])
            .stdout_to_file(&out)
            .build();

        let result = run_pipe(sh("printf 'hello world'"), sink).await.unwrap();

        assert_eq!(result.bytes, 11);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "HELLO WORLD");
    }

    #[tokio::test]
    async fn test_pipe_reports_source_failure() {
        let err = run_pipe(sh("echo partial; exit 4"), sh("cat > /dev/null"))
            .await
            .unwrap_err();

        match err {
            ProcessError::SourceFailed { code, .. } => assert_eq!(code, 4),
            other => panic!("Expected SourceFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pipe_reports_sink_failure() {
        let err = run_pipe(sh("echo data"), sh("cat > /dev/null; exit 3"))
            .await
            .unwrap_err();

        match err {
            ProcessError::SinkFailed { code, .. } => assert_eq!(code, 3),
            other => panic!("Expected SinkFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pipe_sink_spawn_failure_short_circuits() {
        let sink = ProcessCommandBuilder::new("nonexistent_sink_12345").build();
        let err = run_pipe(sh("sleep 5"), sink).await.unwrap_err();
        assert!(matches!(err, ProcessError::CommandNotFound(_)));
    }
}
