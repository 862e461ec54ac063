#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with code {code}")]
    ExitCode { command: String, code: i32 },

    #[error("'{command}' terminated by signal {signal}")]
    Signal { command: String, signal: i32 },

    #[error("Pipe source '{command}' exited with code {code}")]
    SourceFailed { command: String, code: i32 },

    #[error("Pipe sink '{command}' exited with code {code}")]
    SinkFailed { command: String, code: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}

impl ProcessError {
    /// Exit code of the failed process, when one was observed
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessError::ExitCode { code, .. }
            | ProcessError::SourceFailed { code, .. }
            | ProcessError::SinkFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}
