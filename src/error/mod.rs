use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;
pub mod helpers;

pub use codes::ErrorCode;
pub use helpers::common;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The unified error type for sitesync
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] {message}")]
    Resolution { code: u16, message: String },

    #[error("[E{code:04}] Transfer failed: {message}")]
    Transfer {
        code: u16,
        message: String,
        target: Option<String>,
        exit_code: Option<i32>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Execution error: {message}")]
    Execution {
        code: u16,
        message: String,
        command: Option<String>,
        exit_code: Option<i32>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Storage error: {message}")]
    Storage {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl SyncError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a resolution error (unknown/ambiguous environment, unknown target)
    pub fn resolution(code: u16, message: impl Into<String>) -> Self {
        Self::Resolution {
            code,
            message: message.into(),
        }
    }

    /// Create a transfer error for a file target
    pub fn transfer_with_code(
        code: u16,
        message: impl Into<String>,
        target: Option<String>,
    ) -> Self {
        Self::Transfer {
            code,
            message: message.into(),
            target,
            exit_code: None,
            source: None,
        }
    }

    /// Create an execution error with default code
    pub fn execution(message: impl Into<String>) -> Self {
        Self::execution_with_code(ErrorCode::EXEC_GENERIC, message, None)
    }

    /// Create an execution error with specific code
    pub fn execution_with_code(
        code: u16,
        message: impl Into<String>,
        command: Option<String>,
    ) -> Self {
        Self::Execution {
            code,
            message: message.into(),
            command,
            exit_code: None,
            source: None,
        }
    }

    /// Create a storage error with default code
    pub fn storage(message: impl Into<String>) -> Self {
        Self::storage_with_code(ErrorCode::STORAGE_GENERIC, message, None)
    }

    /// Create a storage error with specific code and path
    pub fn storage_with_code(
        code: u16,
        message: impl Into<String>,
        path: Option<PathBuf>,
    ) -> Self {
        Self::Storage {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Transfer { source: src, .. }
            | Self::Execution { source: src, .. }
            | Self::Storage { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::Resolution { .. } => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Resolution { message, .. }
            | Self::Transfer { message, .. }
            | Self::Execution { message, .. }
            | Self::Storage { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Set the exit code reported by the failing subprocess
    pub fn with_exit_code(mut self, code: i32) -> Self {
        match &mut self {
            Self::Execution { exit_code, .. } | Self::Transfer { exit_code, .. } => {
                *exit_code = Some(code);
            }
            _ => {}
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Resolution { code, .. }
            | Self::Transfer { code, .. }
            | Self::Execution { code, .. }
            | Self::Storage { code, .. } => *code,
        }
    }

    /// Process exit code for this error. Every failure class exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. }
            | Self::Resolution { .. }
            | Self::Transfer { .. }
            | Self::Execution { .. }
            | Self::Storage { .. } => 1,
        }
    }

    /// Exit code of the subprocess that caused this error, if any
    pub fn subprocess_exit_code(&self) -> Option<i32> {
        match self {
            Self::Execution { exit_code, .. } | Self::Transfer { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Resolution { message, .. } => message.clone(),
            Self::Transfer {
                message, target, ..
            } => match target {
                Some(t) => format!("Transfer of {} failed: {}", t, message),
                None => format!("Transfer failed: {}", message),
            },
            Self::Execution {
                message, command, ..
            } => match command {
                Some(cmd) => format!("Command '{}' failed: {}", cmd, message),
                None => format!("Execution error: {}", message),
            },
            Self::Storage { message, path, .. } => match path {
                Some(p) => format!("Storage error at {}: {}", p.display(), message),
                None => format!("Storage error: {}", message),
            },
        }
    }
}

/// Type alias for Results using SyncError
pub type Result<T> = std::result::Result<T, SyncError>;

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::storage_with_code(ErrorCode::STORAGE_IO_ERROR, err.to_string(), None)
            .with_source(err)
    }
}

impl From<crate::subprocess::ProcessError> for SyncError {
    fn from(err: crate::subprocess::ProcessError) -> Self {
        use crate::subprocess::ProcessError;

        let (code, command, exit_code) = match &err {
            ProcessError::CommandNotFound(cmd) => {
                (ErrorCode::EXEC_COMMAND_NOT_FOUND, Some(cmd.clone()), None)
            }
            ProcessError::SpawnFailed { command, .. } => {
                (ErrorCode::EXEC_SPAWN_FAILED, Some(command.clone()), None)
            }
            ProcessError::ExitCode { command, code } => (
                ErrorCode::EXEC_SUBPROCESS_FAILED,
                Some(command.clone()),
                Some(*code),
            ),
            ProcessError::Signal { command, signal } => (
                ErrorCode::EXEC_SIGNAL_RECEIVED,
                Some(command.clone()),
                Some(*signal),
            ),
            ProcessError::SourceFailed { command, code } => (
                ErrorCode::EXEC_PIPE_SOURCE_FAILED,
                Some(command.clone()),
                Some(*code),
            ),
            ProcessError::SinkFailed { command, code } => (
                ErrorCode::EXEC_PIPE_SINK_FAILED,
                Some(command.clone()),
                Some(*code),
            ),
            ProcessError::Io(_) => (ErrorCode::EXEC_GENERIC, None, None),
            ProcessError::MockExpectationNotMet(_) => (ErrorCode::EXEC_GENERIC, None, None),
        };

        let message = err.to_string();
        let mut error = SyncError::execution_with_code(code, message, command);
        if let Some(exit) = exit_code {
            error = error.with_exit_code(exit);
        }
        error.with_source(err)
    }
}
