/// Error code registry for sitesync
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Resolution errors (environments and targets)
/// - 3000-3999: Storage errors (backups and operation log)
/// - 4000-4999: Execution errors (export, import, search-replace)
/// - 5000-5999: Transfer errors (file synchronization)
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_PARSE_ERROR: u16 = 1002;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1003;
    pub const CONFIG_INVALID_VALUE: u16 = 1004;

    // Resolution errors (2000-2999)
    pub const RESOLUTION_GENERIC: u16 = 2000;
    pub const RESOLUTION_UNKNOWN_ENVIRONMENT: u16 = 2001;
    pub const RESOLUTION_NO_REMOTE_ENVIRONMENTS: u16 = 2002;
    pub const RESOLUTION_AMBIGUOUS_ENVIRONMENT: u16 = 2003;
    pub const RESOLUTION_ENVIRONMENT_REQUIRED: u16 = 2004;
    pub const RESOLUTION_UNKNOWN_TARGET: u16 = 2005;
    pub const RESOLUTION_NO_TARGETS: u16 = 2006;

    // Storage errors (3000-3999)
    pub const STORAGE_GENERIC: u16 = 3000;
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_ROTATION_FAILED: u16 = 3002;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_COMMAND_NOT_FOUND: u16 = 4001;
    pub const EXEC_SUBPROCESS_FAILED: u16 = 4002;
    pub const EXEC_SIGNAL_RECEIVED: u16 = 4003;
    pub const EXEC_SPAWN_FAILED: u16 = 4004;
    pub const EXEC_PIPE_SOURCE_FAILED: u16 = 4005;
    pub const EXEC_PIPE_SINK_FAILED: u16 = 4006;
    pub const EXEC_PROMPT_FAILED: u16 = 4007;

    // Transfer errors (5000-5999)
    pub const TRANSFER_LOCAL_PATH_MISSING: u16 = 5001;
    pub const TRANSFER_FAILED: u16 = 5002;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_ranges() {
        assert!(ErrorCode::CONFIG_GENERIC >= 1000 && ErrorCode::CONFIG_GENERIC < 2000);
        assert!(ErrorCode::RESOLUTION_GENERIC >= 2000 && ErrorCode::RESOLUTION_GENERIC < 3000);
        assert!(ErrorCode::STORAGE_GENERIC >= 3000 && ErrorCode::STORAGE_GENERIC < 4000);
        assert!(ErrorCode::EXEC_GENERIC >= 4000 && ErrorCode::EXEC_GENERIC < 5000);
        assert!(
            ErrorCode::TRANSFER_LOCAL_PATH_MISSING >= 5000
                && ErrorCode::TRANSFER_FAILED < 6000
        );
    }
}
