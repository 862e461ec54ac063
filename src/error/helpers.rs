use super::{ErrorCode, SyncError};
use std::path::PathBuf;

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> SyncError {
        SyncError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
    }

    pub fn missing_required_field(environment: &str, field: &str) -> SyncError {
        SyncError::config_with_code(
            ErrorCode::CONFIG_MISSING_REQUIRED,
            format!("Environment '{}' must declare '{}'", environment, field),
        )
    }

    pub fn unusable_domain(environment: &str, domain: &str) -> SyncError {
        SyncError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!(
                "Environment '{}' has a domain with no usable host: '{}'",
                environment, domain
            ),
        )
    }

    pub fn unknown_environment(name: &str, known: &[String]) -> SyncError {
        SyncError::resolution(
            ErrorCode::RESOLUTION_UNKNOWN_ENVIRONMENT,
            format!(
                "Unknown environment '{}' (configured: {})",
                name,
                known.join(", ")
            ),
        )
    }

    pub fn unknown_target(token: &str) -> SyncError {
        SyncError::resolution(
            ErrorCode::RESOLUTION_UNKNOWN_TARGET,
            format!("Unknown sync target '{}'", token),
        )
    }

    pub fn storage_io_error(path: PathBuf, operation: &str, err: std::io::Error) -> SyncError {
        SyncError::storage_with_code(
            ErrorCode::STORAGE_IO_ERROR,
            format!("Failed to {}", operation),
            Some(path),
        )
        .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_error_helpers() {
        let err = common::config_not_found("/srv/site/sitesync.yml");
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
        assert!(err.user_message().contains("Configuration problem"));

        let err = common::unknown_environment("prod", &["local".into(), "staging".into()]);
        assert_eq!(err.code(), ErrorCode::RESOLUTION_UNKNOWN_ENVIRONMENT);
        assert!(err.to_string().contains("local, staging"));
    }
}
