use super::{SyncConfig, EXPORTS_DIR, LOCAL_ENVIRONMENT};
use crate::domain;
use crate::error::{common, ErrorCode, Result, SyncError};

/// Punctuation allowed in values that end up unquoted in rsync remote specs
/// or on the ssh command line
const SHELL_SAFE_PUNCTUATION: &str = "-_./@:+=,%";

/// Check everything that must hold before any transfer is attempted
pub fn validate(config: &SyncConfig) -> Result<()> {
    let local = config.environments.get(LOCAL_ENVIRONMENT).ok_or_else(|| {
        SyncError::config_with_code(
            ErrorCode::CONFIG_MISSING_REQUIRED,
            format!("An environment named '{}' is required", LOCAL_ENVIRONMENT),
        )
    })?;

    if local.ssh.is_some() {
        return Err(SyncError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            "The local environment cannot declare an ssh alias",
        ));
    }

    if config.environments.contains_key(EXPORTS_DIR) {
        return Err(SyncError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!(
                "'{}' is reserved for cross-environment exports and cannot name an environment",
                EXPORTS_DIR
            ),
        ));
    }

    validate_client(LOCAL_ENVIRONMENT, "db_client", &config.db_client)?;
    validate_shell_safe("content_dir", &config.content_dir)?;

    for (name, env) in &config.environments {
        if let Some(client) = &env.db_client {
            validate_client(name, "db_client", client)?;
        }

        // Every environment, local included, is one side of a search-replace
        domain::host_token(name, env.domain.as_deref())?;

        if name == LOCAL_ENVIRONMENT {
            continue;
        }

        match env.ssh.as_deref() {
            Some(ssh) if !ssh.is_empty() => validate_shell_safe(&format!("{}.ssh", name), ssh)?,
            _ => return Err(common::missing_required_field(name, "ssh")),
        }
        match env.root.as_deref() {
            Some(root) if !root.is_empty() => validate_shell_safe(&format!("{}.root", name), root)?,
            _ => return Err(common::missing_required_field(name, "root")),
        }
    }

    if config.log_max_bytes == 0 {
        return Err(SyncError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            "log_max_bytes must be greater than zero",
        ));
    }
    if config.log_max_archives == 0 {
        return Err(SyncError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            "log_max_archives must be at least 1",
        ));
    }

    Ok(())
}

fn validate_shell_safe(field: &str, value: &str) -> Result<()> {
    let safe = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || SHELL_SAFE_PUNCTUATION.contains(c));
    if value.starts_with('-') || !safe {
        return Err(SyncError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!(
                "'{}' may only use letters, digits and {} and cannot start with '-': '{}'",
                field, SHELL_SAFE_PUNCTUATION, value
            ),
        ));
    }
    Ok(())
}

fn validate_client(environment: &str, field: &str, value: &str) -> Result<()> {
    let words = shell_words::split(value).map_err(|e| {
        SyncError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!("Environment '{}' has an unparsable {}", environment, field),
        )
        .with_source(e)
    })?;
    if words.is_empty() {
        return Err(common::missing_required_field(environment, field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> SyncConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        let config = parse(
            r#"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: staging
    root: /srv/site
    domain: https://staging.example.com
"#,
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_remote_without_domain_is_fatal() {
        let config = parse(
            r#"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: staging
    root: /srv/site
"#,
        );
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REQUIRED);
        assert!(err.to_string().contains("domain"));
    }

    #[test]
    fn test_local_is_required() {
        let config = parse(
            r#"
environments:
  staging:
    ssh: staging
    root: /srv/site
    domain: https://staging.example.com
"#,
        );
        assert_eq!(
            validate(&config).unwrap_err().code(),
            ErrorCode::CONFIG_MISSING_REQUIRED
        );
    }

    #[test]
    fn test_exports_name_is_reserved() {
        let config = parse(
            r#"
environments:
  local:
    domain: http://dev.local
  exports:
    ssh: exports
    root: /srv
    domain: https://exports.example.com
"#,
        );
        assert_eq!(
            validate(&config).unwrap_err().code(),
            ErrorCode::CONFIG_INVALID_VALUE
        );
    }

    #[test]
    fn test_unbalanced_client_quotes_rejected() {
        let config = parse(
            r#"
db_client: "wp --path='/srv"
environments:
  local:
    domain: http://dev.local
"#,
        );
        assert_eq!(
            validate(&config).unwrap_err().code(),
            ErrorCode::CONFIG_INVALID_VALUE
        );
    }

    #[test]
    fn test_domain_without_host_is_rejected() {
        let config = parse(
            r#"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: staging
    root: /srv/site
    domain: "https://"
"#,
        );
        let err = validate(&config).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
        assert!(err.to_string().contains("no usable host"));
    }

    #[test]
    fn test_local_domain_is_required() {
        let missing = parse(
            r#"
environments:
  local: {}
  staging:
    ssh: staging
    root: /srv/site
    domain: https://staging.example.com
"#,
        );
        let err = validate(&missing).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REQUIRED);
        assert!(err.to_string().contains("'local'"));

        let hostless = parse(
            r#"
environments:
  local:
    domain: "http://"
"#,
        );
        assert_eq!(
            validate(&hostless).unwrap_err().code(),
            ErrorCode::CONFIG_INVALID_VALUE
        );
    }

    #[test]
    fn test_shell_unsafe_remote_values_are_rejected() {
        for (ssh, root, content_dir) in [
            ("staging", "/srv/my site", "wp-content"),
            ("staging", "/srv/site;reboot", "wp-content"),
            ("-oProxyCommand=evil", "/srv/site", "wp-content"),
            ("staging", "/srv/site", "wp content"),
            ("staging", "~/site", "wp-content"),
        ] {
            let config = parse(&format!(
                r#"
content_dir: "{content_dir}"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: "{ssh}"
    root: "{root}"
    domain: https://staging.example.com
"#
            ));
            assert_eq!(
                validate(&config).unwrap_err().code(),
                ErrorCode::CONFIG_INVALID_VALUE,
                "ssh={ssh} root={root} content_dir={content_dir}"
            );
        }
    }

    #[test]
    fn test_typical_remote_values_pass() {
        let config = parse(
            r#"
content_dir: app/content
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: deploy@staging.example.com
    root: /var/www/site-2.0/current
    domain: https://staging.example.com:8443/
"#,
        );
        assert!(validate(&config).is_ok());
    }
}
