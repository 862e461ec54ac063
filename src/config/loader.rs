use std::path::{Path, PathBuf};
use tokio::fs;

use super::{validate, SyncConfig};
use crate::error::{common, ErrorCode, Result, SyncError};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "SITESYNC_CONFIG";

/// File looked up in the working directory when nothing else is given
pub const DEFAULT_CONFIG_FILE: &str = "sitesync.yml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Pick the configuration path: explicit flag, then environment, then default
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }

    /// Read, parse and validate the configuration file
    pub async fn load(path: &Path) -> Result<SyncConfig> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(common::config_not_found(path));
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            SyncError::config_with_code(
                ErrorCode::CONFIG_NOT_FOUND,
                format!("Cannot read {}", path.display()),
            )
            .with_source(e)
        })?;

        let mut config = Self::parse(path, &content)?;
        config.base_dir = Self::base_dir(path);
        validate(&config)?;

        tracing::debug!(
            "Loaded configuration from {} ({} environments)",
            path.display(),
            config.environments.len()
        );
        Ok(config)
    }

    fn parse(path: &Path, content: &str) -> Result<SyncConfig> {
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let parsed = if is_toml {
            toml::from_str::<SyncConfig>(content).map_err(|e| {
                SyncError::config_with_code(ErrorCode::CONFIG_PARSE_ERROR, "Invalid TOML")
                    .with_source(e)
            })
        } else {
            serde_yaml::from_str::<SyncConfig>(content).map_err(|e| {
                SyncError::config_with_code(ErrorCode::CONFIG_PARSE_ERROR, "Invalid YAML")
                    .with_source(e)
            })
        };
        parsed.map_err(|e| e.with_context(path.display()))
    }

    fn base_dir(path: &Path) -> PathBuf {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::canonicalize(&parent).unwrap_or(parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID: &str = r#"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: deploy@staging.example.com
    root: /var/www/site
    domain: https://staging.example.com
"#;

    #[tokio::test]
    async fn test_load_yaml_sets_base_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sitesync.yml");
        std::fs::write(&path, VALID).unwrap();

        let config = ConfigLoader::load(&path).await.unwrap();

        assert_eq!(config.environments.len(), 2);
        assert_eq!(
            config.base_dir,
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sitesync.toml");
        std::fs::write(
            &path,
            r#"
multisite = true

[environments.local]
domain = "http://dev.local"

[environments.staging]
ssh = "staging"
root = "/srv/site"
domain = "https://staging.example.com"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(&path).await.unwrap();
        assert!(config.multisite);
        assert_eq!(config.environments["staging"].ssh.as_deref(), Some("staging"));
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigLoader::load(&dir.path().join("nope.yml"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sitesync.yml");
        std::fs::write(&path, "environments: [unclosed").unwrap();

        let err = ConfigLoader::load(&path).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_PARSE_ERROR);
    }

    #[test]
    fn test_locate_prefers_explicit_path() {
        let path = ConfigLoader::locate(Some(Path::new("/etc/site.yml")));
        assert_eq!(path, PathBuf::from("/etc/site.yml"));
    }
}
